//! ONNX Runtime backend
//!
//! Expects the two-output layout scikit-learn exports with
//! `zipmap=False`: `label` (int64) and `probabilities` (float, one column
//! per class).

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::classifier::{Classifier, InferenceError, RawLabel};

const LABEL_OUTPUT: &str = "label";
const PROBABILITY_OUTPUT: &str = "probabilities";

pub struct OnnxClassifier {
    session: Mutex<Session>,
    path: String,
}

impl OnnxClassifier {
    pub fn from_file(path: &Path) -> Result<Self, InferenceError> {
        let session = Session::builder()
            .map_err(|e| InferenceError::Failed(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Failed(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| InferenceError::Failed(format!("Failed to load model: {}", e)))?;

        Ok(Self {
            session: Mutex::new(session),
            path: path.display().to_string(),
        })
    }

    fn run<T, F>(&self, features: &[f64], output: &str, read: F) -> Result<T, InferenceError>
    where
        F: FnOnce(&ort::value::DynValue) -> Result<T, InferenceError>,
    {
        let input: Vec<f32> = features.iter().map(|v| *v as f32).collect();
        let array = Array2::<f32>::from_shape_vec((1, input.len()), input)
            .map_err(|e| InferenceError::Failed(format!("Array error: {}", e)))?;
        let tensor = Value::from_array(array)
            .map_err(|e| InferenceError::Failed(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| InferenceError::Failed(format!("Inference failed: {}", e)))?;
        let value = outputs
            .get(output)
            .ok_or_else(|| InferenceError::ProbabilityUnsupported(format!("onnx ({})", self.path)))?;
        read(value)
    }
}

impl Classifier for OnnxClassifier {
    fn describe(&self) -> String {
        format!("onnx:{}", self.path)
    }

    fn predict(&self, features: &[f64]) -> Result<RawLabel, InferenceError> {
        self.run(features, LABEL_OUTPUT, |value| {
            let (_, data) = value
                .try_extract_tensor::<i64>()
                .map_err(|e| InferenceError::Failed(format!("Extract error: {}", e)))?;
            data.first()
                .map(|l| RawLabel::Int(*l))
                .ok_or_else(|| InferenceError::Failed("empty label output".to_string()))
        })
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        self.run(features, PROBABILITY_OUTPUT, |value| {
            let (_, data) = value
                .try_extract_tensor::<f32>()
                .map_err(|e| InferenceError::ProbabilityUnsupported(format!("onnx ({})", e)))?;
            Ok(data.iter().map(|p| *p as f64).collect())
        })
    }
}
