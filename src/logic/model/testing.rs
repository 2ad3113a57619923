//! Test doubles shared by unit tests across the crate

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::classifier::{Classifier, InferenceError, RawLabel};
use super::loader::ModelLoader;
use super::{PredictionError, PredictionService};
use crate::logic::features::ModelKind;

/// Label is `1` when the first feature exceeds `cutoff`; probability is fixed.
pub struct StubClassifier {
    pub cutoff: f64,
    pub probability: Option<f64>,
}

impl Classifier for StubClassifier {
    fn describe(&self) -> String {
        "stub".to_string()
    }

    fn predict(&self, features: &[f64]) -> Result<RawLabel, InferenceError> {
        Ok(RawLabel::Int((features[0] > self.cutoff) as i64))
    }

    fn predict_proba(&self, _features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        self.probability
            .map(|p| vec![1.0 - p, p])
            .ok_or_else(|| InferenceError::ProbabilityUnsupported("stub".to_string()))
    }
}

/// Loader that counts how often it is asked to load.
pub struct CountingLoader {
    pub loads: AtomicUsize,
    pub delay: Duration,
    pub cutoff: f64,
    pub probability: Option<f64>,
    pub fail: bool,
}

impl CountingLoader {
    pub fn new(probability: Option<f64>) -> Self {
        Self {
            loads: AtomicUsize::new(0),
            delay: Duration::ZERO,
            cutoff: 0.5,
            probability,
            fail: false,
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ModelLoader for CountingLoader {
    fn load(&self, model: ModelKind) -> Result<Arc<dyn Classifier>, PredictionError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if self.fail {
            return Err(PredictionError::ModelLoad {
                model,
                path: "<test>".to_string(),
                reason: "simulated failure".to_string(),
            });
        }
        Ok(Arc::new(StubClassifier {
            cutoff: self.cutoff,
            probability: self.probability,
        }))
    }
}

/// Service over a `CountingLoader`, with the loader handle for assertions.
pub fn stub_service(probability: Option<f64>) -> (PredictionService, Arc<CountingLoader>) {
    let loader = Arc::new(CountingLoader::new(probability));
    (PredictionService::new(loader.clone()), loader)
}
