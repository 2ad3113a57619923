//! Model loading from disk

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::classifier::{Classifier, LinearClassifier, ModelSpec};
use super::PredictionError;
use crate::logic::features::ModelKind;

/// Source of classifiers; called at most once per model by the service.
pub trait ModelLoader: Send + Sync {
    fn load(&self, model: ModelKind) -> Result<Arc<dyn Classifier>, PredictionError>;
}

/// Loads model files from configured paths.
///
/// `.json` files hold a linear model spec; `.onnx` files need the `onnx`
/// feature.
#[derive(Debug, Clone)]
pub struct FileModelLoader {
    cholera_path: PathBuf,
    malaria_path: PathBuf,
}

impl FileModelLoader {
    pub fn new(cholera_path: impl Into<PathBuf>, malaria_path: impl Into<PathBuf>) -> Self {
        Self {
            cholera_path: cholera_path.into(),
            malaria_path: malaria_path.into(),
        }
    }

    pub fn path_for(&self, model: ModelKind) -> &Path {
        match model {
            ModelKind::Cholera => &self.cholera_path,
            ModelKind::Malaria => &self.malaria_path,
        }
    }
}

impl ModelLoader for FileModelLoader {
    fn load(&self, model: ModelKind) -> Result<Arc<dyn Classifier>, PredictionError> {
        let path = self.path_for(model);
        tracing::info!("Loading {} model from: {}", model, path.display());

        let load_error = |reason: String| PredictionError::ModelLoad {
            model,
            path: path.display().to_string(),
            reason,
        };

        if !path.exists() {
            return Err(load_error("model file not found".to_string()));
        }

        let classifier: Arc<dyn Classifier> = match path.extension().and_then(|e| e.to_str()) {
            #[cfg(feature = "onnx")]
            Some("onnx") => Arc::new(
                super::onnx::OnnxClassifier::from_file(path).map_err(|e| load_error(e.to_string()))?,
            ),
            _ => {
                let raw = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
                let spec: ModelSpec =
                    serde_json::from_str(&raw).map_err(|e| load_error(e.to_string()))?;
                Arc::new(LinearClassifier::from_spec(model, spec).map_err(|e| load_error(e.to_string()))?)
            }
        };

        tracing::info!("{} model loaded ({})", model, classifier.describe());
        Ok(classifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_loads_json_spec() {
        let dir = tempdir().unwrap();
        let cholera = dir.path().join("cholera.json");
        fs::write(
            &cholera,
            r#"{"kind":"logistic_regression","feature_names":[],"coefficients":[2.0,0.01],"intercept":-1.0}"#,
        )
        .unwrap();

        let loader = FileModelLoader::new(&cholera, dir.path().join("missing.json"));
        let model = loader.load(ModelKind::Cholera).unwrap();
        assert_eq!(model.describe(), "logistic_regression");
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = tempdir().unwrap();
        let loader = FileModelLoader::new(dir.path().join("a.json"), dir.path().join("b.json"));
        let err = loader.load(ModelKind::Malaria).err().unwrap();
        assert!(matches!(err, PredictionError::ModelLoad { model: ModelKind::Malaria, .. }));
    }

    #[test]
    fn test_malformed_spec_is_load_error() {
        let dir = tempdir().unwrap();
        let malaria = dir.path().join("malaria.json");
        fs::write(&malaria, "{ not json").unwrap();
        let loader = FileModelLoader::new(dir.path().join("a.json"), &malaria);
        assert!(loader.load(ModelKind::Malaria).is_err());
    }
}
