//! Model Module - classifier loading and risk scoring
//!
//! Classifiers are loaded lazily and cached for the process lifetime.
//! Scoring returns a label and, when the backend supports it, the class-1
//! probability used for the outbreak flag.

pub mod classifier;
pub mod loader;
pub mod service;
pub mod threshold;

#[cfg(feature = "onnx")]
pub mod onnx;

#[cfg(test)]
pub mod testing;

#[cfg(test)]
mod tests;

pub use classifier::{Classifier, InferenceError, Label, RawLabel};
pub use loader::{FileModelLoader, ModelLoader};
pub use service::{PredictionResult, PredictionService};
pub use threshold::{outbreak_flag, OUTBREAK_PROBABILITY_THRESHOLD};

use crate::logic::features::{FeatureError, ModelKind};

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("Unknown disease: {0}")]
    UnknownDisease(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("failed to load {model} model from {path}: {reason}")]
    ModelLoad {
        model: ModelKind,
        path: String,
        reason: String,
    },

    #[error("{model} model inference failed")]
    Inference {
        model: ModelKind,
        #[source]
        source: InferenceError,
    },

    /// Probability estimates unavailable; logged, never returned to clients.
    #[error("{model} model probability unavailable: {reason}")]
    ModelUnavailable { model: ModelKind, reason: String },
}

impl PredictionError {
    /// Caller mistakes, as opposed to model/server failures.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictionError::Feature(_)
                | PredictionError::UnknownDisease(_)
                | PredictionError::InvalidRequest(_)
        )
    }
}
