//! Features Module - Feature Extraction
//!
//! Turns client payloads and dataset records into the fixed-order vectors
//! the classifiers expect.

pub mod layout;
pub mod vector;
pub mod extractor;


pub use extractor::{extract, extract_record, FeatureInput};
pub use layout::{ModelKind, POSITIONAL_LAYOUT};
pub use vector::FeatureVector;

/// Input validation failures, surfaced to callers as 4xx.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    #[error("missing feature '{field}' for {model} model")]
    Missing { model: ModelKind, field: String },

    #[error("feature '{field}' for {model} model must be a number, got {value}")]
    Invalid {
        model: ModelKind,
        field: String,
        value: String,
    },
}
