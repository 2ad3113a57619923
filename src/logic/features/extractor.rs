//! Feature Extractor - request payload to model input

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::layout::{ModelKind, POSITIONAL_LAYOUT};
use super::vector::FeatureVector;
use super::FeatureError;
use crate::models::record::Record;

/// Feature payload as clients send it: either keyed by column name or as a
/// `[sanitation_rate, rainfall, ndvi, temp]` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureInput {
    Named(Map<String, Value>),
    Positional(Vec<Value>),
}

impl FeatureInput {
    pub fn is_empty(&self) -> bool {
        match self {
            FeatureInput::Named(map) => map.is_empty(),
            FeatureInput::Positional(values) => values.is_empty(),
        }
    }
}

/// Pick the model's inputs out of a payload.
pub fn extract(model: ModelKind, input: &FeatureInput) -> Result<FeatureVector, FeatureError> {
    let names = model.feature_names();
    let mut values = [0.0f64; 2];

    match input {
        FeatureInput::Named(map) => {
            for (slot, name) in values.iter_mut().zip(names.iter()) {
                *slot = numeric(model, name, map.get(*name))?;
            }
        }
        FeatureInput::Positional(items) => {
            for (slot, index) in values.iter_mut().zip(model.positional_indices()) {
                let name = POSITIONAL_LAYOUT[index];
                *slot = numeric(model, name, items.get(index)).map_err(|e| match e {
                    FeatureError::Missing { model, .. } => FeatureError::Missing {
                        model,
                        field: format!("{} (index {})", name, index),
                    },
                    other => other,
                })?;
            }
        }
    }

    FeatureVector::new(model, values)
}

/// Project a dataset record onto the model's inputs.
pub fn extract_record(model: ModelKind, record: &Record) -> Result<FeatureVector, FeatureError> {
    FeatureVector::new(model, model.record_values(record))
}

fn numeric(model: ModelKind, field: &str, value: Option<&Value>) -> Result<f64, FeatureError> {
    match value {
        None | Some(Value::Null) => Err(FeatureError::Missing {
            model,
            field: field.to_string(),
        }),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| FeatureError::Invalid {
            model,
            field: field.to_string(),
            value: n.to_string(),
        }),
        Some(other) => Err(FeatureError::Invalid {
            model,
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}
