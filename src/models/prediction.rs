//! Prediction request/response bodies

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logic::model::{Label, PredictionResult};

/// Body of `POST /predict/{disease}`.
///
/// `features` stays untyped here so a malformed payload can be echoed back
/// to the caller alongside the error.
#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub features: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictResponse {
    /// Outbreak flag: 1 when the class-1 probability exceeds the threshold.
    pub prediction: u8,
    pub label: Label,
    pub probability: Option<f64>,
}

impl From<PredictionResult> for PredictResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            prediction: result.outbreak_flag(),
            label: result.label,
            probability: result.probability,
        }
    }
}

/// One slot of a batch response, in request order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Scored(PredictResponse),
    Failed { error: String, input: Value },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_flag_follows_probability() {
        let response = PredictResponse::from(PredictionResult {
            label: Label::NoOutbreak,
            probability: Some(0.3),
        });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"prediction": 1, "label": 0, "probability": 0.3})
        );
    }

    #[test]
    fn test_missing_probability_serializes_as_null() {
        let response = PredictResponse::from(PredictionResult {
            label: Label::Outbreak,
            probability: None,
        });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"prediction": 0, "label": 1, "probability": null})
        );
    }

    #[test]
    fn test_failed_entry_shape() {
        let entry = BatchEntry::Failed {
            error: "Unknown disease: dengue".to_string(),
            input: json!({"disease": "dengue"}),
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"error": "Unknown disease: dengue", "input": {"disease": "dengue"}})
        );
    }
}
