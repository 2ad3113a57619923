//! Feature Vector - validated classifier input

use serde::{Deserialize, Serialize};

use super::layout::{ModelKind, MODEL_FEATURE_COUNT};
use super::FeatureError;

/// Ordered inputs for one model.
///
/// Always exactly `MODEL_FEATURE_COUNT` finite values; construction is the
/// only place that is checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub model: ModelKind,
    values: [f64; MODEL_FEATURE_COUNT],
}

impl FeatureVector {
    pub fn new(model: ModelKind, values: [f64; MODEL_FEATURE_COUNT]) -> Result<Self, FeatureError> {
        let names = model.feature_names();
        for (name, value) in names.iter().zip(values.iter()) {
            if !value.is_finite() {
                return Err(FeatureError::Invalid {
                    model,
                    field: name.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(Self { model, values })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_nan() {
        let err = FeatureVector::new(ModelKind::Malaria, [f64::NAN, 20.0]).unwrap_err();
        assert!(matches!(err, FeatureError::Invalid { ref field, .. } if field == "mean_ndvi"));
    }

    #[test]
    fn test_values_keep_model_order() {
        let v = FeatureVector::new(ModelKind::Cholera, [0.4, 120.0]).unwrap();
        assert_eq!(v.as_slice(), &[0.4, 120.0]);
    }
}
