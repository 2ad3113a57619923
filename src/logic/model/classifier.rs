//! Classifier abstraction and the JSON linear-model backend
//!
//! Classifiers are opaque: they take a fixed-order feature slice and return a
//! raw label, and optionally class probabilities.

use serde::{Deserialize, Serialize};

use crate::logic::features::ModelKind;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    /// Model type cannot produce probabilities; recoverable.
    #[error("{0} models do not support probability estimates")]
    ProbabilityUnsupported(String),

    #[error("inference failed: {0}")]
    Failed(String),
}

// ============================================================================
// LABELS
// ============================================================================

/// Label exactly as a backend produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawLabel {
    Int(i64),
}

/// Binary outbreak class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum Label {
    NoOutbreak,
    Outbreak,
}

impl Label {
    pub fn as_u8(self) -> u8 {
        match self {
            Label::NoOutbreak => 0,
            Label::Outbreak => 1,
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label.as_u8()
    }
}

impl TryFrom<RawLabel> for Label {
    type Error = InferenceError;

    fn try_from(raw: RawLabel) -> Result<Self, Self::Error> {
        match raw {
            RawLabel::Int(0) => Ok(Label::NoOutbreak),
            RawLabel::Int(1) => Ok(Label::Outbreak),
            other => Err(InferenceError::Failed(format!(
                "model returned non-binary label {:?}",
                other
            ))),
        }
    }
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// A loaded, immutable model shared by every request.
pub trait Classifier: Send + Sync {
    /// Human readable backend description for logs and status output.
    fn describe(&self) -> String;

    fn predict(&self, features: &[f64]) -> Result<RawLabel, InferenceError>;

    /// Per-class probabilities, class 0 first.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

// ============================================================================
// LINEAR MODELS
// ============================================================================

/// On-disk JSON description of a fitted linear model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    LogisticRegression(LinearParams),
    LinearSvc(LinearParams),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearParams {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

#[derive(Debug, Clone)]
pub struct LinearClassifier {
    spec: ModelSpec,
}

impl LinearClassifier {
    /// Checks the spec against the layout the model is registered for.
    pub fn from_spec(model: ModelKind, spec: ModelSpec) -> Result<Self, InferenceError> {
        let params = match &spec {
            ModelSpec::LogisticRegression(p) | ModelSpec::LinearSvc(p) => p,
        };

        let expected = model.feature_names();
        if params.coefficients.len() != expected.len() {
            return Err(InferenceError::Failed(format!(
                "{} model expects {} coefficients, found {}",
                model,
                expected.len(),
                params.coefficients.len()
            )));
        }
        if !params.feature_names.is_empty() && params.feature_names != expected {
            return Err(InferenceError::Failed(format!(
                "{} model was fitted on {:?}, expected {:?}",
                model, params.feature_names, expected
            )));
        }

        Ok(Self { spec })
    }

    fn params(&self) -> &LinearParams {
        match &self.spec {
            ModelSpec::LogisticRegression(p) | ModelSpec::LinearSvc(p) => p,
        }
    }

    fn decision(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let params = self.params();
        if features.len() != params.coefficients.len() {
            return Err(InferenceError::Failed(format!(
                "expected {} features, got {}",
                params.coefficients.len(),
                features.len()
            )));
        }
        let dot: f64 = params
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum();
        Ok(params.intercept + dot)
    }
}

impl Classifier for LinearClassifier {
    fn describe(&self) -> String {
        match self.spec {
            ModelSpec::LogisticRegression(_) => "logistic_regression".to_string(),
            ModelSpec::LinearSvc(_) => "linear_svc".to_string(),
        }
    }

    fn predict(&self, features: &[f64]) -> Result<RawLabel, InferenceError> {
        Ok(RawLabel::Int(if self.decision(features)? > 0.0 { 1 } else { 0 }))
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        match self.spec {
            ModelSpec::LogisticRegression(_) => {
                let p = sigmoid(self.decision(features)?);
                Ok(vec![1.0 - p, p])
            }
            ModelSpec::LinearSvc(_) => Err(InferenceError::ProbabilityUnsupported(self.describe())),
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(coefficients: Vec<f64>, intercept: f64) -> LinearParams {
        LinearParams {
            feature_names: vec![],
            coefficients,
            intercept,
        }
    }

    #[test]
    fn test_logistic_probability_in_unit_interval() {
        let model = LinearClassifier::from_spec(
            ModelKind::Cholera,
            ModelSpec::LogisticRegression(params(vec![4.0, 0.02], -3.0)),
        )
        .unwrap();

        for features in [[0.0, 0.0], [0.9, 300.0], [-5.0, -1000.0], [1e6, 1e6]] {
            let proba = model.predict_proba(&features).unwrap();
            assert_eq!(proba.len(), 2);
            assert!((0.0..=1.0).contains(&proba[1]), "p = {}", proba[1]);
            assert!((proba[0] + proba[1] - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_label_agrees_with_decision() {
        let model = LinearClassifier::from_spec(
            ModelKind::Malaria,
            ModelSpec::LogisticRegression(params(vec![1.0, 0.0], -0.5)),
        )
        .unwrap();
        assert_eq!(model.predict(&[1.0, 0.0]).unwrap(), RawLabel::Int(1));
        assert_eq!(model.predict(&[0.0, 0.0]).unwrap(), RawLabel::Int(0));
    }

    #[test]
    fn test_svc_has_no_probabilities() {
        let model = LinearClassifier::from_spec(
            ModelKind::Malaria,
            ModelSpec::LinearSvc(params(vec![1.0, 1.0], 0.0)),
        )
        .unwrap();
        assert!(matches!(
            model.predict_proba(&[1.0, 1.0]),
            Err(InferenceError::ProbabilityUnsupported(_))
        ));
        assert!(model.predict(&[1.0, 1.0]).is_ok());
    }

    #[test]
    fn test_spec_must_match_layout() {
        let spec = ModelSpec::LogisticRegression(LinearParams {
            feature_names: vec!["avg_temp".to_string(), "mean_ndvi".to_string()],
            coefficients: vec![1.0, 1.0],
            intercept: 0.0,
        });
        assert!(LinearClassifier::from_spec(ModelKind::Malaria, spec).is_err());

        let short = ModelSpec::LinearSvc(params(vec![1.0], 0.0));
        assert!(LinearClassifier::from_spec(ModelKind::Cholera, short).is_err());
    }

    #[test]
    fn test_spec_json_shape() {
        let json = r#"{
            "kind": "logistic_regression",
            "feature_names": ["unimproved_sanitation_rate", "avg_rainfall"],
            "coefficients": [3.1, 0.01],
            "intercept": -2.4
        }"#;
        let spec: ModelSpec = serde_json::from_str(json).unwrap();
        assert!(LinearClassifier::from_spec(ModelKind::Cholera, spec).is_ok());
    }

    #[test]
    fn test_label_conversion_is_total() {
        assert_eq!(Label::try_from(RawLabel::Int(1)), Ok(Label::Outbreak));
        assert_eq!(Label::try_from(RawLabel::Int(0)), Ok(Label::NoOutbreak));
        assert!(Label::try_from(RawLabel::Int(2)).is_err());
        assert!(Label::try_from(RawLabel::Int(-1)).is_err());
    }
}
