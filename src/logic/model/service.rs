//! Prediction Service - uniform risk scoring over both classifiers

use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::classifier::{Classifier, InferenceError, Label};
use super::loader::ModelLoader;
use super::threshold::outbreak_flag;
use super::PredictionError;
use crate::logic::features::{extract, FeatureInput, FeatureVector, ModelKind};

/// Label plus class-1 probability when the model can estimate one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: Label,
    pub probability: Option<f64>,
}

impl PredictionResult {
    pub fn outbreak_flag(&self) -> u8 {
        outbreak_flag(self.probability)
    }
}

/// One element of a batch request.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchItem {
    pub disease: String,
    pub features: Option<FeatureInput>,
}

/// Owns both classifiers; each is loaded on first use and kept for the
/// lifetime of the service.
pub struct PredictionService {
    loader: Arc<dyn ModelLoader>,
    cholera: OnceCell<Arc<dyn Classifier>>,
    malaria: OnceCell<Arc<dyn Classifier>>,
}

impl PredictionService {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            cholera: OnceCell::new(),
            malaria: OnceCell::new(),
        }
    }

    fn cell(&self, model: ModelKind) -> &OnceCell<Arc<dyn Classifier>> {
        match model {
            ModelKind::Cholera => &self.cholera,
            ModelKind::Malaria => &self.malaria,
        }
    }

    /// Cached classifier, loading it if this is the first access.
    ///
    /// Concurrent callers block on the cell while one of them loads, so a
    /// model is never loaded twice. A failed load leaves the cell empty.
    pub fn model(&self, model: ModelKind) -> Result<&Arc<dyn Classifier>, PredictionError> {
        self.cell(model).get_or_try_init(|| self.loader.load(model))
    }

    pub fn is_loaded(&self, model: ModelKind) -> bool {
        self.cell(model).get().is_some()
    }

    /// Label only; used when annotating report rows.
    pub fn predict_label(&self, features: &FeatureVector) -> Result<Label, PredictionError> {
        let classifier = self.model(features.model)?;
        let raw = classifier
            .predict(features.as_slice())
            .map_err(|source| PredictionError::Inference {
                model: features.model,
                source,
            })?;
        Label::try_from(raw).map_err(|source| PredictionError::Inference {
            model: features.model,
            source,
        })
    }

    /// Label and probability; a missing probability does not fail the call.
    pub fn score(&self, features: &FeatureVector) -> Result<PredictionResult, PredictionError> {
        let label = self.predict_label(features)?;
        let classifier = self.model(features.model)?;

        let probability = match classifier.predict_proba(features.as_slice()) {
            Ok(proba) => class_one_probability(features.model, &proba),
            Err(e) => {
                let unavailable = PredictionError::ModelUnavailable {
                    model: features.model,
                    reason: e.to_string(),
                };
                tracing::warn!("Could not get probability: {}", unavailable);
                None
            }
        };

        Ok(PredictionResult { label, probability })
    }

    /// Resolve a disease name and raw payload, then score.
    pub fn score_input(
        &self,
        disease: &str,
        input: &FeatureInput,
    ) -> Result<PredictionResult, PredictionError> {
        let model: ModelKind = disease
            .parse()
            .map_err(|_| PredictionError::UnknownDisease(disease.to_string()))?;
        let features = extract(model, input)?;
        self.score(&features)
    }

    /// Scores every item independently; a bad item yields an error in its
    /// slot and never affects its neighbours.
    pub fn score_batch(&self, items: &[Value]) -> Vec<Result<PredictionResult, PredictionError>> {
        items
            .iter()
            .map(|item| {
                let parsed: BatchItem = serde_json::from_value(item.clone())
                    .map_err(|e| PredictionError::InvalidRequest(e.to_string()))?;
                match parsed.features {
                    Some(ref features) if !features.is_empty() => {
                        self.score_input(&parsed.disease, features)
                    }
                    _ => Err(PredictionError::InvalidRequest("Missing features".to_string())),
                }
            })
            .collect()
    }
}

fn class_one_probability(model: ModelKind, proba: &[f64]) -> Option<f64> {
    let p = match proba {
        [] => None,
        [only] => Some(*only),
        [_, p1, ..] => Some(*p1),
    }?;

    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Some(p)
    } else {
        let err = InferenceError::Failed(format!("probability {} outside [0, 1]", p));
        tracing::warn!("Discarding {} probability: {}", model, err);
        None
    }
}
