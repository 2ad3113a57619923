//! Prediction handlers
//!
//! Scoring may load a model from disk on first use, so it always runs on the
//! blocking pool.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::logic::features::{extract, FeatureInput, ModelKind};
use crate::models::{BatchEntry, PredictRequest, PredictResponse};
use crate::{AppError, AppResult, AppState};

pub async fn cholera(
    State(state): State<AppState>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    predict(state, ModelKind::Cholera, body).await
}

pub async fn malaria(
    State(state): State<AppState>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    predict(state, ModelKind::Malaria, body).await
}

async fn predict(
    state: AppState,
    model: ModelKind,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(request) = body?;
    let features = request.features.unwrap_or(Value::Null);
    let input = parse_features(&features)?;

    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || {
        let vector = extract(model, &input)?;
        service.score(&vector)
    })
    .await?;

    match result {
        Ok(scored) => {
            tracing::debug!("{} prediction: {:?}", model, scored);
            Ok(Json(scored.into()))
        }
        Err(e) => Err(AppError::prediction(e, features)),
    }
}

/// `null`, `{}` and `[]` all count as missing.
fn parse_features(features: &Value) -> AppResult<FeatureInput> {
    if features.is_null() {
        return Err(AppError::MissingFeatures);
    }
    let input: FeatureInput =
        serde_json::from_value(features.clone()).map_err(|_| AppError::InvalidFeatures {
            message: "features must be an object or an array".to_string(),
            features: features.clone(),
        })?;
    if input.is_empty() {
        return Err(AppError::MissingFeatures);
    }
    Ok(input)
}

/// Scores each `{disease, features}` item independently; failures are
/// reported in place and never abort the batch.
pub async fn batch(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Vec<BatchEntry>>> {
    let Json(body) = body?;
    let Value::Array(items) = body else {
        return Err(AppError::ValidationError(
            "Request body must be a JSON array".to_string(),
        ));
    };

    let service = state.service.clone();
    let entries = tokio::task::spawn_blocking(move || {
        let results = service.score_batch(&items);
        items
            .into_iter()
            .zip(results)
            .map(|(input, result)| match result {
                Ok(scored) => BatchEntry::Scored(scored.into()),
                Err(e) => {
                    tracing::debug!("Batch item rejected: {}", e);
                    BatchEntry::Failed {
                        error: e.to_string(),
                        input,
                    }
                }
            })
            .collect::<Vec<_>>()
    })
    .await?;

    tracing::info!("Scored batch of {} items", entries.len());
    Ok(Json(entries))
}
