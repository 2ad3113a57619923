//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::logic::dataset::DatasetError;
use crate::logic::model::PredictionError;
use crate::logic::render::RenderError;
use crate::logic::reports::{ReportError, StoreError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Request errors
    MissingFeatures,
    ValidationError(String),
    InvalidFeatures { message: String, features: Value },

    // Resource errors
    NotFound(String),

    // Model and rendering failures, reported with their cause chain
    PredictionFailed {
        message: String,
        traceback: String,
        features: Value,
    },
    ReportFailed { message: String, traceback: String },

    // Generic errors
    InternalError(String),
}

impl AppError {
    /// Maps a scoring failure, keeping the submitted features for the caller.
    pub fn prediction(err: PredictionError, features: Value) -> Self {
        if err.is_client_error() {
            AppError::InvalidFeatures {
                message: err.to_string(),
                features,
            }
        } else {
            AppError::PredictionFailed {
                message: err.to_string(),
                traceback: traceback(&err),
                features,
            }
        }
    }
}

/// Error and its sources, one per line.
pub fn traceback(err: &dyn std::error::Error) -> String {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {}", cause));
        source = cause.source();
    }
    lines.join("\n")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::MissingFeatures => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Missing features" }),
            ),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::InvalidFeatures { message, features } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "features": features }),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::PredictionFailed {
                message,
                traceback,
                features,
            } => {
                tracing::error!("Prediction failed: {}", traceback);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message, "traceback": traceback, "features": features }),
                )
            }
            AppError::ReportFailed { message, traceback } => {
                tracing::error!("Report failed: {}", traceback);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message, "traceback": traceback }),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        let mut body = body;
        body["status"] = json!(status.as_u16());
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(name) => AppError::NotFound(format!("Report not found: {}", name)),
            StoreError::InvalidName(name) => AppError::NotFound(format!("Report not found: {}", name)),
            StoreError::Corrupt { .. } => AppError::ReportFailed {
                message: err.to_string(),
                traceback: traceback(&err),
            },
            StoreError::Io(_) => AppError::InternalError(err.to_string()),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::ReportFailed {
            message: err.to_string(),
            traceback: traceback(&err),
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        AppError::ReportFailed {
            message: err.to_string(),
            traceback: traceback(&err),
        }
    }
}

impl From<DatasetError> for AppError {
    fn from(err: DatasetError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("worker task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{FeatureError, ModelKind};
    use crate::logic::model::InferenceError;

    #[test]
    fn test_feature_errors_are_client_errors() {
        let err = PredictionError::from(FeatureError::Missing {
            model: ModelKind::Cholera,
            field: "avg_rainfall".to_string(),
        });
        let app = AppError::prediction(err, json!({"unimproved_sanitation_rate": 0.4}));
        assert!(matches!(app, AppError::InvalidFeatures { .. }));
        assert_eq!(app.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_inference_failure_carries_cause_chain() {
        let err = PredictionError::Inference {
            model: ModelKind::Malaria,
            source: InferenceError::Failed("bad tensor".to_string()),
        };
        match AppError::prediction(err, Value::Null) {
            AppError::PredictionFailed { traceback, .. } => {
                assert!(traceback.starts_with("malaria model inference failed"));
                assert!(traceback.contains("caused by:"));
                assert!(traceback.contains("bad tensor"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_store_not_found_is_404() {
        let app = AppError::from(StoreError::NotFound("x.csv".to_string()));
        assert_eq!(app.into_response().status(), StatusCode::NOT_FOUND);
    }
}
