//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::logic::features::ModelKind;
use crate::AppState;

#[derive(Serialize)]
pub struct IndexResponse {
    status: &'static str,
}

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        status: "Outbreak risk backend running",
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    environment: String,
    records: usize,
    /// Models already loaded; the rest load on first use.
    models_loaded: Vec<ModelKind>,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        environment: state.config.environment.clone(),
        records: state.dataset.len(),
        models_loaded: ModelKind::ALL
            .into_iter()
            .filter(|m| state.service.is_loaded(*m))
            .collect(),
    })
}
