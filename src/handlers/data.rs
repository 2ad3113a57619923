//! Dataset handlers

use axum::{extract::State, Json};

use crate::logic::dataset::analytics::{self, CountySummary, EnvironmentalPoint, MonthlyComparison};
use crate::models::Record;
use crate::{AppResult, AppState};

/// All records, main dataset first.
pub async fn outbreak(State(state): State<AppState>) -> Json<Vec<Record>> {
    Json(state.dataset.records().to_vec())
}

pub async fn monthly_comparison(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MonthlyComparison>>> {
    let dataset = state.dataset.clone();
    let rows = tokio::task::spawn_blocking(move || analytics::monthly_comparison(dataset.records())).await?;
    Ok(Json(rows))
}

pub async fn county_data(State(state): State<AppState>) -> AppResult<Json<Vec<CountySummary>>> {
    let dataset = state.dataset.clone();
    let rows = tokio::task::spawn_blocking(move || analytics::county_data(dataset.records())).await?;
    Ok(Json(rows))
}

pub async fn environmental(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<EnvironmentalPoint>>> {
    let dataset = state.dataset.clone();
    let rows = tokio::task::spawn_blocking(move || analytics::environmental(dataset.records())).await?;
    Ok(Json(rows))
}
