//! Reports handlers

use std::path::Path as FsPath;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::logic::render;
use crate::logic::reports::store::{basename, is_recognized};
use crate::logic::reports::{self, ReportStore, StoreError, WriteFailure};
use crate::{AppError, AppResult, AppState};

const DATASET_EXPORT_NAME: &str = "outbreak_data.csv";

#[derive(Debug, Serialize)]
pub struct ReportList {
    pub reports: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RegenerateResponse {
    pub reports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<WriteFailure>,
}

/// Stored report filenames
pub async fn list(State(state): State<AppState>) -> AppResult<Json<ReportList>> {
    let store = state.store.clone();
    let reports = tokio::task::spawn_blocking(move || store.list()).await??;
    Ok(Json(ReportList { reports }))
}

/// Rebuild all weekly and monthly reports from the loaded dataset
pub async fn regenerate(State(state): State<AppState>) -> AppResult<Json<RegenerateResponse>> {
    let AppState {
        service,
        dataset,
        store,
        ..
    } = state;
    let summary = tokio::task::spawn_blocking(move || {
        reports::regenerate(&service, dataset.records(), &store)
    })
    .await??;
    Ok(Json(RegenerateResponse {
        reports: summary.written,
        failed: summary.failed,
    }))
}

/// Stored file bytes, or a PDF rendered from the CSV of the same stem
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || serve_report(&store, &filename)).await?
}

fn serve_report(store: &ReportStore, filename: &str) -> AppResult<Response> {
    let name = basename(filename)
        .ok_or_else(|| AppError::NotFound(format!("Report not found: {}", filename)))?
        .to_string();
    if !is_recognized(&name) {
        return Err(StoreError::NotFound(name).into());
    }

    if store.exists(&name) {
        let bytes = store.read(&name)?;
        return Ok(attachment(&name, bytes));
    }

    let path = FsPath::new(&name);
    let is_pdf = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(StoreError::NotFound(name).into());
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let source = format!("{}.csv", stem);
    let csv = store.read(&source)?;
    let pdf = render::render(&source, &csv)?;
    tracing::info!("Rendered {} from {}", name, source);
    Ok(attachment(&name, pdf))
}

/// Full dataset as a CSV attachment
pub async fn export(State(state): State<AppState>) -> AppResult<Response> {
    let dataset = state.dataset.clone();
    let bytes = tokio::task::spawn_blocking(move || dataset.to_csv()).await??;
    Ok(attachment(DATASET_EXPORT_NAME, bytes))
}

fn attachment(name: &str, bytes: Vec<u8>) -> Response {
    let content_type = match FsPath::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("csv") => "text/csv; charset=utf-8",
        _ => "application/octet-stream",
    };
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", name),
            ),
        ],
        bytes,
    )
        .into_response()
}
