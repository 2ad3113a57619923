//! Outbreak Risk Backend Server
//!
//! Scores cholera and malaria outbreak risk from environmental features and
//! publishes weekly/monthly surveillance reports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    OUTBREAK RISK SERVER                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────┐  ┌──────────────────────┐  │
//! │  │  API      │  │  Prediction  │  │  Report Generation   │  │
//! │  │  (Axum)   │─▶│  Service     │◀─│  (weekly / monthly)  │  │
//! │  └─────┬─────┘  └──────────────┘  └──────────┬───────────┘  │
//! │        │                                      ▼             │
//! │        │          ┌──────────┐        ┌──────────────┐      │
//! │        └─────────▶│ Dataset  │        │ Report Store │      │
//! │                   │  (CSV)   │        │  (reports/)  │      │
//! │                   └──────────┘        └──────┬───────┘      │
//! │                                              ▼              │
//! │                                       PDF Renderer          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod logic;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

use logic::dataset::Dataset;
use logic::model::{FileModelLoader, PredictionService};
use logic::reports::ReportStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "outbreak_risk_server=debug,tower_http=debug".into());
    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Outbreak Risk Server starting ({})...", config.environment);

    // Load dataset
    let dataset = Dataset::load(&config.data_path, Some(config.added_data_path.as_path()))
        .with_context(|| format!("Failed to load dataset {}", config.data_path.display()))?;

    // Models load lazily on first use
    let loader = FileModelLoader::new(
        config.cholera_model_path.clone(),
        config.malaria_model_path.clone(),
    );
    let service = PredictionService::new(Arc::new(loader));

    let store = ReportStore::open(&config.reports_dir)
        .with_context(|| format!("Failed to open reports directory {}", config.reports_dir.display()))?;
    tracing::info!("Reports directory: {}", store.dir().display());

    // Build application state
    let state = AppState {
        config: config.clone(),
        service: Arc::new(service),
        dataset: Arc::new(dataset),
        store: Arc::new(store),
    };

    // Reports are complete on disk before the first request is accepted
    {
        let state = state.clone();
        let generated = tokio::task::spawn_blocking(move || {
            logic::reports::regenerate(&state.service, state.dataset.records(), &state.store)
        })
        .await
        .context("Report generation task panicked")?;
        match generated {
            Ok(summary) if summary.is_complete() => {
                tracing::info!("Generated {} reports", summary.written.len())
            }
            Ok(summary) => tracing::warn!(
                "Generated {} reports, {} could not be written",
                summary.written.len(),
                summary.failed.len()
            ),
            Err(e) => tracing::error!("Initial report generation failed: {}", e),
        }
    }

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub service: Arc<PredictionService>,
    pub dataset: Arc<Dataset>,
    pub store: Arc<ReportStore>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::check))

        // Dataset
        .route("/data/outbreak", get(handlers::data::outbreak))
        .route("/data/monthly_comparison", get(handlers::data::monthly_comparison))
        .route("/data/county_data", get(handlers::data::county_data))
        .route("/data/environmental", get(handlers::data::environmental))

        // Prediction
        .route("/predict/cholera", post(handlers::predict::cholera))
        .route("/predict/malaria", post(handlers::predict::malaria))
        .route("/predict/batch", post(handlers::predict::batch))

        // Reports
        .route("/reports/list", get(handlers::reports::list))
        .route("/reports/regenerate", post(handlers::reports::regenerate))
        .route("/reports/download", get(handlers::reports::export))
        .route("/reports/download/:filename", get(handlers::reports::download))

        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
