//! Reports Module - periodic surveillance reports
//!
//! Records are grouped by week and by month, annotated with model labels,
//! summarized, and persisted as CSV artifacts. PDFs are rendered from those
//! artifacts on demand (see `logic::render`).

pub mod aggregate;
pub mod artifact;
pub mod store;


pub use aggregate::{report_filename, Granularity, ReportGenerator, ReportSummary};
pub use artifact::{ArtifactError, ReportArtifact, Table};
pub use store::{ReportStore, StoreError, WriteFailure, WriteSummary};

use crate::logic::model::{PredictionError, PredictionService};
use crate::models::record::Record;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report scoring failed: {0}")]
    Prediction(#[from] PredictionError),
}

/// Rebuild every weekly and monthly report and overwrite the stored copies.
///
/// Nothing is written unless every group was scored successfully. Storage
/// failures are per file and reported in the returned summary.
pub fn regenerate(
    service: &PredictionService,
    records: &[Record],
    store: &ReportStore,
) -> Result<WriteSummary, ReportError> {
    tracing::info!("Generating reports from {} records", records.len());
    let artifacts = ReportGenerator::new(service).generate_all(records)?;
    Ok(store.write_all(&artifacts))
}
