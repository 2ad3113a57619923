//! Dataset Module - epidemiological records loaded once at start-up
//!
//! The main CSV is concatenated with an optional added-county CSV when that
//! file exists. Records are read-only afterwards.

pub mod analytics;

use std::path::Path;

use crate::models::record::{Record, RECORD_COLUMNS};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset file not found: {0}")]
    NotFound(String),

    #[error("failed to read {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to encode dataset: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Load the main file, then append the added file if present.
    pub fn load(main: &Path, added: Option<&Path>) -> Result<Self, DatasetError> {
        if !main.exists() {
            return Err(DatasetError::NotFound(main.display().to_string()));
        }
        let mut records = read_csv(main)?;
        tracing::info!("Loaded {} records from {}", records.len(), main.display());

        if let Some(added) = added.filter(|p| p.exists()) {
            let extra = read_csv(added)?;
            tracing::info!("Appended {} records from {}", extra.len(), added.display());
            records.extend(extra);
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whole dataset as CSV, columns in source order.
    pub fn to_csv(&self) -> Result<Vec<u8>, DatasetError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(RECORD_COLUMNS)
            .map_err(|e| DatasetError::Encode(e.to_string()))?;
        for record in &self.records {
            writer
                .write_record(record.to_row())
                .map_err(|e| DatasetError::Encode(e.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| DatasetError::Encode(e.to_string()))
    }
}

fn read_csv(path: &Path) -> Result<Vec<Record>, DatasetError> {
    let csv_error = |source| DatasetError::Csv {
        path: path.display().to_string(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;
    reader
        .deserialize()
        .collect::<Result<Vec<Record>, _>>()
        .map_err(csv_error)
}
