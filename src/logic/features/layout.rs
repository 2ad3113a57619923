//! Feature Layout - which inputs each classifier consumes, and in what order
//!
//! Positional payloads always follow `POSITIONAL_LAYOUT`; each model picks
//! its two columns out of it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::record::{Disease, Record};

/// Order of a positional (array) feature payload.
pub const POSITIONAL_LAYOUT: [&str; 4] = [
    "unimproved_sanitation_rate",
    "avg_rainfall",
    "mean_ndvi",
    "avg_temp",
];

/// Number of features every model consumes.
pub const MODEL_FEATURE_COUNT: usize = 2;

/// The scoreable diseases, one classifier each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Cholera,
    Malaria,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Cholera, ModelKind::Malaria];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Cholera => "cholera",
            ModelKind::Malaria => "malaria",
        }
    }

    /// Named inputs in the order the model was trained on.
    pub fn feature_names(&self) -> [&'static str; MODEL_FEATURE_COUNT] {
        match self {
            ModelKind::Cholera => ["unimproved_sanitation_rate", "avg_rainfall"],
            ModelKind::Malaria => ["mean_ndvi", "avg_temp"],
        }
    }

    /// Indices into `POSITIONAL_LAYOUT`.
    pub fn positional_indices(&self) -> [usize; MODEL_FEATURE_COUNT] {
        match self {
            ModelKind::Cholera => [0, 1],
            ModelKind::Malaria => [2, 3],
        }
    }

    /// Model responsible for a disease, if any.
    pub fn for_disease(disease: &Disease) -> Option<Self> {
        match disease {
            Disease::Cholera => Some(ModelKind::Cholera),
            Disease::Malaria => Some(ModelKind::Malaria),
            Disease::Other(_) => None,
        }
    }

    /// Reads the model's inputs straight off a dataset record.
    pub fn record_values(&self, record: &Record) -> [f64; MODEL_FEATURE_COUNT] {
        match self {
            ModelKind::Cholera => [record.unimproved_sanitation_rate, record.avg_rainfall],
            ModelKind::Malaria => [record.mean_ndvi, record.avg_temp],
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cholera" => Ok(ModelKind::Cholera),
            "malaria" => Ok(ModelKind::Malaria),
            other => Err(format!("Unknown disease: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_indices_match_names() {
        for kind in ModelKind::ALL {
            let by_index = kind.positional_indices().map(|i| POSITIONAL_LAYOUT[i]);
            assert_eq!(by_index, kind.feature_names());
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Cholera".parse::<ModelKind>(), Ok(ModelKind::Cholera));
        assert!("dengue".parse::<ModelKind>().is_err());
    }
}
