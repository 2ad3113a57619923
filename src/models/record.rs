//! Epidemiological record model

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Disease column of a record.
///
/// Only cholera and malaria have a classifier behind them; every other value
/// is kept verbatim so per-disease summaries cover whatever the dataset holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Disease {
    Cholera,
    Malaria,
    Other(String),
}

impl Disease {
    pub fn as_str(&self) -> &str {
        match self {
            Disease::Cholera => "cholera",
            Disease::Malaria => "malaria",
            Disease::Other(name) => name.as_str(),
        }
    }
}

impl From<String> for Disease {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "cholera" => Disease::Cholera,
            "malaria" => Disease::Malaria,
            _ => Disease::Other(value.trim().to_string()),
        }
    }
}

impl From<&str> for Disease {
    fn from(value: &str) -> Self {
        Disease::from(value.to_string())
    }
}

impl From<Disease> for String {
    fn from(disease: Disease) -> Self {
        disease.as_str().to_string()
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weekly observation for a county and disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "week")]
    pub period: String,
    #[serde(rename = "county")]
    pub region: String,
    pub disease: Disease,
    pub cases: u32,
    #[serde(deserialize_with = "deserialize_flag")]
    pub outbreak: bool,
    pub avg_temp: f64,
    pub avg_rainfall: f64,
    pub unimproved_sanitation_rate: f64,
    pub mean_ndvi: f64,
}

impl Record {
    /// Year-month prefix of the period (first seven characters).
    pub fn month(&self) -> &str {
        prefix_chars(&self.period, 7)
    }
}

/// Column order shared by dataset exports and report artifacts.
pub const RECORD_COLUMNS: [&str; 9] = [
    "week",
    "county",
    "disease",
    "cases",
    "outbreak",
    "avg_temp",
    "avg_rainfall",
    "unimproved_sanitation_rate",
    "mean_ndvi",
];

impl Record {
    /// Cells in `RECORD_COLUMNS` order, outbreak written as `0/1`.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.period.clone(),
            self.region.clone(),
            self.disease.to_string(),
            self.cases.to_string(),
            if self.outbreak { "1" } else { "0" }.to_string(),
            self.avg_temp.to_string(),
            self.avg_rainfall.to_string(),
            self.unimproved_sanitation_rate.to_string(),
            self.mean_ndvi.to_string(),
        ]
    }
}

/// Slice of at most `n` characters, never splitting a code point.
pub fn prefix_chars(value: &str, n: usize) -> &str {
    match value.char_indices().nth(n) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Accepts `0/1`, `true/false` (any case) and numeric `0.0/1.0` cells.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(i) => Ok(i != 0),
        Flag::Float(f) => Ok(f != 0.0),
        Flag::Text(s) => match s.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!("invalid outbreak flag '{}'", other))),
        },
    }
}
