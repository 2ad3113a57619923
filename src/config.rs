//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Main epidemiological dataset (CSV)
    pub data_path: PathBuf,

    /// Optional added-county dataset, appended when present
    pub added_data_path: PathBuf,

    /// Cholera classifier (JSON linear model, or `.onnx` with the `onnx` feature)
    pub cholera_model_path: PathBuf,

    /// Malaria classifier
    pub malaria_model_path: PathBuf,

    /// Directory holding generated report artifacts
    pub reports_dir: PathBuf,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            data_path: path_var("DATA_PATH", "data/simulated_outbreak_data.csv"),

            added_data_path: path_var("ADDED_DATA_PATH", "data/added_county_data.csv"),

            cholera_model_path: path_var("CHOLERA_MODEL_PATH", "models/cholera_model.json"),

            malaria_model_path: path_var("MALARIA_MODEL_PATH", "models/malaria_model.json"),

            reports_dir: path_var("REPORTS_DIR", "reports"),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn path_var(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
