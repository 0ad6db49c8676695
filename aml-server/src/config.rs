//! Configuration module

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use aml_core::constants::{
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MODEL_FILE, DEFAULT_MODEL_URL, DEFAULT_SCALER_FILE,
    DEFAULT_SCALER_URL,
};
use aml_core::{ArtifactConfig, ArtifactSource};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Emit logs as JSON lines
    pub json_logs: bool,

    /// Where the model and scaler come from and live
    pub artifacts: ArtifactConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let artifact_dir = PathBuf::from(var("AML_ARTIFACT_DIR").unwrap_or_else(|| ".".to_string()));
        let sha256 = |key: &str| var(key).filter(|s| !s.trim().is_empty());

        Self {
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            environment: var("ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),

            json_logs: var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),

            artifacts: ArtifactConfig {
                model: ArtifactSource {
                    name: "model".to_string(),
                    url: var("AML_MODEL_URL").unwrap_or_else(|| DEFAULT_MODEL_URL.to_string()),
                    path: artifact_dir.join(
                        var("AML_MODEL_FILE").unwrap_or_else(|| DEFAULT_MODEL_FILE.to_string()),
                    ),
                    sha256: sha256("AML_MODEL_SHA256"),
                },
                scaler: ArtifactSource {
                    name: "scaler".to_string(),
                    url: var("AML_SCALER_URL").unwrap_or_else(|| DEFAULT_SCALER_URL.to_string()),
                    path: artifact_dir.join(
                        var("AML_SCALER_FILE").unwrap_or_else(|| DEFAULT_SCALER_FILE.to_string()),
                    ),
                    sha256: sha256("AML_SCALER_SHA256"),
                },
                fetch_timeout: Duration::from_secs(
                    var("AML_FETCH_TIMEOUT_SECS")
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
                ),
            },
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
