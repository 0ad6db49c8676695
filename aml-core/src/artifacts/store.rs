//! Artifact store
//!
//! `ArtifactLoader::load` runs once at start-up and yields an `Artifacts`
//! holder. The holder is read-only afterwards and shared by reference.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fetch::{ensure_local, ArtifactSource, Fetcher, HttpFetcher};
use super::ArtifactError;
use crate::constants::{
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MODEL_FILE, DEFAULT_MODEL_URL, DEFAULT_SCALER_FILE,
    DEFAULT_SCALER_URL,
};
use crate::features::LayoutInfo;
use crate::model::{load_model, ModelMetadata, Regressor, StandardScaler};

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub model: ArtifactSource,
    pub scaler: ArtifactSource,
    pub fetch_timeout: Duration,
}

impl ArtifactConfig {
    /// Default sources with both files under `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model: ArtifactSource {
                name: "model".to_string(),
                url: DEFAULT_MODEL_URL.to_string(),
                path: dir.join(DEFAULT_MODEL_FILE),
                sha256: None,
            },
            scaler: ArtifactSource {
                name: "scaler".to_string(),
                url: DEFAULT_SCALER_URL.to_string(),
                path: dir.join(DEFAULT_SCALER_FILE),
                sha256: None,
            },
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self::in_dir(&PathBuf::from("."))
    }
}

// ============================================================================
// HOLDER
// ============================================================================

/// A loaded artifact, or why it is missing
pub enum Slot<T> {
    Ready(T),
    Failed(String),
}

impl<T> Slot<T> {
    pub fn get(&self) -> Result<&T, &str> {
        match self {
            Slot::Ready(value) => Ok(value),
            Slot::Failed(reason) => Err(reason.as_str()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Slot::Ready(_))
    }

    fn status(&self) -> ArtifactStatus {
        match self {
            Slot::Ready(_) => ArtifactStatus::Ready,
            Slot::Failed(reason) => ArtifactStatus::Failed { reason: reason.clone() },
        }
    }
}

/// Model and scaler, loaded once
pub struct Artifacts {
    scaler: Slot<StandardScaler>,
    model: Slot<Box<dyn Regressor>>,
    model_metadata: Option<ModelMetadata>,
    loaded_at: DateTime<Utc>,
}

impl Artifacts {
    /// Holder around artifacts that are already in memory
    pub fn from_parts(scaler: StandardScaler, model: Box<dyn Regressor>) -> Self {
        Self {
            scaler: Slot::Ready(scaler),
            model: Slot::Ready(model),
            model_metadata: None,
            loaded_at: Utc::now(),
        }
    }

    pub fn new(scaler: Slot<StandardScaler>, model: Slot<Box<dyn Regressor>>) -> Self {
        Self {
            scaler,
            model,
            model_metadata: None,
            loaded_at: Utc::now(),
        }
    }

    pub fn scaler(&self) -> Result<&StandardScaler, &str> {
        self.scaler.get()
    }

    pub fn model(&self) -> Result<&dyn Regressor, &str> {
        self.model.get().map(|m| &**m)
    }

    pub fn is_ready(&self) -> bool {
        self.scaler.is_ready() && self.model.is_ready()
    }

    /// Why the holder is unusable, if it is
    pub fn unavailable_reason(&self) -> Option<String> {
        let reasons: Vec<String> = [
            self.scaler.get().err().map(|r| format!("scaler: {}", r)),
            self.model.get().err().map(|r| format!("model: {}", r)),
        ]
        .into_iter()
        .flatten()
        .collect();

        if reasons.is_empty() {
            None
        } else {
            Some(reasons.join("; "))
        }
    }

    pub fn report(&self) -> ArtifactReport {
        ArtifactReport {
            ready: self.is_ready(),
            model: self.model.status(),
            scaler: self.scaler.status(),
            model_type: self.model.get().ok().map(|m| m.kind().to_string()),
            model_metadata: self.model_metadata.clone(),
            layout: LayoutInfo::current(),
            loaded_at: self.loaded_at,
        }
    }
}

// ============================================================================
// STATUS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ArtifactStatus {
    Ready,
    Failed { reason: String },
}

/// Readiness report for the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactReport {
    pub ready: bool,
    pub model: ArtifactStatus,
    pub scaler: ArtifactStatus,
    pub model_type: Option<String>,
    pub model_metadata: Option<ModelMetadata>,
    pub layout: LayoutInfo,
    pub loaded_at: DateTime<Utc>,
}

// ============================================================================
// LOADER
// ============================================================================

pub struct ArtifactLoader<F: Fetcher = HttpFetcher> {
    fetcher: F,
}

impl ArtifactLoader<HttpFetcher> {
    pub fn http(timeout: Duration) -> Self {
        Self::new(HttpFetcher::new(timeout))
    }
}

impl<F: Fetcher> ArtifactLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch missing files, then deserialize both artifacts.
    ///
    /// Failures are logged and recorded in the returned holder; this never
    /// returns an error.
    pub fn load(&self, config: &ArtifactConfig) -> Artifacts {
        let scaler = self.load_one(&config.scaler, |path| {
            StandardScaler::from_file(path).map_err(ArtifactError::from)
        });

        let mut model_metadata = None;
        let model = self.load_one(&config.model, |path| {
            let (model, metadata) = load_model(path)?;
            model_metadata = Some(metadata);
            Ok(model)
        });

        let artifacts = Artifacts {
            scaler,
            model,
            model_metadata,
            loaded_at: Utc::now(),
        };

        match artifacts.unavailable_reason() {
            None => log::info!("Artifacts ready"),
            Some(reason) => log::warn!("Artifacts unavailable: {}", reason),
        }

        artifacts
    }

    fn load_one<T>(
        &self,
        source: &ArtifactSource,
        deserialize: impl FnOnce(&Path) -> Result<T, ArtifactError>,
    ) -> Slot<T> {
        let result = ensure_local(source, &self.fetcher)
            .and_then(|_| deserialize(&source.path));

        match result {
            Ok(value) => Slot::Ready(value),
            Err(e) => {
                log::error!("{} not loaded: {}", source.name, e);
                Slot::Failed(e.to_string())
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
