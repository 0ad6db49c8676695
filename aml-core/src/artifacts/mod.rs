//! Artifacts Module - fetch, load and hold the model and scaler
//!
//! Loading never aborts the process: each artifact ends up either ready or
//! failed with a reason, and the predictor checks readiness before use.

pub mod fetch;
pub mod store;

use thiserror::Error;

use crate::model::{ModelError, ScalerError};

// Re-export common types
pub use fetch::{ensure_local, sha256_hex, ArtifactSource, FetchOutcome, Fetcher, HttpFetcher};
pub use store::{ArtifactConfig, ArtifactLoader, ArtifactReport, ArtifactStatus, Artifacts, Slot};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to download {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Checksum mismatch for {name}: expected {expected}, got {actual}")]
    Checksum {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Artifact file error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Scaler(#[from] ScalerError),

    #[error(transparent)]
    Model(#[from] ModelError),
}
