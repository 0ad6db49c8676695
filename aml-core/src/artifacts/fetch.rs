//! Artifact fetching
//!
//! Makes sure an artifact file exists locally, downloading it once if absent.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ArtifactError;
use crate::constants::MAX_ARTIFACT_BYTES;

// ============================================================================
// TYPES
// ============================================================================

/// Where an artifact comes from and where it lives on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSource {
    pub name: String,
    pub url: String,
    pub path: PathBuf,
    /// Expected SHA-256 of the downloaded bytes (hex), if pinned
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    AlreadyPresent,
    Downloaded { bytes: usize },
}

/// Retrieves the bytes behind a URL
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ArtifactError>;
}

// ============================================================================
// HTTP FETCHER
// ============================================================================

/// Blocking HTTP GET
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ArtifactError> {
        let fetch_err = |reason: String| ArtifactError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = ureq::get(url)
            .timeout(self.timeout)
            .call()
            .map_err(|e| fetch_err(e.to_string()))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_ARTIFACT_BYTES + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| fetch_err(e.to_string()))?;

        if bytes.len() as u64 > MAX_ARTIFACT_BYTES {
            return Err(fetch_err(format!(
                "response exceeds {} bytes",
                MAX_ARTIFACT_BYTES
            )));
        }

        Ok(bytes)
    }
}

// ============================================================================
// ENSURE LOCAL
// ============================================================================

/// Hex SHA-256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Download `source` unless its file already exists.
///
/// The file is written to a `.part` sibling and renamed into place, so a
/// failed download never leaves a truncated artifact behind.
pub fn ensure_local<F: Fetcher + ?Sized>(
    source: &ArtifactSource,
    fetcher: &F,
) -> Result<FetchOutcome, ArtifactError> {
    if source.path.exists() {
        log::debug!("{} present at {}", source.name, source.path.display());
        return Ok(FetchOutcome::AlreadyPresent);
    }

    log::info!("Downloading {} from {}", source.name, source.url);
    let bytes = fetcher.fetch(&source.url)?;

    if let Some(expected) = &source.sha256 {
        let actual = sha256_hex(&bytes);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(ArtifactError::Checksum {
                name: source.name.clone(),
                expected: expected.clone(),
                actual,
            });
        }
    }

    if let Some(parent) = source.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let partial = part_path(&source.path);
    std::fs::write(&partial, &bytes)?;
    if let Err(e) = std::fs::rename(&partial, &source.path) {
        let _ = std::fs::remove_file(&partial);
        return Err(e.into());
    }

    log::info!("Saved {} ({} bytes) to {}", source.name, bytes.len(), source.path.display());
    Ok(FetchOutcome::Downloaded { bytes: bytes.len() })
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

// ============================================================================
// TESTS
// ============================================================================
