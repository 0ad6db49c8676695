//! Feature Layout - Column order of the model input row
//!
//! **This file controls the feature schema**
//!
//! The scaler and the model were fitted on a table whose columns appear in
//! exactly this order. Any change here must be matched by re-exported
//! artifacts, and `FEATURE_VERSION` must be bumped.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Total number of features
pub const FEATURE_COUNT: usize = 5;

/// Feature names in the exact order they appear in the row
pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    "Sex",       // 0: Male=0, Female=1
    "Year",      // 1: calendar year, passed through
    "AgeGroup",  // 2: five-year bucket index, 0..=17
    "Ethnicity", // 3: Non-Hispanic=0, Hispanic=1
    "Race",      // 4: Black=0, White=1, Asian/PI=2
];

/// Number of model outputs (crude mortality rate, survival rate)
pub const OUTPUT_COUNT: usize = 2;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over an ordered list of feature names
fn hash_names<'a>(names: impl IntoIterator<Item = &'a str>) -> u32 {
    let mut hasher = Hasher::new();
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }
    hasher.finalize()
}

/// Hash of the current layout, version included
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    hasher.update(&hash_names(FEATURE_LAYOUT).to_le_bytes());
    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout description exposed on the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Artifact column names disagree with `FEATURE_LAYOUT`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMismatchError {
    pub expected: Vec<String>,
    pub actual: Vec<String>,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected [{}] (hash: {:08x}), got [{}] (hash: {:08x})",
            self.expected.join(", "),
            hash_names(self.expected.iter().map(String::as_str)),
            self.actual.join(", "),
            hash_names(self.actual.iter().map(String::as_str)),
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Check that a fitted artifact's column names are the current layout, in order
pub fn validate_feature_names(names: &[String]) -> Result<(), LayoutMismatchError> {
    let matches = names.len() == FEATURE_COUNT
        && names.iter().zip(FEATURE_LAYOUT).all(|(a, b)| a == b);

    if !matches {
        return Err(LayoutMismatchError {
            expected: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            actual: names.to_vec(),
        });
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
