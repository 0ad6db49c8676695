//! Standard Scaler - per-column standardization fitted at training time
//!
//! `z = (x - mean) / scale`, parameters read from a JSON export of the fitted
//! scaler. The export also carries the column names it was fitted on, which
//! must equal `FEATURE_LAYOUT`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::layout::{validate_feature_names, LayoutMismatchError, FEATURE_COUNT};

#[derive(Debug, Error)]
pub enum ScalerError {
    #[error("Failed to read scaler: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse scaler: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),

    #[error("Scaler {field} has {actual} values, expected {expected}")]
    Shape {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Scaler {field}[{index}] is not finite")]
    NonFinite { field: &'static str, index: usize },
}

/// Fitted standardization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Parse and validate a JSON export
    pub fn from_json(bytes: &[u8]) -> Result<Self, ScalerError> {
        let mut scaler: StandardScaler = serde_json::from_slice(bytes)?;
        scaler.validate()?;

        // Constant columns were fitted with scale 0; they divide by 1 instead.
        for s in scaler.scale.iter_mut() {
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Ok(scaler)
    }

    pub fn from_file(path: &Path) -> Result<Self, ScalerError> {
        log::info!("Loading scaler from: {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }

    fn validate(&self) -> Result<(), ScalerError> {
        validate_feature_names(&self.feature_names)?;

        for (field, values) in [("mean", &self.mean), ("scale", &self.scale)] {
            if values.len() != FEATURE_COUNT {
                return Err(ScalerError::Shape {
                    field,
                    expected: FEATURE_COUNT,
                    actual: values.len(),
                });
            }
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(ScalerError::NonFinite { field, index });
            }
        }

        Ok(())
    }

    /// Standardize one row; shape is preserved
    pub fn transform(&self, row: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut scaled = [0.0f64; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            scaled[i] = (row[i] - self.mean[i]) / self.scale[i];
        }
        scaled
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scaler_json(names: &str, mean: &str, scale: &str) -> Vec<u8> {
        format!(r#"{{"feature_names": {names}, "mean": {mean}, "scale": {scale}}}"#).into_bytes()
    }

    const NAMES: &str = r#"["Sex", "Year", "AgeGroup", "Ethnicity", "Race"]"#;

    #[test]
    fn test_transform_standardizes_each_column() {
        let scaler = StandardScaler::from_json(&scaler_json(
            NAMES,
            "[0.5, 2000.0, 8.5, 0.5, 1.0]",
            "[0.5, 10.0, 5.0, 0.5, 0.8]",
        ))
        .unwrap();

        let z = scaler.transform(&[1.0, 2010.0, 4.0, 0.0, 1.0]);
        assert!((z[0] - 1.0).abs() < 1e-12);
        assert!((z[1] - 1.0).abs() < 1e-12);
        assert!((z[2] - -0.9).abs() < 1e-12);
        assert!((z[3] - -1.0).abs() < 1e-12);
        assert!(z[4].abs() < 1e-12);
    }

    #[test]
    fn test_zero_scale_treated_as_one() {
        let scaler = StandardScaler::from_json(&scaler_json(
            NAMES,
            "[0.0, 0.0, 0.0, 0.0, 3.0]",
            "[1.0, 1.0, 1.0, 1.0, 0.0]",
        ))
        .unwrap();
        assert_eq!(scaler.transform(&[0.0, 0.0, 0.0, 0.0, 5.0])[4], 2.0);
    }

    #[test]
    fn test_rejects_reordered_columns() {
        let err = StandardScaler::from_json(&scaler_json(
            r#"["Year", "Sex", "AgeGroup", "Ethnicity", "Race"]"#,
            "[0, 0, 0, 0, 0]",
            "[1, 1, 1, 1, 1]",
        ))
        .unwrap_err();
        assert!(matches!(err, ScalerError::Layout(_)));
    }

    #[test]
    fn test_rejects_wrong_length() {
        let err = StandardScaler::from_json(&scaler_json(NAMES, "[0, 0, 0]", "[1, 1, 1, 1, 1]"))
            .unwrap_err();
        assert!(matches!(
            err,
            ScalerError::Shape { field: "mean", expected: 5, actual: 3 }
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        let err = StandardScaler::from_json(b"\x80\x04\x95 not json").unwrap_err();
        assert!(matches!(err, ScalerError::Json(_)));
    }
}
