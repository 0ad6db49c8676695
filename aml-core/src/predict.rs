//! Prediction Adapter
//!
//! encode -> assemble row -> standardize -> infer. A pure function of the
//! input and the shared artifacts.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifacts::Artifacts;
use crate::constants::{CRUDE_RATE_DECIMALS, SURVIVAL_RATE_DECIMALS};
use crate::features::{EncodingError, FeatureRow, RawInput};
use crate::model::ModelError;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("Artifacts unavailable: {0}")]
    ArtifactsUnavailable(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Model returned a non-finite value")]
    NonFinite,
}

// ============================================================================
// RESULT
// ============================================================================

/// Raw model output for one row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub crude_mortality_rate: f64,
    pub survival_rate: f64,
}

impl Prediction {
    pub fn from_array(values: [f64; 2]) -> Self {
        Self {
            crude_mortality_rate: values[0],
            survival_rate: values[1],
        }
    }

    /// Display values: crude rate to 1 place, survival rate to 6
    pub fn rounded(&self) -> Prediction {
        Prediction {
            crude_mortality_rate: round_to(self.crude_mortality_rate, CRUDE_RATE_DECIMALS),
            survival_rate: round_to(self.survival_rate, SURVIVAL_RATE_DECIMALS),
        }
    }
}

/// Round half to even at `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

// ============================================================================
// PREDICTOR
// ============================================================================

#[derive(Clone)]
pub struct Predictor {
    artifacts: Arc<Artifacts>,
}

impl Predictor {
    pub fn new(artifacts: Arc<Artifacts>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn predict(&self, input: &RawInput) -> Result<Prediction, PredictError> {
        if let Some(reason) = self.artifacts.unavailable_reason() {
            return Err(PredictError::ArtifactsUnavailable(reason));
        }
        let scaler = self
            .artifacts
            .scaler()
            .map_err(|r| PredictError::ArtifactsUnavailable(r.to_string()))?;
        let model = self
            .artifacts
            .model()
            .map_err(|r| PredictError::ArtifactsUnavailable(r.to_string()))?;

        let row: FeatureRow = input.encode();
        let standardized = scaler.transform(&row.to_array());
        let output = model.predict(&standardized)?;

        if output.iter().any(|v| !v.is_finite()) {
            return Err(PredictError::NonFinite);
        }

        log::debug!("Predicted {:?} for row {:?}", output, row);
        Ok(Prediction::from_array(output))
    }

    /// Name-keyed entry point: `Sex`, `Year`, `AgeGroup`, `Ethnicity`, `Race`
    pub fn predict_labels(&self, inputs: &HashMap<String, String>) -> Result<Prediction, PredictError> {
        let input = RawInput::from_map(inputs)?;
        self.predict(&input)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::Slot;
    use crate::features::{AgeGroup, Ethnicity, Race, Sex, YEAR_MAX, YEAR_MIN};
    use crate::model::{LinearRegressor, Regressor, StandardScaler};

    fn scaler() -> StandardScaler {
        StandardScaler::from_json(
            br#"{
                "feature_names": ["Sex", "Year", "AgeGroup", "Ethnicity", "Race"],
                "mean": [0.5, 2010.0, 8.5, 0.5, 1.0],
                "scale": [0.5, 10.0, 5.0, 0.5, 1.0]
            }"#,
        )
        .unwrap()
    }

    /// Output 0 echoes each standardized column weighted by a power of ten,
    /// so the column order can be read back from the result.
    fn column_echo_model() -> Box<dyn Regressor> {
        Box::new(
            LinearRegressor::from_json(
                br#"{
                    "coefficients": [[10000, 1000, 100, 10, 1], [0, 0, 0, 0, 0]],
                    "intercepts": [0, 0.5]
                }"#,
            )
            .unwrap(),
        )
    }

    fn predictor() -> Predictor {
        Predictor::new(Arc::new(Artifacts::from_parts(scaler(), column_echo_model())))
    }

    #[test]
    fn test_reference_input_flows_through_in_column_order() {
        let input = RawInput::from_labels("Female", 2010, "20-24 years", "Non-Hispanic", "White")
            .unwrap();
        assert_eq!(input.encode().to_array(), [1.0, 2010.0, 4.0, 0.0, 1.0]);

        // z = [1, 0, -0.9, -1, 0]
        let p = predictor().predict(&input).unwrap();
        let expected = 10000.0 * 1.0 + 1000.0 * 0.0 + 100.0 * -0.9 + 10.0 * -1.0 + 0.0;
        assert!((p.crude_mortality_rate - expected).abs() < 1e-9);
        assert_eq!(p.survival_rate, 0.5);
    }

    #[test]
    fn test_every_combination_predicts() {
        let predictor = predictor();
        for sex in Sex::ALL {
            for age_group in AgeGroup::ALL {
                for ethnicity in Ethnicity::ALL {
                    for race in Race::ALL {
                        for year in [YEAR_MIN, 2010, YEAR_MAX] {
                            let input = RawInput { sex, year, age_group, ethnicity, race };
                            assert!(predictor.predict(&input).is_ok());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_predict_labels_unmapped_category() {
        let inputs: HashMap<String, String> = [
            ("Sex", "Other"),
            ("Year", "2010"),
            ("AgeGroup", "20-24 years"),
            ("Ethnicity", "Non-Hispanic"),
            ("Race", "White"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let err = predictor().predict_labels(&inputs).unwrap_err();
        assert!(matches!(
            err,
            PredictError::Encoding(EncodingError::UnmappedCategory { field: "Sex", .. })
        ));
    }

    #[test]
    fn test_unavailable_artifacts_fail_explicitly() {
        let artifacts = Artifacts::new(
            Slot::Ready(scaler()),
            Slot::Failed("Failed to download model".to_string()),
        );
        let predictor = Predictor::new(Arc::new(artifacts));
        let input = RawInput::from_labels("Male", 2000, "85+ years", "Hispanic", "White").unwrap();

        match predictor.predict(&input) {
            Err(PredictError::ArtifactsUnavailable(reason)) => {
                assert!(reason.contains("Failed to download model"))
            }
            other => panic!("expected ArtifactsUnavailable, got {:?}", other),
        }
    }

    struct NanModel;

    impl Regressor for NanModel {
        fn kind(&self) -> &'static str {
            "nan"
        }

        fn predict(&self, _row: &[f64; 5]) -> Result<[f64; 2], ModelError> {
            Ok([f64::NAN, 0.5])
        }
    }

    #[test]
    fn test_non_finite_output_is_rejected() {
        let predictor = Predictor::new(Arc::new(Artifacts::from_parts(scaler(), Box::new(NanModel))));
        let input = RawInput::from_labels("Male", 2010, "60-64 years", "Hispanic", "White").unwrap();
        assert!(matches!(predictor.predict(&input), Err(PredictError::NonFinite)));
    }

    #[test]
    fn test_rounding_matches_display_rules() {
        let raw = Prediction::from_array([12.34567, 0.0000012345]);
        let shown = raw.rounded();
        assert_eq!(shown.crude_mortality_rate, 12.3);
        assert_eq!(shown.survival_rate, 0.000001);
    }

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(round_to(0.25, 1), 0.2);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
    }
}
