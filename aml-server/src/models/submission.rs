//! Prediction submission model

use aml_core::{EncodingError, FeatureRow, Prediction, RawInput};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Five form inputs, as posted by the page or the JSON API
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct PredictionRequest {
    pub sex: String,

    #[validate(range(min = 1900, max = 2999, message = "Year must be between 1900 and 2999"))]
    pub year: i32,

    pub age_group: String,
    pub ethnicity: String,
    pub race: String,
}

impl PredictionRequest {
    /// Resolve labels into typed categories
    pub fn to_input(&self) -> Result<RawInput, EncodingError> {
        RawInput::from_labels(&self.sex, self.year, &self.age_group, &self.ethnicity, &self.race)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Encoded row, before standardization
    pub encoded: FeatureRow,
    pub raw: Prediction,
    pub rounded: Prediction,
}
