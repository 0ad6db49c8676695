//! AML Outcome Predictor - Core
//!
//! Turns five demographic inputs into a crude mortality rate and a survival
//! rate for Acute Myeloid Leukemia, using a pre-fitted scaler and a
//! pre-trained regression model fetched from a file host.
//!
//! ```text
//!  RawInput ──encode──► FeatureRow ──scaler──► standardized row ──model──► Prediction
//!                       [Sex, Year, AgeGroup, Ethnicity, Race]
//! ```
//!
//! Artifacts are loaded once by [`ArtifactLoader`] into an [`Artifacts`]
//! holder and shared read-only through [`Predictor`].

pub mod artifacts;
pub mod constants;
pub mod features;
pub mod model;
pub mod predict;

pub use artifacts::{
    ArtifactConfig, ArtifactError, ArtifactLoader, ArtifactReport, ArtifactSource, ArtifactStatus,
    Artifacts, Fetcher, HttpFetcher,
};
pub use features::{AgeGroup, EncodingError, Ethnicity, FeatureRow, Race, RawInput, Sex};
pub use predict::{round_to, PredictError, Prediction, Predictor};
