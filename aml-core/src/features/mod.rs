//! Features Module - Input encoding and row layout
//!
//! Turns a form submission into the numeric row the artifacts were fitted on.

pub mod encoding;
pub mod layout;

// Re-export common types
pub use encoding::{
    AgeGroup, EncodingError, Ethnicity, FeatureRow, Race, RawInput, Sex, YEAR_MAX, YEAR_MIN,
};
pub use layout::{LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT, OUTPUT_COUNT};
