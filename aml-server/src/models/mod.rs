//! Request and response models

pub mod submission;

pub use submission::{PredictionRequest, PredictionResponse};
