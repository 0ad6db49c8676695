//! Model Module - Scaler and regression runtime
//!
//! Both artifacts are opaque to the rest of the crate beyond
//! `StandardScaler::transform` and `Regressor::predict`.

pub mod inference;
pub mod scaler;

// Re-export common types
pub use inference::{load_model, LinearRegressor, ModelError, ModelMetadata, OnnxRegressor, Regressor};
pub use scaler::{ScalerError, StandardScaler};
