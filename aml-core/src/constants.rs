//! Central Configuration Constants
//!
//! Single source of truth for artifact defaults.
//! The server reads overrides from the environment.

/// Default model download URL (file host id of the published model export)
pub const DEFAULT_MODEL_URL: &str =
    "https://drive.google.com/uc?export=download&id=11hST1WP28mmbvgG6FkVUKGEN0diyaAGW";

/// Default scaler download URL
pub const DEFAULT_SCALER_URL: &str =
    "https://drive.google.com/uc?export=download&id=1nx7fHDOuBtSG4noH106XfOuc5Yag1J11";

/// Default local model file name
pub const DEFAULT_MODEL_FILE: &str = "aml_model.onnx";

/// Default local scaler file name
pub const DEFAULT_SCALER_FILE: &str = "aml_scaler.json";

/// Default download timeout (seconds)
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// Largest artifact accepted from the network (bytes)
pub const MAX_ARTIFACT_BYTES: u64 = 512 * 1024 * 1024;

/// Decimal places shown for the crude mortality rate
pub const CRUDE_RATE_DECIMALS: i32 = 1;

/// Decimal places shown for the survival rate
pub const SURVIVAL_RATE_DECIMALS: i32 = 6;

/// Crate version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
