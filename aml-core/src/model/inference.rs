//! Inference Engine - regression model runtime
//!
//! A `Regressor` maps one standardized row to the two outputs
//! (crude mortality rate, survival rate). Two artifact formats are supported:
//! an ONNX graph run through ONNX Runtime, and a JSON export of a
//! multi-output linear model.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::layout::{FEATURE_COUNT, OUTPUT_COUNT};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("ONNX Runtime error: {0}")]
    Runtime(String),

    #[error("Model shape error: {0}")]
    Shape(String),
}

// ============================================================================
// INFERENCE ENGINE TRAIT
// ============================================================================

/// A loaded model. Read-only after load, shared across requests.
pub trait Regressor: Send + Sync {
    /// Runtime name, e.g. "onnx" or "linear"
    fn kind(&self) -> &'static str;

    fn predict(&self, row: &[f64; FEATURE_COUNT]) -> Result<[f64; OUTPUT_COUNT], ModelError>;
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub model_type: String,
    pub features: usize,
    pub outputs: usize,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Load a model, picking the runtime from the file extension
pub fn load_model(path: &Path) -> Result<(Box<dyn Regressor>, ModelMetadata), ModelError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let model: Box<dyn Regressor> = match extension.as_str() {
        "onnx" => Box::new(OnnxRegressor::from_file(path)?),
        "json" => Box::new(LinearRegressor::from_file(path)?),
        other => return Err(ModelError::UnsupportedFormat(format!(".{other}"))),
    };

    let metadata = ModelMetadata {
        model_path: path.display().to_string(),
        model_type: model.kind().to_string(),
        features: FEATURE_COUNT,
        outputs: OUTPUT_COUNT,
        loaded_at: chrono::Utc::now(),
    };

    Ok((model, metadata))
}

// ============================================================================
// LINEAR IMPLEMENTATION
// ============================================================================

/// Multi-output linear regression: `y[k] = intercepts[k] + coefficients[k] · x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl LinearRegressor {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelError> {
        let model: LinearRegressor = serde_json::from_slice(bytes)?;

        if model.coefficients.len() != OUTPUT_COUNT || model.intercepts.len() != OUTPUT_COUNT {
            return Err(ModelError::Shape(format!(
                "expected {} outputs, got {} coefficient rows and {} intercepts",
                OUTPUT_COUNT,
                model.coefficients.len(),
                model.intercepts.len()
            )));
        }
        if let Some(row) = model.coefficients.iter().find(|r| r.len() != FEATURE_COUNT) {
            return Err(ModelError::Shape(format!(
                "expected {} coefficients per output, got {}",
                FEATURE_COUNT,
                row.len()
            )));
        }

        Ok(model)
    }

    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        log::info!("Loading linear model from: {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }
}

impl Regressor for LinearRegressor {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn predict(&self, row: &[f64; FEATURE_COUNT]) -> Result<[f64; OUTPUT_COUNT], ModelError> {
        let mut out = [0.0f64; OUTPUT_COUNT];
        for (k, value) in out.iter_mut().enumerate() {
            let dot: f64 = self.coefficients[k].iter().zip(row).map(|(w, x)| w * x).sum();
            *value = self.intercepts[k] + dot;
        }
        Ok(out)
    }
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

/// ONNX graph with one float input `[N, 5]` and one float output `[N, 2]`
pub struct OnnxRegressor {
    // `Session::run` needs exclusive access
    session: Mutex<Session>,
    output_name: String,
}

impl OnnxRegressor {
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        log::info!("Loading ONNX model from: {}", path.display());

        let session = Session::builder()
            .map_err(|e| ModelError::Runtime(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Runtime(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| ModelError::Runtime(format!("Failed to load model: {}", e)))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ModelError::Shape("No output defined".to_string()))?;

        log::info!("ONNX model loaded successfully (output: {})", output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }
}

impl Regressor for OnnxRegressor {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn predict(&self, row: &[f64; FEATURE_COUNT]) -> Result<[f64; OUTPUT_COUNT], ModelError> {
        let input_data: Vec<f32> = row.iter().map(|&v| v as f32).collect();
        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), input_data)
            .map_err(|e| ModelError::Shape(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| ModelError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::Runtime(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ModelError::Shape("No output".to_string()))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Runtime(format!("Extract error: {}", e)))?;

        if data.len() < OUTPUT_COUNT {
            return Err(ModelError::Shape(format!(
                "expected {} output values, got {}",
                OUTPUT_COUNT,
                data.len()
            )));
        }

        Ok([f64::from(data[0]), f64::from(data[1])])
    }
}

// ============================================================================
// TESTS
// ============================================================================
