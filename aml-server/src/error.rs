//! Error handling

use aml_core::{EncodingError, PredictError};
use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Input errors
    #[error("{0}")]
    ValidationError(String),

    // Artifact errors
    #[error("Artifacts unavailable: {0}")]
    ArtifactsUnavailable(String),

    // Generic errors
    #[error("{0}")]
    InternalError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ArtifactsUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the user
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg) => msg.clone(),
            AppError::ArtifactsUnavailable(reason) => {
                tracing::warn!("Prediction refused, artifacts unavailable: {}", reason);
                format!("Model or scaler not loaded: {}", reason)
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.public_message(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<EncodingError> for AppError {
    fn from(err: EncodingError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::Encoding(e) => e.into(),
            PredictError::ArtifactsUnavailable(reason) => AppError::ArtifactsUnavailable(reason),
            other => AppError::InternalError(other.to_string()),
        }
    }
}
