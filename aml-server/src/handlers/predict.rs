//! Prediction API handlers

use aml_core::ArtifactReport;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use validator::Validate;

use crate::models::{PredictionRequest, PredictionResponse};
use crate::{AppError, AppResult, AppState};

/// Run one prediction
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<PredictionRequest>, JsonRejection>,
) -> AppResult<Json<PredictionResponse>> {
    let Json(req) = body.map_err(|rejection| AppError::ValidationError(rejection.body_text()))?;
    Ok(Json(run_prediction(state, req).await?))
}

/// Artifact readiness
pub async fn artifacts(State(state): State<AppState>) -> Json<ArtifactReport> {
    Json(state.predictor.artifacts().report())
}

/// Shared by the JSON API and the form page.
/// Inference runs on the blocking pool; the ONNX session is behind a mutex.
pub async fn run_prediction(state: AppState, req: PredictionRequest) -> AppResult<PredictionResponse> {
    tokio::task::spawn_blocking(move || predict_blocking(&state, &req))
        .await
        .map_err(|e| AppError::InternalError(format!("Prediction task failed: {}", e)))?
}

fn predict_blocking(state: &AppState, req: &PredictionRequest) -> AppResult<PredictionResponse> {
    req.validate()?;
    let input = req.to_input()?;
    let raw = state.predictor.predict(&input)?;

    tracing::debug!(?input, ?raw, "prediction served");

    Ok(PredictionResponse {
        encoded: input.encode(),
        raw,
        rounded: raw.rounded(),
    })
}
