//! Health check handler

use aml_core::constants::APP_VERSION;
use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    artifacts_ready: bool,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: APP_VERSION,
        artifacts_ready: state.predictor.artifacts().is_ready(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
