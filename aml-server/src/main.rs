//! AML Outcome Predictor - Web Front End
//!
//! Serves the prediction form and a small JSON API on top of `aml-core`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     AML PREDICTOR                        │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────┐   ┌─────────────────┐  │
//! │  │  Form     │   │  JSON API    │   │  Health/Status  │  │
//! │  │  (HTML)   │   │  /api/v1     │   │                 │  │
//! │  └─────┬─────┘   └──────┬───────┘   └────────┬────────┘  │
//! │        └────────────────┼────────────────────┘           │
//! │                         ▼                                │
//! │                  ┌─────────────┐                         │
//! │                  │  Predictor  │ ◄── Artifacts (once)    │
//! │                  └─────────────┘                         │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use aml_core::{ArtifactLoader, Predictor};
use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let json_logs = config.json_logs || config.is_production();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "aml_server=debug,aml_core=info,tower_http=debug".into()))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("AML Predictor starting ({})...", config.environment);
    tracing::info!("Model: {}", config.artifacts.model.path.display());
    tracing::info!("Scaler: {}", config.artifacts.scaler.path.display());

    // Fetch and load artifacts once; failures are recorded, not fatal
    let artifact_config = config.artifacts.clone();
    let artifacts = tokio::task::spawn_blocking(move || {
        ArtifactLoader::http(artifact_config.fetch_timeout).load(&artifact_config)
    })
    .await
    .context("Artifact loader panicked")?;

    if !artifacts.is_ready() {
        tracing::warn!("Serving without artifacts; predictions will be refused");
    }

    // Build application state
    let state = AppState {
        predictor: Predictor::new(Arc::new(artifacts)),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        // Form page
        .route("/", get(handlers::page::index))
        .route("/predict", post(handlers::page::submit))

        // JSON API
        .route("/api/v1/predict", post(handlers::predict::predict))
        .route("/api/v1/artifacts", get(handlers::predict::artifacts))

        .route("/health", get(handlers::health::check))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aml_core::artifacts::Slot;
    use aml_core::model::{LinearRegressor, StandardScaler};
    use aml_core::Artifacts;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    const SCALER: &[u8] = br#"{
        "feature_names": ["Sex", "Year", "AgeGroup", "Ethnicity", "Race"],
        "mean": [0.5, 2010.0, 8.5, 0.5, 1.0],
        "scale": [0.5, 10.0, 5.0, 0.5, 1.0]
    }"#;

    const MODEL: &[u8] = br#"{
        "coefficients": [[1.0, 2.0, 3.0, 0.5, 0.25], [0.0, 0.0, -0.0001, 0.0, 0.0]],
        "intercepts": [12.0, 0.0000012345]
    }"#;

    fn ready_app() -> Router {
        let artifacts = Artifacts::from_parts(
            StandardScaler::from_json(SCALER).unwrap(),
            Box::new(LinearRegressor::from_json(MODEL).unwrap()),
        );
        create_router(AppState { predictor: Predictor::new(Arc::new(artifacts)) })
    }

    fn unavailable_app() -> Router {
        let artifacts = Artifacts::new(
            Slot::Ready(StandardScaler::from_json(SCALER).unwrap()),
            Slot::Failed("Failed to download model".to_string()),
        );
        create_router(AppState { predictor: Predictor::new(Arc::new(artifacts)) })
    }

    fn json_request(body: serde_json::Value) -> Request<Body> {
        Request::post("/api/v1/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn reference_body() -> serde_json::Value {
        serde_json::json!({
            "Sex": "Female",
            "Year": 2010,
            "AgeGroup": "20-24 years",
            "Ethnicity": "Non-Hispanic",
            "Race": "White"
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_api_predict_returns_encoded_and_rounded() {
        let response = ready_app().oneshot(json_request(reference_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["encoded"]["sex"], 1);
        assert_eq!(json["encoded"]["year"], 2010);
        assert_eq!(json["encoded"]["age_group"], 4);
        assert_eq!(json["encoded"]["ethnicity"], 0);
        assert_eq!(json["encoded"]["race"], 1);

        // z = [1, 0, -0.9, -1, 0]
        let crude = json["raw"]["crude_mortality_rate"].as_f64().unwrap();
        assert!((crude - (12.0 + 1.0 - 2.7 - 0.5)).abs() < 1e-9);
        assert_eq!(json["rounded"]["crude_mortality_rate"].as_f64().unwrap(), 9.8);
        assert_eq!(json["rounded"]["survival_rate"].as_f64().unwrap(), 0.000091);
    }

    #[tokio::test]
    async fn test_api_missing_field_is_bad_request_json() {
        let body = serde_json::json!({ "Sex": "Female", "Year": 2010 });

        let response = ready_app().oneshot(json_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let json = body_json(response).await;
        assert_eq!(json["status"], 400);
        assert!(json["error"].as_str().unwrap().contains("AgeGroup"));
    }

    #[tokio::test]
    async fn test_api_wrong_year_type_is_bad_request() {
        let mut body = reference_body();
        body["Year"] = "twenty-ten".into();

        let response = ready_app().oneshot(json_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["status"], 400);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_api_concurrent_predictions() {
        let app = ready_app();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let app = app.clone();
                tokio::spawn(async move { app.oneshot(json_request(reference_body())).await })
            })
            .collect();

        for handle in handles {
            let response = handle.await.unwrap().unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_api_unmapped_category_is_bad_request() {
        let mut body = reference_body();
        body["Sex"] = "Other".into();

        let response = ready_app().oneshot(json_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["status"], 400);
        assert!(json["error"].as_str().unwrap().contains("Other"));
    }

    #[tokio::test]
    async fn test_api_year_out_of_range_is_bad_request() {
        let mut body = reference_body();
        body["Year"] = 1850.into();

        let response = ready_app().oneshot(json_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("1900"));
    }

    #[tokio::test]
    async fn test_api_without_artifacts_is_unavailable() {
        let response = unavailable_app().oneshot(json_request(reference_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("Failed to download model"));
    }

    #[tokio::test]
    async fn test_form_submission_renders_rates() {
        let request = Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(
                "Sex=Female&Year=2010&AgeGroup=20-24+years&Ethnicity=Non-Hispanic&Race=White",
            ))
            .unwrap();

        let response = ready_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Crude Mortality Rate: <strong>9.8</strong>"));
        assert!(html.contains("Survival Rate: <strong>0.000091</strong>"));
    }

    #[tokio::test]
    async fn test_form_submission_reports_missing_artifacts() {
        let request = Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(
                "Sex=Male&Year=2000&AgeGroup=85%2B+years&Ethnicity=Hispanic&Race=White",
            ))
            .unwrap();

        let response = unavailable_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(body_text(response).await.contains("Model or scaler not loaded"));
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let response = ready_app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("<form method=\"post\" action=\"/predict\">"));
    }

    #[tokio::test]
    async fn test_health_and_artifact_status() {
        let response = unavailable_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["artifacts_ready"], false);
        assert_eq!(json["version"], aml_core::constants::APP_VERSION);

        let response = unavailable_app()
            .oneshot(Request::get("/api/v1/artifacts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["scaler"]["state"], "ready");
        assert_eq!(json["model"]["state"], "failed");
    }
}
