//! API request handlers

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};

use crate::{
    error::GatewayError,
    identify::IdentificationGateway,
    observability::{HealthChecker, HealthStatus, MetricsCollector},
};

use super::page::UPLOAD_PAGE;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<IdentificationGateway>,
    pub metrics: Arc<MetricsCollector>,
    pub health_checker: Arc<HealthChecker>,
}

/// Identify grocery items in up to four images.
/// Takes raw bytes; the gateway checks the body shape itself.
#[tracing::instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn identify(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let started = Instant::now();
    let outcome = match body {
        Ok(body) => state.gateway.identify_body(&body).await,
        Err(rejection) => Err(GatewayError::from(rejection)),
    };
    state.metrics.record_request(started.elapsed());

    match outcome {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            match &e {
                GatewayError::InvalidInput(reason) => {
                    warn!("Rejected identification request: {}", reason);
                    state.metrics.record_rejected();
                }
                GatewayError::PayloadTooLarge(reason) => {
                    warn!("Rejected oversized request body: {}", reason);
                    state.metrics.record_rejected();
                }
                // Already logged by the gateway
                GatewayError::Upstream(_) => state.metrics.record_error(),
                other => {
                    error!("Identification failed: {}", other);
                    state.metrics.record_error();
                }
            }
            e.into_response()
        }
    }
}

/// The upload form
pub async fn index() -> Html<&'static str> {
    Html(UPLOAD_PAGE)
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.health_checker.check_health().await;
    let status_code = match status.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(status))
}

/// Liveness probe handler - always returns 200
pub async fn liveness(State(state): State<AppState>) -> impl IntoResponse {
    if state.health_checker.liveness() {
        (StatusCode::OK, Json(json!({"status": "alive"})))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"status": "dead"})))
    }
}

/// Readiness probe handler - ready once a credential is available
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.health_checker.check_health().await;
    if state.health_checker.readiness().await {
        (StatusCode::OK, Json(json!({"status": "ready", "details": status})))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"status": "not_ready", "details": status})))
    }
}

/// Metrics handler
pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.export_prometheus()
}
