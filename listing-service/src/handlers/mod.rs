//! HTTP handlers for listing-service.

pub mod texts;
pub mod watermark;
pub mod zip;

use crate::services::metrics::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness check. Reports 503 when the database is unreachable.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let status = match state.db.health_check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    (
        status,
        Json(json!({
            "status": if status.is_success() { "ok" } else { "unhealthy" },
            "service": state.config.service_name,
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready" })),
        ),
    }
}

/// Prometheus metrics endpoint.
pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
