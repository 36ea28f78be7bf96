//! Health check handlers.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use std::time::Duration;

const READINESS_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness probe - process is running.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "storage_backend": state.blobs.backend_type().to_string(),
        })),
    )
}

/// Readiness probe - the record store answers.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (ready, record_store) =
        match tokio::time::timeout(READINESS_TIMEOUT, state.records.health_check()).await {
            Ok(Ok(())) => (true, "ready".to_string()),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Record store readiness check failed");
                (false, format!("not_ready: {}", e))
            }
            Err(_) => {
                tracing::error!("Record store readiness check timed out");
                (false, "timeout".to_string())
            }
        };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "record_store": record_store,
        })),
    )
}
