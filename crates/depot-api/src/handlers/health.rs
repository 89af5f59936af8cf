//! Health and welcome handlers.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use std::time::Duration;

/// Root endpoint: service banner.
pub async fn welcome() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Welcome to the Depot upload gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "success"
    }))
}

/// Health probe. Always 200 with `status: "ok"` when the process is serving;
/// the storage field reports the backend probe outcome without failing the
/// check.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    const TIMEOUT: Duration = Duration::from_secs(5);

    let storage = match tokio::time::timeout(
        TIMEOUT,
        state.store.exists("health-check-non-existent-key"),
    )
    .await
    {
        Ok(Ok(_)) => "healthy".to_string(),
        Ok(Err(e)) => format!("degraded: {}", e),
        Err(_) => "timeout".to_string(),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "storage": storage
        })),
    )
}
