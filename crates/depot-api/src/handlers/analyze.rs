//! Analysis submission handler.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use bytes::Bytes;
use depot_core::AppError;
use serde_json::Value;
use std::sync::Arc;

/// POST /api/analyze
///
/// Accepts an optional JSON payload, registers a job, and hands the payload
/// to the analysis runner. The response only promises that the job was
/// queued; completion is observed through the status endpoint.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), HttpAppError> {
    let payload = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            HttpAppError(AppError::InvalidInput(format!("Invalid JSON payload: {}", e)))
        })?
    };

    let job_id = state.runner.submit(payload).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "status": "queued",
            "job_id": job_id,
            "message": "Analysis has been queued"
        })),
    ))
}
