//! Job status polling handler.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use depot_core::models::JobResponse;
use depot_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    job_id: Option<String>,
}

/// GET /api/status?job_id=ID
///
/// Stateless, idempotent snapshot read of a job.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<JobResponse>, HttpAppError> {
    let raw = query.job_id.ok_or_else(|| {
        HttpAppError(AppError::InvalidInput(
            "Missing job_id parameter".to_string(),
        ))
    })?;

    let job_id: Uuid = raw
        .parse()
        .map_err(|_| HttpAppError(AppError::InvalidInput(format!("Invalid job_id: {}", raw))))?;

    let job = state.jobs.get(job_id).await.ok_or_else(|| {
        HttpAppError(AppError::NotFound(format!("Unknown job_id: {}", job_id)))
    })?;

    Ok(Json(JobResponse::from(job)))
}
