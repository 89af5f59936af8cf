//! Stored-object retrieval handler.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use depot_core::AppError;
use std::sync::Arc;

/// GET /{*key}
///
/// Serves the raw object bytes with the stored content type and etag. No auth:
/// uploaded objects are public by their stable URL, matching the backend's
/// public-read semantics.
pub async fn get_object(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, HttpAppError> {
    let object = state.store.get(&key).await?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            object
                .content_type
                .as_deref()
                .unwrap_or("application/octet-stream"),
        )
        .header(header::CONTENT_LENGTH, object.size);

    if let Some(etag) = &object.etag {
        builder = builder.header(header::ETAG, etag);
    }

    builder
        .body(Body::from(object.data))
        .map_err(|e| HttpAppError(AppError::Internal(format!("Failed to build response: {}", e))))
}
