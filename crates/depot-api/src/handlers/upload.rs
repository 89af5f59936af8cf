//! Upload handler: multipart extraction and response shaping only; the
//! pipeline itself lives in `services::upload`.

use crate::error::HttpAppError;
use crate::services::UploadService;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use depot_core::models::{UploadRequest, UploadResponse};
use depot_core::AppError;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    bucket: Option<String>,
    region: Option<String>,
    key: Option<String>,
}

/// POST /upload
///
/// Accepts a multipart body with one `file` field. Bucket, region, and key
/// overrides are read from query parameters or multipart text fields; query
/// wins when both are present.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let mut request = UploadRequest {
        bucket: params.bucket,
        region: params.region,
        key: params.key,
        ..Default::default()
    };
    let mut saw_file = false;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        HttpAppError(AppError::InvalidInput(format!(
            "Failed to read multipart: {}",
            e
        )))
    })? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if saw_file {
                    return Err(HttpAppError(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    )));
                }
                saw_file = true;

                request.original_filename = field.file_name().map(|s: &str| s.to_string());
                request.content_type = field.content_type().map(|s: &str| s.to_string());
                request.data = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        HttpAppError(AppError::InvalidInput(format!(
                            "Failed to read file data: {}",
                            e
                        )))
                    })?
                    .to_vec();
            }
            "bucket" => {
                let value = read_text_field(field).await?;
                request.bucket.get_or_insert(value);
            }
            "region" => {
                let value = read_text_field(field).await?;
                request.region.get_or_insert(value);
            }
            "key" => {
                let value = read_text_field(field).await?;
                request.key.get_or_insert(value);
            }
            _ => {}
        }
    }

    if !saw_file {
        return Err(HttpAppError(AppError::InvalidInput(
            "No file uploaded".to_string(),
        )));
    }

    let service = UploadService::new(&state);
    let result = service.upload(request).await.map_err(HttpAppError)?;

    Ok(Json(UploadResponse::from(result)))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, HttpAppError> {
    field.text().await.map_err(|e| {
        HttpAppError(AppError::InvalidInput(format!(
            "Failed to read multipart field: {}",
            e
        )))
    })
}
