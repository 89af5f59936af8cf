//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for AppError.
//! The gateway is the single place where component errors become status codes
//! and JSON bodies; handlers return `Result<impl IntoResponse, HttpAppError>`
//! and use `.map_err(Into::into)` so every error renders consistently.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use depot_core::{AppError, ErrorMetadata, LogLevel};
use depot_jobs::JobError;
use depot_storage::StorageError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client (e.g., "Retry after a short delay")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from depot-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Map a storage error onto the gateway taxonomy.
pub fn app_error_from_storage(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(key) => AppError::NotFound(format!("Object not found: {}", key)),
        StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
        StorageError::UploadFailed(msg) => AppError::Storage(msg),
        StorageError::DownloadFailed(msg) => AppError::Storage(msg),
        StorageError::DeleteFailed(msg) => AppError::Storage(msg),
        StorageError::BackendError(msg) => AppError::Storage(msg),
        StorageError::Timeout(secs) => {
            AppError::Storage(format!("Backend write timed out after {}s", secs))
        }
        StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
        StorageError::ConfigError(msg) => AppError::Internal(msg),
    }
}

/// Map a job registry/runner error onto the gateway taxonomy.
///
/// Illegal transitions and id collisions are defects, surfaced as invariant
/// violations rather than client errors.
pub fn app_error_from_job(err: JobError) -> AppError {
    match err {
        JobError::NotFound(id) => AppError::NotFound(format!("Unknown job_id: {}", id)),
        JobError::IllegalTransition { .. }
        | JobError::ProgressRegression { .. }
        | JobError::ProgressOutOfRange { .. }
        | JobError::IdCollision(_) => AppError::Invariant(err.to_string()),
        JobError::QueueFull | JobError::WorkerStopped => AppError::Internal(err.to_string()),
    }
}

// Convert domain errors to HttpAppError (avoids orphan rule: we impl for local HttpAppError)

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(app_error_from_storage(err))
    }
}

impl From<JobError> for HttpAppError {
    fn from(err: JobError) -> Self {
        HttpAppError(app_error_from_job(err))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let is_production = is_production_env();

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Always hide details in production for security; in non-production, only show details for non-sensitive errors.
        let body = if is_production || app_error.is_sensitive() {
            Json(ErrorResponse {
                error: app_error.client_message(),
                details: None,
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                suggested_action: app_error.suggested_action().map(String::from),
            })
        } else {
            Json(ErrorResponse {
                error: app_error.client_message(),
                details: Some(app_error.detailed_message()),
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                suggested_action: app_error.suggested_action().map(String::from),
            })
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_storage_not_found_maps_to_404() {
        let HttpAppError(app_err) = StorageError::NotFound("reports/a.json".to_string()).into();
        assert!(matches!(app_err, AppError::NotFound(_)));
        assert_eq!(app_err.http_status_code(), 404);
    }

    #[test]
    fn test_storage_failure_maps_to_500() {
        let HttpAppError(app_err) = StorageError::UploadFailed("connection reset".into()).into();
        assert!(matches!(app_err, AppError::Storage(_)));
        assert_eq!(app_err.http_status_code(), 500);
    }

    #[test]
    fn test_storage_timeout_maps_to_500() {
        let HttpAppError(app_err) = StorageError::Timeout(30).into();
        match &app_err {
            AppError::Storage(msg) => assert!(msg.contains("timed out")),
            other => panic!("Expected Storage variant, got {:?}", other),
        }
        assert_eq!(app_err.http_status_code(), 500);
    }

    #[test]
    fn test_job_not_found_maps_to_404() {
        let HttpAppError(app_err) = JobError::NotFound(Uuid::new_v4()).into();
        assert_eq!(app_err.http_status_code(), 404);
    }

    #[test]
    fn test_illegal_transition_is_invariant_500() {
        use depot_core::models::JobStatus;
        let HttpAppError(app_err) = JobError::IllegalTransition {
            id: Uuid::new_v4(),
            from: JobStatus::Done,
            to: JobStatus::InProgress,
        }
        .into();
        assert!(matches!(app_err, AppError::Invariant(_)));
        assert_eq!(app_err.http_status_code(), 500);
    }

    /// Verifies the public error response contract: serialized ErrorResponse
    /// has "error", "code", "recoverable", and optionally "details" /
    /// "suggested_action".
    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            error: "Not found".to_string(),
            details: Some("Resource not found".to_string()),
            code: "NOT_FOUND".to_string(),
            recoverable: false,
            suggested_action: None,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert!(json.get("error").and_then(|v| v.as_str()).is_some());
        assert!(json.get("code").and_then(|v| v.as_str()).is_some());
        assert!(json.get("recoverable").and_then(|v| v.as_bool()).is_some());
    }
}
