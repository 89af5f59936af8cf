//! Shared-secret authentication gate.
//!
//! Every protected route passes through [`require_api_key`] before its handler
//! runs. The expected secret comes from configuration; comparison is
//! constant-time. The bypass is an explicit configuration flag that logs
//! loudly at startup and is rejected in production by `GatewayConfig::validate`.

use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use depot_core::{AppError, GatewayConfig};
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct AuthState {
    api_key: Option<String>,
    disabled: bool,
}

impl AuthState {
    pub fn from_config(config: &GatewayConfig) -> Self {
        if config.auth_disabled {
            tracing::warn!(
                "AUTH_DISABLED=true: the authentication gate is OFF and every \
                 endpoint is open. Never run with this flag outside development."
            );
        }

        Self {
            api_key: config.api_key.clone(),
            disabled: config.auth_disabled,
        }
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

pub async fn require_api_key(
    State(auth): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    if auth.disabled {
        return next.run(request).await;
    }

    let header_value = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    match (header_value, &auth.api_key) {
        (Some(value), Some(expected)) if secure_compare(value, expected) => {
            next.run(request).await
        }
        _ => HttpAppError(AppError::Unauthorized(
            "Invalid or missing x-api-key header".to_string(),
        ))
        .into_response(),
    }
}
