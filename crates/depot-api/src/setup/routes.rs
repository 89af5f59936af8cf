//! Route configuration and setup.

use crate::auth::{require_api_key, AuthState};
use crate::handlers::{analyze, health, objects, status, upload};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use depot_core::GatewayConfig;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Headroom on top of the payload ceiling for multipart boundaries and part
/// headers, so a payload exactly at the ceiling is rejected by the upload
/// service (400), not the transport layer.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &GatewayConfig, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState::from_config(config));

    // Static routes take precedence over the object-path wildcard.
    let public_routes = Router::new()
        .route("/", get(health::welcome))
        .route("/health", get(health::health_check))
        .route("/{*key}", get(objects::get_object));

    let protected_routes = Router::new()
        .route("/upload", post(upload::upload))
        .route("/api/analyze", post(analyze::analyze))
        .route("/api/status", get(status::status))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            require_api_key,
        ));

    let body_limit = config.max_upload_size_bytes + MULTIPART_OVERHEAD_BYTES;

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);

    let app = public_routes
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &GatewayConfig) -> Result<CorsLayer, anyhow::Error> {
    if config.cors_origins.iter().any(|origin| origin == "*") {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}
