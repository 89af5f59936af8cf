//! Application setup: storage backend, job registry, runner, and routes.

pub mod routes;
pub mod server;

use crate::services::AcknowledgeAnalysis;
use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use depot_core::GatewayConfig;
use depot_jobs::{AnalysisRunner, JobRegistry, TaskRunner};
use depot_storage::create_store;
use std::sync::Arc;

/// Build the application state and router.
///
/// The job registry and analysis runner are created here, live for the
/// process lifetime, and are torn down with the state at shutdown.
pub async fn initialize_app(config: GatewayConfig) -> Result<(Arc<AppState>, Router)> {
    let store = create_store(&config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create storage backend: {}", e))?;

    tracing::info!(
        backend = %store.backend_type(),
        bucket = %store.bucket(),
        "Storage backend initialized"
    );

    let jobs = Arc::new(JobRegistry::new());
    let runner: Arc<dyn AnalysisRunner> = Arc::new(TaskRunner::new(
        jobs.clone(),
        Arc::new(AcknowledgeAnalysis),
        config.analysis_queue_depth,
    ));

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        jobs,
        runner,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
