//! Application state.
//!
//! Created once at process start in `setup::initialize_app` and injected into
//! every handler; the job registry and runner are explicitly owned here, never
//! ambient globals.

use depot_core::GatewayConfig;
use depot_jobs::{AnalysisRunner, JobRegistry};
use depot_storage::ObjectStore;
use std::sync::Arc;

pub struct AppState {
    pub config: GatewayConfig,
    pub store: Arc<dyn ObjectStore>,
    pub jobs: Arc<JobRegistry>,
    pub runner: Arc<dyn AnalysisRunner>,
}
