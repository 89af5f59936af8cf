//! Test helpers: build AppState and router for integration tests.
//!
//! Run from the workspace root: `cargo test -p depot-api --test upload_test`
//! or `cargo test -p depot-api`.

pub mod stores;

use axum_test::TestServer;
use depot_api::services::AcknowledgeAnalysis;
use depot_api::setup::routes;
use depot_api::state::AppState;
use depot_core::{GatewayConfig, StorageBackend};
use depot_jobs::{AnalysisRunner, JobRegistry, TaskRunner};
use depot_storage::{LocalStore, ObjectStore};
use std::sync::Arc;
use tempfile::TempDir;

/// Shared secret used by every test request.
pub const TEST_API_KEY: &str = "test-api-key";

/// Test application: server plus owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub staging_dir: TempDir,
    pub _storage_dir: Option<TempDir>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

fn test_config(staging_dir: &TempDir) -> GatewayConfig {
    GatewayConfig {
        server_port: 0,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        api_key: Some(TEST_API_KEY.to_string()),
        auth_disabled: false,
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: None,
        local_storage_base_url: None,
        key_prefix: "reports".to_string(),
        max_upload_size_bytes: 10 * 1024 * 1024,
        upload_timeout_secs: 5,
        upload_staging_dir: Some(staging_dir.path().to_string_lossy().into_owned()),
        analysis_queue_depth: 16,
    }
}

/// Setup a test app backed by local storage in a temp directory.
pub async fn setup_test_app() -> TestApp {
    let storage_dir = tempfile::tempdir().expect("Failed to create storage directory");
    let store: Arc<dyn ObjectStore> = Arc::new(
        LocalStore::new(storage_dir.path(), "http://localhost:3000".to_string())
            .await
            .expect("Failed to create local storage"),
    );
    build_test_app(store, Some(storage_dir), |_| {}).await
}

/// Setup a test app over an arbitrary store, with a config hook for tests
/// that need a different payload ceiling or auth settings.
pub async fn build_test_app(
    store: Arc<dyn ObjectStore>,
    storage_dir: Option<TempDir>,
    configure: impl FnOnce(&mut GatewayConfig),
) -> TestApp {
    let staging_dir = tempfile::tempdir().expect("Failed to create staging directory");
    let mut config = test_config(&staging_dir);
    configure(&mut config);

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

    let router = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        state,
        staging_dir,
        _storage_dir: storage_dir,
    }
}
