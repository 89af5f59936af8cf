//! Upload orchestration
//!
//! This service owns the upload pipeline: validate -> resolve bucket/key/
//! content type -> stage -> backend write -> respond. It stays backend-agnostic
//! behind the `ObjectStore` trait and performs exactly one durable write
//! attempt per call.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use depot_core::keys::{generate_key, is_valid_explicit_key};
use depot_core::models::{UploadRequest, UploadResult};
use depot_core::AppError;
use depot_storage::{ObjectStore, StorageError};
use tempfile::NamedTempFile;

use crate::error::app_error_from_storage;
use crate::state::AppState;

/// Upload pipeline for one gateway instance.
pub struct UploadService {
    store: Arc<dyn ObjectStore>,
    key_prefix: String,
    max_upload_size_bytes: usize,
    upload_timeout: Duration,
    staging_dir: Option<PathBuf>,
}

impl UploadService {
    /// Create a new UploadService from the shared application state.
    pub fn new(state: &Arc<AppState>) -> Self {
        Self {
            store: state.store.clone(),
            key_prefix: state.config.key_prefix.clone(),
            max_upload_size_bytes: state.config.max_upload_size_bytes,
            upload_timeout: Duration::from_secs(state.config.upload_timeout_secs),
            staging_dir: state.config.upload_staging_dir.clone().map(PathBuf::from),
        }
    }

    /// Run the upload pipeline.
    ///
    /// Exactly one durable write attempt per call. The staged copy of the
    /// payload is released on every exit path, including backend failure and
    /// timeout; `NamedTempFile` removes the file when the binding drops.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadResult, AppError> {
        if request.data.is_empty() {
            return Err(AppError::InvalidInput("No file uploaded".to_string()));
        }

        if request.data.len() > self.max_upload_size_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Upload of {} bytes exceeds the maximum of {} MB",
                request.data.len(),
                self.max_upload_size_bytes / 1024 / 1024
            )));
        }

        let bucket = self.resolve_bucket(request.bucket.as_deref())?;
        let region = self
            .store
            .region()
            .map(String::from)
            .or(request.region.clone());
        let key = self.resolve_key(request.key.as_deref(), request.original_filename.as_deref())?;
        let content_type = resolve_content_type(
            request.content_type.as_deref(),
            request.original_filename.as_deref(),
        );

        // Staged local copy of the payload. Released by RAII when `staged`
        // drops, whether the backend write succeeds, fails, or times out.
        let staged = self.stage(&request.data)?;
        let payload = std::fs::read(staged.path())
            .map_err(|e| AppError::Internal(format!("Failed to read staged upload: {}", e)))?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            content_type = %content_type,
            size_bytes = payload.len(),
            "Uploading object"
        );

        let put = self.store.put(&key, payload, &content_type);
        let url = match tokio::time::timeout(self.upload_timeout, put).await {
            Ok(result) => result.map_err(app_error_from_storage)?,
            Err(_) => {
                tracing::error!(
                    bucket = %bucket,
                    key = %key,
                    timeout_secs = self.upload_timeout.as_secs(),
                    "Backend write timed out"
                );
                return Err(app_error_from_storage(StorageError::Timeout(
                    self.upload_timeout.as_secs(),
                )));
            }
        };

        tracing::info!(bucket = %bucket, key = %key, url = %url, "Upload successful");

        Ok(UploadResult {
            key,
            url,
            bucket,
            region,
        })
    }

    /// The gateway serves exactly one bucket; an override must match it.
    fn resolve_bucket(&self, requested: Option<&str>) -> Result<String, AppError> {
        match requested {
            Some(bucket) if bucket != self.store.bucket() => Err(AppError::InvalidInput(format!(
                "Bucket '{}' is not served by this gateway (configured bucket: '{}')",
                bucket,
                self.store.bucket()
            ))),
            _ => Ok(self.store.bucket().to_string()),
        }
    }

    fn resolve_key(
        &self,
        explicit: Option<&str>,
        original_filename: Option<&str>,
    ) -> Result<String, AppError> {
        match explicit {
            Some(key) => {
                if !is_valid_explicit_key(key) {
                    return Err(AppError::InvalidInput(format!(
                        "Invalid key override: {}",
                        key
                    )));
                }
                Ok(key.to_string())
            }
            None => Ok(generate_key(original_filename, &self.key_prefix)),
        }
    }

    fn stage(&self, data: &[u8]) -> Result<NamedTempFile, AppError> {
        let mut staged = match &self.staging_dir {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(|e| AppError::Internal(format!("Failed to create staging file: {}", e)))?;

        staged
            .write_all(data)
            .map_err(|e| AppError::Internal(format!("Failed to stage upload: {}", e)))?;

        Ok(staged)
    }
}

/// Declared content type, else a guess from the filename, else octet-stream.
fn resolve_content_type(declared: Option<&str>, original_filename: Option<&str>) -> String {
    if let Some(content_type) = declared {
        let trimmed = content_type.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    original_filename
        .and_then(|name| mime_guess::from_path(name).first_raw())
        .unwrap_or("application/octet-stream")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use depot_core::StorageBackend;
    use depot_storage::{StorageResult, StoredObject};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Minimal in-memory backend for service-level tests.
    struct MemoryStore {
        objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                objects: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn put(
            &self,
            key: &str,
            data: Vec<u8>,
            content_type: &str,
        ) -> StorageResult<String> {
            self.objects
                .lock()
                .unwrap()
                .insert(key.to_string(), (data, content_type.to_string()));
            Ok(self.location_url(key))
        }

        async fn get(&self, key: &str) -> StorageResult<StoredObject> {
            let objects = self.objects.lock().unwrap();
            let (data, content_type) = objects
                .get(key)
                .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
            Ok(StoredObject {
                data: Bytes::from(data.clone()),
                content_type: Some(content_type.clone()),
                etag: None,
                size: data.len() as u64,
            })
        }

        async fn delete(&self, key: &str) -> StorageResult<()> {
            self.objects.lock().unwrap().remove(key);
            Ok(())
        }

        async fn exists(&self, key: &str) -> StorageResult<bool> {
            Ok(self.objects.lock().unwrap().contains_key(key))
        }

        fn location_url(&self, key: &str) -> String {
            format!("https://depot-test.s3.eu-central-1.amazonaws.com/{}", key)
        }

        fn bucket(&self) -> &str {
            "depot-test"
        }

        fn region(&self) -> Option<&str> {
            Some("eu-central-1")
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::S3
        }
    }

    /// Backend that always rejects writes.
    struct FailingStore;

    #[async_trait]
    impl ObjectStore for FailingStore {
        async fn put(&self, _: &str, _: Vec<u8>, _: &str) -> StorageResult<String> {
            Err(StorageError::UploadFailed("injected failure".to_string()))
        }

        async fn get(&self, key: &str) -> StorageResult<StoredObject> {
            Err(StorageError::NotFound(key.to_string()))
        }

        async fn delete(&self, _: &str) -> StorageResult<()> {
            Ok(())
        }

        async fn exists(&self, _: &str) -> StorageResult<bool> {
            Ok(false)
        }

        fn location_url(&self, key: &str) -> String {
            format!("https://unreachable/{}", key)
        }

        fn bucket(&self) -> &str {
            "depot-test"
        }

        fn region(&self) -> Option<&str> {
            None
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::S3
        }
    }

    fn service_with_store(store: Arc<dyn ObjectStore>) -> UploadService {
        UploadService {
            store,
            key_prefix: "reports".to_string(),
            max_upload_size_bytes: 1024,
            upload_timeout: Duration::from_secs(5),
            staging_dir: None,
        }
    }

    fn request(data: &[u8], filename: Option<&str>) -> UploadRequest {
        UploadRequest {
            data: data.to_vec(),
            original_filename: filename.map(String::from),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_upload_returns_result_with_derived_url() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with_store(store.clone());

        let result = service
            .upload(request(b"0123456789", Some("report.json")))
            .await
            .unwrap();

        assert!(!result.key.is_empty());
        assert!(result.key.starts_with("reports/"));
        assert!(result.key.ends_with("-report.json"));
        assert!(result.url.ends_with(&result.key));
        assert_eq!(result.bucket, "depot-test");
        assert_eq!(result.region.as_deref(), Some("eu-central-1"));

        let object = store.get(&result.key).await.unwrap();
        assert_eq!(object.data.as_ref(), b"0123456789");
        assert_eq!(object.content_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_empty_payload_rejected_without_write() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with_store(store.clone());

        let result = service.upload(request(b"", Some("report.json"))).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert!(store.objects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_payload_rejected_without_write() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with_store(store.clone());

        let big = vec![0u8; 2048];
        let result = service.upload(request(&big, Some("report.json"))).await;
        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
        assert!(store.objects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_key_is_honored() {
        let service = service_with_store(Arc::new(MemoryStore::new()));

        let mut req = request(b"data", None);
        req.key = Some("custom/path/report.bin".to_string());

        let result = service.upload(req).await.unwrap();
        assert_eq!(result.key, "custom/path/report.bin");
    }

    #[tokio::test]
    async fn test_traversal_key_override_rejected() {
        let service = service_with_store(Arc::new(MemoryStore::new()));

        let mut req = request(b"data", None);
        req.key = Some("../outside".to_string());

        let result = service.upload(req).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_mismatched_bucket_override_rejected() {
        let service = service_with_store(Arc::new(MemoryStore::new()));

        let mut req = request(b"data", Some("report.json"));
        req.bucket = Some("someone-elses-bucket".to_string());

        let result = service.upload(req).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_failed_write_releases_staged_file() {
        let staging = tempfile::tempdir().unwrap();
        let mut service = service_with_store(Arc::new(FailingStore));
        service.staging_dir = Some(staging.path().to_path_buf());

        let result = service.upload(request(b"payload", Some("report.json"))).await;
        assert!(matches!(result, Err(AppError::Storage(_))));

        let leftovers: Vec<_> = std::fs::read_dir(staging.path()).unwrap().collect();
        assert!(leftovers.is_empty(), "staged upload leaked: {:?}", leftovers);
    }

    #[tokio::test]
    async fn test_successful_write_releases_staged_file() {
        let staging = tempfile::tempdir().unwrap();
        let mut service = service_with_store(Arc::new(MemoryStore::new()));
        service.staging_dir = Some(staging.path().to_path_buf());

        service
            .upload(request(b"payload", Some("report.json")))
            .await
            .unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(staging.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_content_type_resolution() {
        assert_eq!(
            resolve_content_type(Some("application/json"), Some("a.bin")),
            "application/json"
        );
        assert_eq!(
            resolve_content_type(None, Some("report.json")),
            "application/json"
        );
        assert_eq!(
            resolve_content_type(None, Some("mystery")),
            "application/octet-stream"
        );
        assert_eq!(resolve_content_type(None, None), "application/octet-stream");
        assert_eq!(
            resolve_content_type(Some("  "), Some("report.csv")),
            "text/csv"
        );
    }
}
