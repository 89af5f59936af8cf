//! Fake storage backends for integration tests.

use async_trait::async_trait;
use bytes::Bytes;
use depot_core::StorageBackend;
use depot_storage::{ObjectStore, StorageError, StorageResult, StoredObject};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory backend that counts `put` calls, so tests can assert that
/// rejected requests never reach the backend.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    puts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<String> {
        self.puts.fetch_add(1, Ordering::SeqCst);
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
            etag: Some(format!("\"{}\"", data.len())),
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

/// Backend whose writes always fail, for temp-release and error-path tests.
pub struct FailingStore;

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
