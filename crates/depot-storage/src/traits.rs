//! Storage abstraction trait
//!
//! This module defines the ObjectStore trait that all storage backends must
//! implement, together with the storage error taxonomy.

use async_trait::async_trait;
use bytes::Bytes;
use depot_core::StorageBackend;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Storage operation timed out after {0}s")]
    Timeout(u64),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// An object fetched from a backend, with the metadata needed to serve it.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub size: u64,
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait so
/// the upload service stays backend-agnostic. Backends are trusted to
/// serialize conflicting writes to the same key and to provide per-key
/// read-after-write consistency; callers do no further synchronization.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `data` under `key` and return the public URL of the object.
    ///
    /// The caller-supplied content type is preserved and surfaced again by
    /// `get`. Writing an existing key overwrites it.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<String>;

    /// Fetch the object stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<StoredObject>;

    /// Delete the object stored under `key`. Best-effort; deleting a missing
    /// key is not an error, and callers must not rely on immediate visibility.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if an object exists under `key`.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Stable, dereferenceable URL for `key`, independent of whether the
    /// object exists yet.
    fn location_url(&self, key: &str) -> String;

    /// Bucket or namespace this store writes into.
    fn bucket(&self) -> &str;

    /// Region identifier, when the backend has one.
    fn region(&self) -> Option<&str>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
