//! Depot Storage Library
//!
//! This crate provides the object-store capability interface and its
//! implementations: S3 (and S3-compatible providers) and the local filesystem.
//!
//! # Storage keys
//!
//! Keys are opaque slash-separated strings generated by `depot-core::keys` or
//! supplied by the caller. Keys must not contain `..` segments or a leading
//! `/`; the local backend enforces this before touching the filesystem.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use depot_core::StorageBackend;
pub use factory::create_store;
#[cfg(feature = "storage-local")]
pub use local::LocalStore;
#[cfg(feature = "storage-s3")]
pub use s3::S3Store;
pub use traits::{ObjectStore, StorageError, StorageResult, StoredObject};
