//! Depot Core Library
//!
//! This crate provides core domain models, error types, configuration, and key
//! generation that are shared across all Depot components.

pub mod config;
pub mod error;
pub mod keys;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::GatewayConfig;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use keys::{generate_key, sanitize_object_name};
pub use storage_types::StorageBackend;
