//! CV Platform Core Library
//!
//! This crate provides the domain model, error types and configuration shared by the
//! storage, database and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, LogFormat, RecordStoreBackend};
pub use error::{AppError, ErrorKind, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
