//! Blob store abstraction trait
//!
//! This module defines the BlobStore trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cv_core::AppError;
use http::Method;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::InvalidSignature(msg) => AppError::InvalidInput(msg),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            other => AppError::Unavailable(other.to_string()),
        }
    }
}

/// Parameters of a signed URL request
#[derive(Debug, Clone)]
pub struct SignedUrlOptions {
    /// HTTP method the URL authorizes
    pub method: Method,
    /// Content type the client declared for the object
    pub content_type: String,
    /// Instant after which the URL must be refused
    pub expires_at: DateTime<Utc>,
}

impl SignedUrlOptions {
    /// Options for a direct `PUT` upload.
    pub fn put(content_type: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            method: Method::PUT,
            content_type: content_type.into(),
            expires_at,
        }
    }
}

/// What a HEAD request reports about an existing object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAttributes {
    pub size: u64,
    /// Empty when the store recorded no content type
    pub content_type: String,
}

/// Blob store abstraction trait
///
/// The upload coordinator never moves bytes itself: it hands out signed URLs and later
/// asks the store what actually landed at a path. All backends (S3, local filesystem,
/// in-memory) implement this trait so the coordinator can work with any of them.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Generate a time-limited URL allowing `options.method` against `storage_key`
    async fn signed_url(
        &self,
        storage_key: &str,
        options: &SignedUrlOptions,
    ) -> StorageResult<String>;

    /// Metadata-only lookup; `Ok(None)` means the object does not exist
    async fn head(&self, storage_key: &str) -> StorageResult<Option<ObjectAttributes>>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
