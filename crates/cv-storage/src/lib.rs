//! CV Storage Library
//!
//! This crate provides the blob store capability used by the upload coordinator: the
//! [`BlobStore`] trait and its S3, local filesystem and in-memory implementations.
//!
//! # Storage key format
//!
//! Every CV lives at `cv/{id}.{ext}` where `ext` is the text after the last `.` of the
//! original file name (possibly empty). Key derivation is centralized in the `keys` module
//! so all backends stay consistent. Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use cv_core::StorageBackend;
pub use factory::{create_blob_store, ConfiguredBlobStore};
pub use keys::{cv_storage_key, file_extension};
pub use local::LocalStorage;
pub use memory::MemoryBlobStore;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{BlobStore, ObjectAttributes, SignedUrlOptions, StorageError, StorageResult};
