use crate::{BlobStore, LocalStorage, MemoryBlobStore, StorageBackend, StorageError, StorageResult};
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use cv_core::Config;
use std::sync::Arc;

/// Blob store selected by configuration.
///
/// `local` is set for the local filesystem backend, whose signed URLs must be served by the
/// application itself.
#[derive(Clone)]
pub struct ConfiguredBlobStore {
    pub store: Arc<dyn BlobStore>,
    pub local: Option<Arc<LocalStorage>>,
}

/// Create a blob store backend based on configuration
pub async fn create_blob_store(config: &Config) -> StorageResult<ConfiguredBlobStore> {
    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config
                .effective_s3_region()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
                })?;
            let endpoint = config.s3_endpoint.clone();

            let storage = S3Storage::new(bucket, region, endpoint).await?;
            Ok(ConfiguredBlobStore {
                store: Arc::new(storage),
                local: None,
            })
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;
            let secret = config.local_signing_secret.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_SIGNING_SECRET not configured".to_string())
            })?;

            let storage = Arc::new(LocalStorage::new(base_path, base_url, secret).await?);
            Ok(ConfiguredBlobStore {
                store: storage.clone(),
                local: Some(storage),
            })
        }

        StorageBackend::Memory => Ok(ConfiguredBlobStore {
            store: Arc::new(MemoryBlobStore::new()),
            local: None,
        }),
    }
}
