use crate::traits::{BlobStore, ObjectAttributes, SignedUrlOptions, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::Utc;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{Attribute, GetOptions, ObjectStore, Result as ObjectResult};

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Credentials come from the environment; bucket and region are explicit.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage { store, bucket })
    }
}

#[async_trait]
impl BlobStore for S3Storage {
    async fn signed_url(
        &self,
        storage_key: &str,
        options: &SignedUrlOptions,
    ) -> StorageResult<String> {
        let location = Path::from(storage_key.to_string());
        let expires_in = (options.expires_at - Utc::now())
            .to_std()
            .map_err(|_| StorageError::SigningFailed("expiry is in the past".to_string()))?;

        let start = std::time::Instant::now();
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(options.method.clone(), &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 URL signing failed"
                );
                StorageError::SigningFailed(e.to_string())
            })?
            .to_string();

        tracing::debug!(
            bucket = %self.bucket,
            key = %storage_key,
            method = %options.method,
            expires_at = %options.expires_at,
            "S3 signed URL issued"
        );

        Ok(url)
    }

    async fn head(&self, storage_key: &str) -> StorageResult<Option<ObjectAttributes>> {
        let location = Path::from(storage_key.to_string());
        let start = std::time::Instant::now();

        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        let result = match self.store.get_opts(&location, options).await {
            Ok(result) => result,
            Err(ObjectStoreError::NotFound { .. }) => {
                tracing::info!(
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 object not present"
                );
                return Ok(None);
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 head failed"
                );
                return Err(StorageError::BackendError(e.to_string()));
            }
        };

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| v.as_ref().to_string())
            .unwrap_or_default();
        let size = result.meta.size;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 head successful"
        );

        Ok(Some(ObjectAttributes { size, content_type }))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
