//! In-process blob store for development and tests.

use crate::traits::{BlobStore, ObjectAttributes, SignedUrlOptions, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Blob store keeping object attributes in memory.
///
/// Signed URLs use the `memory://` scheme and cannot be dereferenced; callers simulate the
/// client's direct write with [`MemoryBlobStore::put_object`].
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, ObjectAttributes>>>,
    unavailable: Arc<AtomicBool>,
    latency: Option<Duration>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Record that `size` bytes of `content_type` were written at `storage_key`.
    pub async fn put_object(&self, storage_key: &str, size: u64, content_type: &str) {
        self.objects.write().await.insert(
            storage_key.to_string(),
            ObjectAttributes {
                size,
                content_type: content_type.to_string(),
            },
        );
    }

    /// Make every subsequent call fail with a backend error until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    async fn before_call(&self) -> StorageResult<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError(
                "memory blob store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn signed_url(
        &self,
        storage_key: &str,
        options: &SignedUrlOptions,
    ) -> StorageResult<String> {
        self.before_call().await?;
        Ok(format!(
            "memory://{}?method={}&expires={}",
            storage_key,
            options.method,
            options.expires_at.timestamp()
        ))
    }

    async fn head(&self, storage_key: &str) -> StorageResult<Option<ObjectAttributes>> {
        self.before_call().await?;
        Ok(self.objects.read().await.get(storage_key).cloned())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
