//! Local filesystem blob store.
//!
//! Stands in for an object store during development. Signed URLs point at the API's own
//! blob receiver: `{base_url}/{key}?expires={unix_ts}&signature={sig}` where
//! `sig = base64url(HMAC-SHA256(secret, method || key || expires || content_type))`.
//! The content type of each object is kept in a `{file}.meta.json` sidecar.

use crate::traits::{BlobStore, ObjectAttributes, SignedUrlOptions, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use http::Method;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const SIDECAR_SUFFIX: &str = ".meta.json";

#[derive(Debug, Serialize, Deserialize)]
struct SidecarMetadata {
    content_type: String,
}

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    signing_secret: Vec<u8>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/cv/blobs")
    /// * `base_url` - Public URL of the blob receiver (e.g., "http://localhost:8080/blobs")
    /// * `signing_secret` - HMAC key for signed URLs
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        signing_secret: impl Into<Vec<u8>>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();
        let signing_secret = signing_secret.into();

        if signing_secret.is_empty() {
            return Err(StorageError::ConfigError(
                "Signing secret must not be empty".to_string(),
            ));
        }

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            signing_secret,
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys that could escape the base storage directory or that name a directory.
    /// The sidecar suffix is reserved.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.contains("..")
            || storage_key.starts_with('/')
            || storage_key.ends_with('/')
            || storage_key.contains('\\')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        if storage_key.ends_with(SIDECAR_SUFFIX) {
            return Err(StorageError::InvalidKey(
                "Storage key uses a reserved suffix".to_string(),
            ));
        }

        let path = self.base_path.join(storage_key);
        if path.strip_prefix(&self.base_path).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    fn sidecar_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(SIDECAR_SUFFIX);
        PathBuf::from(name)
    }

    /// Generate public URL for a key, percent-encoding each segment
    fn generate_url(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.base_url.trim_end_matches('/'), encoded.join("/"))
    }

    fn mac(
        &self,
        method: &Method,
        storage_key: &str,
        expires: i64,
        content_type: &str,
    ) -> StorageResult<Hmac<Sha256>> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.signing_secret)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        mac.update(method.as_str().as_bytes());
        mac.update(b"\n");
        mac.update(storage_key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        mac.update(b"\n");
        mac.update(content_type.as_bytes());
        Ok(mac)
    }

    /// Check a signature produced by [`BlobStore::signed_url`].
    ///
    /// `content_type` must be the value the client sends with its request; it has to match
    /// the one declared when the URL was issued.
    pub fn verify_signature(
        &self,
        method: &Method,
        storage_key: &str,
        expires: i64,
        content_type: &str,
        signature: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<()> {
        let tag = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| StorageError::InvalidSignature("Malformed signature".to_string()))?;

        self.mac(method, storage_key, expires, content_type)?
            .verify_slice(&tag)
            .map_err(|_| StorageError::InvalidSignature("Signature mismatch".to_string()))?;

        if now.timestamp() > expires {
            return Err(StorageError::InvalidSignature(
                "Signed URL has expired".to_string(),
            ));
        }

        Ok(())
    }

    /// Store an object and its content type. Overwrites any previous object at `storage_key`.
    pub async fn write_object(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;
        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let sidecar = SidecarMetadata {
            content_type: content_type.to_string(),
        };
        let sidecar_json = serde_json::to_vec(&sidecar)
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        fs::write(Self::sidecar_path(&path), sidecar_json).await?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalStorage {
    async fn signed_url(
        &self,
        storage_key: &str,
        options: &SignedUrlOptions,
    ) -> StorageResult<String> {
        if options.method != Method::PUT {
            return Err(StorageError::SigningFailed(format!(
                "Local storage only signs PUT, got {}",
                options.method
            )));
        }
        self.key_to_path(storage_key)?;

        let expires = options.expires_at.timestamp();
        let tag = self
            .mac(&options.method, storage_key, expires, &options.content_type)?
            .finalize()
            .into_bytes();
        let signature = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(tag);

        Ok(format!(
            "{}?expires={}&signature={}",
            self.generate_url(storage_key),
            expires,
            signature
        ))
    }

    async fn head(&self, storage_key: &str) -> StorageResult<Option<ObjectAttributes>> {
        let path = self.key_to_path(storage_key)?;

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::IoError(e)),
        };

        let content_type = match fs::read(Self::sidecar_path(&path)).await {
            Ok(raw) => serde_json::from_slice::<SidecarMetadata>(&raw)
                .map(|m| m.content_type)
                .unwrap_or_else(|e| {
                    tracing::warn!(key = %storage_key, error = %e, "Unreadable metadata sidecar");
                    String::new()
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(StorageError::IoError(e)),
        };

        Ok(Some(ObjectAttributes {
            size: metadata.len(),
            content_type,
        }))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
