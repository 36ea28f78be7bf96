//! Blob store setup and initialization

use anyhow::{Context, Result};
use cv_core::Config;
use cv_storage::{create_blob_store, ConfiguredBlobStore};

/// Build the blob store selected by `STORAGE_BACKEND`
pub async fn setup_storage(config: &Config) -> Result<ConfiguredBlobStore> {
    let configured = create_blob_store(config)
        .await
        .context("Failed to initialize blob store")?;

    tracing::info!(
        backend = %configured.store.backend_type(),
        "Blob store initialized"
    );

    Ok(configured)
}
