//! Application setup and initialization
//!
//! All wiring between configuration, collaborators and the router lives here so that
//! `main.rs` stays small and integration tests can build the same app.

pub mod database;
pub mod health;
pub mod routes;
pub mod server;
pub mod storage;

use crate::services::{CvUploadService, UploadSettings};
use crate::state::AppState;
use anyhow::{Context, Result};
use cv_core::Config;
use cv_db::CvRecordStore;
use cv_storage::ConfiguredBlobStore;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(&config.log_level, config.log_format)
        .context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment,
        record_store = ?config.record_store,
        storage_backend = %config.storage_backend,
        "Configuration loaded and validated successfully"
    );

    let records = database::setup_record_store(&config).await?;
    let blobs = storage::setup_storage(&config).await?;

    build_app(config, records, blobs)
}

/// Assemble state and router from already constructed collaborators
pub fn build_app(
    config: Config,
    records: Arc<dyn CvRecordStore>,
    blobs: ConfiguredBlobStore,
) -> Result<(Arc<AppState>, axum::Router)> {
    let uploads = CvUploadService::new(
        blobs.store.clone(),
        records.clone(),
        UploadSettings::from_config(&config),
    );

    let state = Arc::new(AppState {
        uploads,
        records,
        blobs: blobs.store,
        local_blobs: blobs.local,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
