//! Application state shared by all handlers.

use crate::services::CvUploadService;
use cv_db::CvRecordStore;
use cv_storage::{BlobStore, LocalStorage};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub uploads: CvUploadService,
    /// Used by readiness checks
    pub records: Arc<dyn CvRecordStore>,
    pub blobs: Arc<dyn BlobStore>,
    /// Set only for the local filesystem backend, which receives the direct writes itself
    pub local_blobs: Option<Arc<LocalStorage>>,
}
