use chrono::{DateTime, Utc};
use cv_core::models::{CvRecord, CvStatus};
use cv_core::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Record store errors
#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("CV record already exists: {0}")]
    AlreadyExists(Uuid),

    #[error("CV record not found: {0}")]
    NotFound(Uuid),

    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Record store returned malformed data: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for RecordStoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => RecordStoreError::Corrupt(err.to_string()),
            other => RecordStoreError::Unavailable(other.to_string()),
        }
    }
}

impl From<RecordStoreError> for AppError {
    fn from(err: RecordStoreError) -> Self {
        match err {
            RecordStoreError::AlreadyExists(id) => {
                AppError::Conflict(format!("CV record already exists: {}", id))
            }
            RecordStoreError::NotFound(id) => AppError::NotFound(format!("CV not found: {}", id)),
            RecordStoreError::Unavailable(msg) => AppError::Unavailable(msg),
            RecordStoreError::Corrupt(msg) => AppError::Internal(msg),
        }
    }
}

/// Listing filter. Records come back newest first.
#[derive(Debug, Clone)]
pub struct ListFilter {
    pub limit: i64,
    /// Id of the last record of the previous page
    pub cursor: Option<Uuid>,
    pub status: Option<CvStatus>,
    pub created_before: Option<DateTime<Utc>>,
}

/// One page of records
#[derive(Debug, Clone, Default)]
pub struct CvPage {
    pub records: Vec<CvRecord>,
    /// Set when more records follow; pass it back as `cursor`
    pub next_cursor: Option<Uuid>,
}

impl CvPage {
    /// Build a page from up to `limit + 1` rows; the extra row only signals that more exist.
    pub(crate) fn from_rows(mut rows: Vec<CvRecord>, limit: i64) -> Self {
        let limit = usize::try_from(limit).unwrap_or(0);
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = if has_more {
            rows.last().map(|r| r.id)
        } else {
            None
        };
        CvPage {
            records: rows,
            next_cursor,
        }
    }
}

/// Trait for CV record persistence
/// This abstracts the database implementation (PostgreSQL or in-memory)
#[async_trait::async_trait]
pub trait CvRecordStore: Send + Sync {
    /// Persist a new record; `AlreadyExists` if the id or storage path is taken
    async fn create(&self, record: &CvRecord) -> Result<(), RecordStoreError>;

    /// Replace the mutable fields (mime type, size, status, updated_at) of an existing record
    async fn update(&self, record: &CvRecord) -> Result<(), RecordStoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CvRecord>, RecordStoreError>;

    async fn list(&self, filter: &ListFilter) -> Result<CvPage, RecordStoreError>;

    /// Cheap reachability probe for readiness checks
    async fn health_check(&self) -> Result<(), RecordStoreError>;
}
