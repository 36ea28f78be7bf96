use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::cv::{CvRecord, CvStatus};
use crate::constants::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

/// Request to start a CV upload
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct InitiateUploadRequest {
    /// Original filename; the text after the last `.` becomes the object extension
    #[validate(length(
        min = 1,
        max = 255,
        message = "File name must be between 1 and 255 characters"
    ))]
    pub file_name: String,
    /// Declared content type (MIME type)
    #[validate(
        length(
            min = 3,
            max = 255,
            message = "MIME type must be between 3 and 255 characters"
        ),
        contains(pattern = "/", message = "MIME type must look like type/subtype")
    )]
    pub mime_type: String,
}

/// Response carrying the signed URL the client writes the bytes to
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InitiateUploadResponse {
    pub id: Uuid,
    /// Object key the bytes must be written to
    pub object_key: String,
    /// Time-limited URL accepting a single `PUT` of the file
    pub signed_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Response after confirming an upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompleteUploadResponse {
    pub id: Uuid,
    pub status: CvStatus,
    /// Size in bytes as observed in storage
    pub size: i64,
    pub mime_type: String,
    pub storage_path: String,
}

/// Full record view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CvResponse {
    pub id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
    pub storage_path: String,
    pub status: CvStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Page of records
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CvListResponse {
    pub items: Vec<CvResponse>,
    /// Pass back as `cursor` to fetch the next page; absent on the last page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Uuid>,
}

/// Query parameters for listing records
#[derive(Debug, Default, Clone, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCvsQuery {
    /// Page size (1-100, default 20)
    pub limit: Option<i64>,
    /// Id of the last record of the previous page
    pub cursor: Option<Uuid>,
    /// Only records in this state
    pub status: Option<CvStatus>,
    /// Only records created strictly before this instant
    pub created_before: Option<DateTime<Utc>>,
}

/// Input of the initiate operation.
#[derive(Debug, Clone)]
pub struct InitiateUpload {
    pub file_name: String,
    pub mime_type: String,
}

/// Output of the initiate operation.
#[derive(Debug, Clone)]
pub struct InitiatedUpload {
    pub id: Uuid,
    pub storage_path: String,
    pub signed_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Input of the list operation.
#[derive(Debug, Clone, Default)]
pub struct ListCvs {
    pub limit: Option<i64>,
    pub cursor: Option<Uuid>,
    pub status: Option<CvStatus>,
    pub created_before: Option<DateTime<Utc>>,
}

impl ListCvs {
    /// Requested page size clamped to `1..=MAX_LIST_LIMIT`.
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

impl From<InitiateUploadRequest> for InitiateUpload {
    fn from(req: InitiateUploadRequest) -> Self {
        InitiateUpload {
            file_name: req.file_name,
            mime_type: req.mime_type,
        }
    }
}

impl From<InitiatedUpload> for InitiateUploadResponse {
    fn from(upload: InitiatedUpload) -> Self {
        InitiateUploadResponse {
            id: upload.id,
            object_key: upload.storage_path,
            signed_url: upload.signed_url,
            expires_at: upload.expires_at,
        }
    }
}

impl From<ListCvsQuery> for ListCvs {
    fn from(query: ListCvsQuery) -> Self {
        ListCvs {
            limit: query.limit,
            cursor: query.cursor,
            status: query.status,
            created_before: query.created_before,
        }
    }
}

impl From<CvRecord> for CompleteUploadResponse {
    fn from(record: CvRecord) -> Self {
        CompleteUploadResponse {
            id: record.id,
            status: record.status,
            size: record.size,
            mime_type: record.mime_type,
            storage_path: record.storage_path,
        }
    }
}

impl From<CvRecord> for CvResponse {
    fn from(record: CvRecord) -> Self {
        CvResponse {
            id: record.id,
            file_name: record.file_name,
            mime_type: record.mime_type,
            size: record.size,
            storage_path: record.storage_path,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
