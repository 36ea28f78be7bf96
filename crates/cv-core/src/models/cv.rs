use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Upload lifecycle state. `Pending` is initial, `Uploaded` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "cv_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum CvStatus {
    Pending,
    Uploaded,
}

impl Display for CvStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CvStatus::Pending => write!(f, "pending"),
            CvStatus::Uploaded => write!(f, "uploaded"),
        }
    }
}

impl FromStr for CvStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(CvStatus::Pending),
            "uploaded" => Ok(CvStatus::Uploaded),
            other => Err(format!("Invalid CV status: {}", other)),
        }
    }
}

/// Metadata record for one uploaded CV.
///
/// `id`, `file_name`, `storage_path` and `created_at` never change after creation.
/// `size` stays `0` until the blob has been observed in storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CvRecord {
    pub id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
    pub storage_path: String,
    pub status: CvStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CvRecord {
    /// Build a fresh `Pending` record with zero size.
    pub fn new_pending(
        id: Uuid,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        storage_path: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size: 0,
            storage_path: storage_path.into(),
            status: CvStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply what the blob store reported for this record's object and mark it uploaded.
    ///
    /// An empty observed content type keeps the declared `mime_type`.
    pub fn apply_observation(&mut self, size: i64, content_type: &str, now: DateTime<Utc>) {
        self.size = size;
        if !content_type.is_empty() {
            self.mime_type = content_type.to_string();
        }
        self.status = CvStatus::Uploaded;
        self.updated_at = now;
    }

    pub fn is_uploaded(&self) -> bool {
        self.status == CvStatus::Uploaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending() -> CvRecord {
        let now = Utc::now();
        CvRecord::new_pending(
            Uuid::new_v4(),
            "resume.pdf",
            "application/pdf",
            "cv/x.pdf",
            now,
        )
    }

    #[test]
    fn test_new_pending_record() {
        let record = pending();
        assert_eq!(record.status, CvStatus::Pending);
        assert_eq!(record.size, 0);
        assert_eq!(record.created_at, record.updated_at);
        assert!(!record.is_uploaded());
    }

    #[test]
    fn test_apply_observation_overwrites_size_and_mime() {
        let mut record = pending();
        let later = record.created_at + Duration::seconds(30);
        record.apply_observation(51200, "application/octet-stream", later);

        assert!(record.is_uploaded());
        assert_eq!(record.size, 51200);
        assert_eq!(record.mime_type, "application/octet-stream");
        assert_eq!(record.updated_at, later);
        assert!(record.created_at < record.updated_at);
    }

    #[test]
    fn test_apply_observation_keeps_declared_mime_when_empty() {
        let mut record = pending();
        record.apply_observation(10, "", Utc::now());
        assert_eq!(record.mime_type, "application/pdf");
        assert_eq!(record.size, 10);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CvStatus::Uploaded).unwrap(),
            "\"uploaded\""
        );
        assert_eq!("Pending".parse::<CvStatus>().unwrap(), CvStatus::Pending);
        assert!("failed".parse::<CvStatus>().is_err());
    }
}
