//! Two-phase CV upload coordinator.
//!
//! `initiate` mints an id, derives the object key and hands out a signed write URL before
//! persisting a `Pending` record. The client then writes the bytes straight to the blob
//! store. `finalize` checks that the object landed, copies its observed size and content
//! type onto the record and marks it `Uploaded`.
//!
//! Records whose blob never arrives stay `Pending`; `list` filtered by status and age is the
//! hook for an external janitor.

use chrono::Utc;
use cv_core::models::{CvRecord, InitiateUpload, InitiatedUpload, ListCvs};
use cv_core::{AppError, Config};
use cv_db::{CvPage, CvRecordStore, ListFilter};
use cv_storage::{cv_storage_key, BlobStore, SignedUrlOptions};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Tunables for the coordinator, passed in rather than read from the environment
#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Validity window of issued signed URLs
    pub signed_url_ttl: Duration,
    /// Upper bound on every single blob-store or record-store call
    pub operation_timeout: Duration,
    pub max_file_name_len: usize,
}

impl UploadSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            signed_url_ttl: config.signed_url_ttl(),
            operation_timeout: config.operation_timeout(),
            max_file_name_len: config.max_file_name_len,
        }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Coordinates the metadata record with the externally written blob.
///
/// Holds no mutable state of its own; all durable state lives in the record store.
#[derive(Clone)]
pub struct CvUploadService {
    blobs: Arc<dyn BlobStore>,
    records: Arc<dyn CvRecordStore>,
    settings: UploadSettings,
}

impl CvUploadService {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        records: Arc<dyn CvRecordStore>,
        settings: UploadSettings,
    ) -> Self {
        Self {
            blobs,
            records,
            settings,
        }
    }

    /// Run one collaborator call under the operation timeout. An elapsed timeout is reported
    /// as `Unavailable`; nothing is retried.
    async fn bounded<T, E, F>(&self, operation: &'static str, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<AppError>,
    {
        let timeout = self.settings.operation_timeout;
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = timeout.as_millis() as u64,
                    "Collaborator call timed out"
                );
                Err(AppError::Unavailable(format!(
                    "{} timed out after {}ms",
                    operation,
                    timeout.as_millis()
                )))
            }
        }
    }

    fn validate(&self, request: &InitiateUpload) -> Result<(), AppError> {
        if request.file_name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "file_name must not be empty".to_string(),
            ));
        }
        if request.file_name.chars().count() > self.settings.max_file_name_len {
            return Err(AppError::InvalidInput(format!(
                "file_name must be at most {} characters",
                self.settings.max_file_name_len
            )));
        }
        if request.mime_type.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "mime_type must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Start an upload: sign a write URL for a fresh key, then persist a `Pending` record.
    ///
    /// Nothing is persisted when signing fails. When persisting fails the URL is dropped
    /// and the error is returned.
    #[tracing::instrument(
        skip(self, request),
        fields(
            file_name = %request.file_name,
            mime_type = %request.mime_type,
            cv_id = tracing::field::Empty,
            storage_path = tracing::field::Empty
        )
    )]
    pub async fn initiate(&self, request: InitiateUpload) -> Result<InitiatedUpload, AppError> {
        self.validate(&request)?;

        let id = Uuid::new_v4();
        let storage_path = cv_storage_key(id, &request.file_name);
        let span = tracing::Span::current();
        span.record("cv_id", tracing::field::display(id));
        span.record("storage_path", storage_path.as_str());

        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.settings.signed_url_ttl)
            .map_err(|e| AppError::Internal(format!("Invalid signed URL TTL: {}", e)))?;
        let expires_at = now + ttl;

        let options = SignedUrlOptions::put(request.mime_type.clone(), expires_at);
        let signed_url = self
            .bounded(
                "blob_store.signed_url",
                self.blobs.signed_url(&storage_path, &options),
            )
            .await?;

        let record = CvRecord::new_pending(
            id,
            request.file_name,
            request.mime_type,
            storage_path.clone(),
            now,
        );
        self.bounded("record_store.create", self.records.create(&record))
            .await?;

        tracing::info!(expires_at = %expires_at, "CV upload initiated");

        Ok(InitiatedUpload {
            id,
            storage_path,
            signed_url,
            expires_at,
        })
    }

    /// Confirm an upload by observing the blob and marking the record `Uploaded`.
    ///
    /// A missing blob yields `NotFound` and leaves the record untouched, so the call can be
    /// retried once the client's write has landed. Finalizing an already uploaded record
    /// re-applies the currently observed attributes.
    #[tracing::instrument(skip(self), fields(cv_id = %id))]
    pub async fn finalize(&self, id: Uuid) -> Result<CvRecord, AppError> {
        let mut record = self
            .bounded("record_store.find_by_id", self.records.find_by_id(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("CV not found: {}", id)))?;

        let attributes = self
            .bounded("blob_store.head", self.blobs.head(&record.storage_path))
            .await?
            .ok_or_else(|| {
                tracing::info!(storage_path = %record.storage_path, "Blob not yet uploaded");
                AppError::NotFound(format!(
                    "No object uploaded at {}",
                    record.storage_path
                ))
            })?;

        let size = i64::try_from(attributes.size).map_err(|_| {
            AppError::Internal(format!(
                "Object size {} does not fit a record",
                attributes.size
            ))
        })?;

        if record.is_uploaded() {
            tracing::debug!("CV already uploaded, re-applying observed attributes");
        }
        record.apply_observation(size, &attributes.content_type, Utc::now());

        self.bounded("record_store.update", self.records.update(&record))
            .await?;

        tracing::info!(
            storage_path = %record.storage_path,
            size_bytes = record.size,
            mime_type = %record.mime_type,
            "CV upload finalized"
        );

        Ok(record)
    }

    /// Point lookup.
    #[tracing::instrument(skip(self), fields(cv_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<CvRecord, AppError> {
        self.bounded("record_store.find_by_id", self.records.find_by_id(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("CV not found: {}", id)))
    }

    /// List records newest first, optionally only those in one state or older than a cutoff.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, query: ListCvs) -> Result<CvPage, AppError> {
        let filter = ListFilter {
            limit: query.effective_limit(),
            cursor: query.cursor,
            status: query.status,
            created_before: query.created_before,
        };
        self.bounded("record_store.list", self.records.list(&filter))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_core::models::CvStatus;
    use cv_core::ErrorKind;
    use cv_db::InMemoryCvStore;
    use cv_storage::MemoryBlobStore;
    use std::collections::HashSet;

    struct Harness {
        blobs: MemoryBlobStore,
        records: InMemoryCvStore,
        service: CvUploadService,
    }

    fn harness_with(blobs: MemoryBlobStore, settings: UploadSettings) -> Harness {
        let records = InMemoryCvStore::new();
        let service = CvUploadService::new(
            Arc::new(blobs.clone()),
            Arc::new(records.clone()),
            settings,
        );
        Harness {
            blobs,
            records,
            service,
        }
    }

    fn harness() -> Harness {
        harness_with(MemoryBlobStore::new(), UploadSettings::default())
    }

    fn upload(file_name: &str, mime_type: &str) -> InitiateUpload {
        InitiateUpload {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
        }
    }

    #[tokio::test]
    async fn test_initiate_persists_pending_record() {
        let h = harness();
        let before = Utc::now();

        let started = h
            .service
            .initiate(upload("resume.pdf", "application/pdf"))
            .await
            .unwrap();

        assert_eq!(started.storage_path, format!("cv/{}.pdf", started.id));
        assert!(started.signed_url.contains(&started.storage_path));
        let ttl = started.expires_at - before;
        assert!(ttl >= chrono::Duration::seconds(599) && ttl <= chrono::Duration::seconds(601));

        let record = h.records.find_by_id(started.id).await.unwrap().unwrap();
        assert_eq!(record.status, CvStatus::Pending);
        assert_eq!(record.size, 0);
        assert_eq!(record.file_name, "resume.pdf");
        assert_eq!(record.mime_type, "application/pdf");
        assert_eq!(record.storage_path, started.storage_path);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[tokio::test]
    async fn test_initiate_mints_unique_ids() {
        let h = harness();
        let mut seen = HashSet::new();
        for _ in 0..50 {
            let started = h
                .service
                .initiate(upload("cv.docx", "application/msword"))
                .await
                .unwrap();
            assert!(seen.insert(started.id));
        }
        assert_eq!(h.records.len().await, 50);
    }

    #[tokio::test]
    async fn test_initiate_without_extension_uses_trailing_dot() {
        let h = harness();
        let started = h
            .service
            .initiate(upload("doc", "application/pdf"))
            .await
            .unwrap();
        assert_eq!(started.storage_path, format!("cv/{}.", started.id));
    }

    #[tokio::test]
    async fn test_initiate_rejects_empty_input() {
        let h = harness();
        let err = h
            .service
            .initiate(upload("", "application/pdf"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);

        let err = h.service.initiate(upload("a.pdf", " ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert!(h.records.is_empty().await);
    }

    #[tokio::test]
    async fn test_signing_failure_persists_nothing() {
        let h = harness();
        h.blobs.set_unavailable(true);

        let err = h
            .service
            .initiate(upload("resume.pdf", "application/pdf"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert!(h.records.is_empty().await);
    }

    #[tokio::test]
    async fn test_record_store_failure_surfaces() {
        let h = harness();
        h.records.set_unavailable(true);

        let err = h
            .service
            .initiate(upload("resume.pdf", "application/pdf"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);

        h.records.set_unavailable(false);
        assert!(h.records.is_empty().await);
    }

    #[tokio::test]
    async fn test_finalize_unknown_id_is_not_found() {
        let h = harness();
        let err = h.service.finalize(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(h.records.is_empty().await);
    }

    #[tokio::test]
    async fn test_finalize_before_upload_leaves_record_pending() {
        let h = harness();
        let started = h
            .service
            .initiate(upload("resume.pdf", "application/pdf"))
            .await
            .unwrap();

        let err = h.service.finalize(started.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains(&started.storage_path));

        let record = h.records.find_by_id(started.id).await.unwrap().unwrap();
        assert_eq!(record.status, CvStatus::Pending);
        assert_eq!(record.size, 0);
        assert_eq!(record.updated_at, record.created_at);
    }

    #[tokio::test]
    async fn test_finalize_applies_observed_attributes() {
        let h = harness();
        let started = h
            .service
            .initiate(upload("resume.pdf", "application/pdf"))
            .await
            .unwrap();
        h.blobs
            .put_object(&started.storage_path, 51200, "application/x-pdf")
            .await;

        let record = h.service.finalize(started.id).await.unwrap();
        assert_eq!(record.status, CvStatus::Uploaded);
        assert_eq!(record.size, 51200);
        assert_eq!(record.mime_type, "application/x-pdf");

        let stored = h.records.find_by_id(started.id).await.unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[tokio::test]
    async fn test_finalize_keeps_declared_mime_when_observed_is_empty() {
        let h = harness();
        let started = h
            .service
            .initiate(upload("resume.pdf", "application/pdf"))
            .await
            .unwrap();
        h.blobs.put_object(&started.storage_path, 1024, "").await;

        let record = h.service.finalize(started.id).await.unwrap();
        assert_eq!(record.mime_type, "application/pdf");
        assert_eq!(record.size, 1024);
    }

    #[tokio::test]
    async fn test_second_finalize_reapplies() {
        let h = harness();
        let started = h
            .service
            .initiate(upload("resume.pdf", "application/pdf"))
            .await
            .unwrap();
        h.blobs
            .put_object(&started.storage_path, 100, "application/pdf")
            .await;
        let first = h.service.finalize(started.id).await.unwrap();

        h.blobs
            .put_object(&started.storage_path, 200, "application/pdf")
            .await;
        let second = h.service.finalize(started.id).await.unwrap();

        assert_eq!(second.status, CvStatus::Uploaded);
        assert_eq!(second.size, 200);
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn test_head_failure_is_unavailable_and_record_untouched() {
        let h = harness();
        let started = h
            .service
            .initiate(upload("resume.pdf", "application/pdf"))
            .await
            .unwrap();
        h.blobs.set_unavailable(true);

        let err = h.service.finalize(started.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);

        let record = h.records.find_by_id(started.id).await.unwrap().unwrap();
        assert_eq!(record.status, CvStatus::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_blob_store_times_out() {
        let settings = UploadSettings {
            operation_timeout: Duration::from_secs(5),
            ..UploadSettings::default()
        };
        let h = harness_with(
            MemoryBlobStore::new().with_latency(Duration::from_secs(30)),
            settings,
        );

        let err = h
            .service
            .initiate(upload("resume.pdf", "application/pdf"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert!(h.records.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_head_times_out_and_record_stays_pending() {
        let settings = UploadSettings {
            operation_timeout: Duration::from_secs(5),
            ..UploadSettings::default()
        };
        let h = harness_with(
            MemoryBlobStore::new().with_latency(Duration::from_secs(30)),
            settings,
        );
        let id = Uuid::new_v4();
        let record = CvRecord::new_pending(
            id,
            "resume.pdf",
            "application/pdf",
            cv_storage_key(id, "resume.pdf"),
            Utc::now(),
        );
        h.records.create(&record).await.unwrap();
        h.blobs
            .put_object(&record.storage_path, 4096, "application/pdf")
            .await;

        let err = h.service.finalize(id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);

        let stored = h.records.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.status, CvStatus::Pending);
        assert_eq!(stored.size, 0);
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let h = harness();
        let started = h
            .service
            .initiate(upload("resume.pdf", "application/pdf"))
            .await
            .unwrap();

        let pending = h.service.get(started.id).await.unwrap();
        assert_eq!(pending.status, CvStatus::Pending);
        assert_eq!(pending.size, 0);
        assert_eq!(pending.storage_path, format!("cv/{}.pdf", started.id));

        h.blobs
            .put_object(&started.storage_path, 51200, "application/pdf")
            .await;

        let done = h.service.finalize(started.id).await.unwrap();
        assert_eq!(done.status, CvStatus::Uploaded);
        assert_eq!(done.size, 51200);
        assert_eq!(done.mime_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_list_pending_for_janitor() {
        let h = harness();
        let a = h
            .service
            .initiate(upload("a.pdf", "application/pdf"))
            .await
            .unwrap();
        let b = h
            .service
            .initiate(upload("b.pdf", "application/pdf"))
            .await
            .unwrap();
        h.blobs.put_object(&b.storage_path, 10, "application/pdf").await;
        h.service.finalize(b.id).await.unwrap();

        let page = h
            .service
            .list(ListCvs {
                status: Some(CvStatus::Pending),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].id, a.id);
        assert_eq!(page.next_cursor, None);
    }
}
