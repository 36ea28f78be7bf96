use super::store::{CvPage, CvRecordStore, ListFilter, RecordStoreError};
use cv_core::models::CvRecord;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Record store kept in process memory. Not durable; for development and tests.
#[derive(Clone, Default)]
pub struct InMemoryCvStore {
    records: Arc<RwLock<HashMap<Uuid, CvRecord>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryCvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `Unavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), RecordStoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RecordStoreError::Unavailable(
                "in-memory record store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CvRecordStore for InMemoryCvStore {
    async fn create(&self, record: &CvRecord) -> Result<(), RecordStoreError> {
        self.check_available()?;
        let mut records = self.records.write().await;
        if records.contains_key(&record.id)
            || records
                .values()
                .any(|r| r.storage_path == record.storage_path)
        {
            return Err(RecordStoreError::AlreadyExists(record.id));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn update(&self, record: &CvRecord) -> Result<(), RecordStoreError> {
        self.check_available()?;
        let mut records = self.records.write().await;
        let existing = records
            .get_mut(&record.id)
            .ok_or(RecordStoreError::NotFound(record.id))?;
        existing.mime_type = record.mime_type.clone();
        existing.size = record.size;
        existing.status = record.status;
        existing.updated_at = record.updated_at;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CvRecord>, RecordStoreError> {
        self.check_available()?;
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: &ListFilter) -> Result<CvPage, RecordStoreError> {
        self.check_available()?;
        let records = self.records.read().await;

        let after = match filter.cursor {
            Some(cursor) => match records.get(&cursor) {
                Some(r) => Some((r.created_at, r.id)),
                None => return Ok(CvPage::default()),
            },
            None => None,
        };

        let mut rows: Vec<CvRecord> = records
            .values()
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| filter.created_before.map_or(true, |t| r.created_at < t))
            .filter(|r| after.map_or(true, |key| (r.created_at, r.id) < key))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows.truncate(usize::try_from(filter.limit + 1).unwrap_or(0));

        Ok(CvPage::from_rows(rows, filter.limit))
    }

    async fn health_check(&self) -> Result<(), RecordStoreError> {
        self.check_available()
    }
}
