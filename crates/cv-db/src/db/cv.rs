use super::store::{CvPage, CvRecordStore, ListFilter, RecordStoreError};
use cv_core::models::CvRecord;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

const SELECT_COLUMNS: &str =
    "id, file_name, mime_type, size, storage_path, status, created_at, updated_at";

/// Repository for CV records backed by PostgreSQL
#[derive(Clone)]
pub struct PostgresCvRepository {
    pool: PgPool,
}

impl PostgresCvRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CvRecordStore for PostgresCvRepository {
    #[tracing::instrument(skip(self, record), fields(
        db.system = "postgresql",
        db.table = "cv_records",
        db.operation = "insert",
        db.record_id = %record.id
    ))]
    async fn create(&self, record: &CvRecord) -> Result<(), RecordStoreError> {
        // Use dynamic SQLx queries to avoid requiring DATABASE_URL/sqlx prepare
        let result = sqlx::query(
            r#"
            INSERT INTO cv_records (
                id, file_name, mime_type, size, storage_path, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(&record.file_name)
        .bind(&record.mime_type)
        .bind(record.size)
        .bind(&record.storage_path)
        .bind(record.status)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Err(RecordStoreError::AlreadyExists(record.id))
            }
            Err(e) => {
                tracing::error!(error = ?e, cv_id = %record.id, "Failed to insert CV record");
                Err(e.into())
            }
        }
    }

    #[tracing::instrument(skip(self, record), fields(
        db.system = "postgresql",
        db.table = "cv_records",
        db.operation = "update",
        db.record_id = %record.id
    ))]
    async fn update(&self, record: &CvRecord) -> Result<(), RecordStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE cv_records
            SET mime_type = $2, size = $3, status = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(&record.mime_type)
        .bind(record.size)
        .bind(record.status)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, cv_id = %record.id, "Failed to update CV record");
            RecordStoreError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RecordStoreError::NotFound(record.id));
        }

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "cv_records",
        db.operation = "select",
        db.record_id = %id
    ))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CvRecord>, RecordStoreError> {
        let record = sqlx::query_as::<Postgres, CvRecord>(&format!(
            "SELECT {} FROM cv_records WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "cv_records",
        db.operation = "select"
    ))]
    async fn list(&self, filter: &ListFilter) -> Result<CvPage, RecordStoreError> {
        // Keyset pagination on (created_at, id); an unknown cursor yields an empty page
        let rows = sqlx::query_as::<Postgres, CvRecord>(&format!(
            r#"
            SELECT {}
            FROM cv_records
            WHERE ($1::cv_status IS NULL OR status = $1)
              AND ($2::timestamptz IS NULL OR created_at < $2)
              AND ($3::uuid IS NULL OR (created_at, id) <
                   (SELECT c.created_at, c.id FROM cv_records c WHERE c.id = $3))
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            "#,
            SELECT_COLUMNS
        ))
        .bind(filter.status)
        .bind(filter.created_before)
        .bind(filter.cursor)
        .bind(filter.limit + 1)
        .fetch_all(&self.pool)
        .await?;

        Ok(CvPage::from_rows(rows, filter.limit))
    }

    async fn health_check(&self) -> Result<(), RecordStoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
