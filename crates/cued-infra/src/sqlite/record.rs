//! SQLite submission record store.
//!
//! Implements `RecordStore` from `cued-core`. Each record is one row; its
//! fields are stored as an ordered JSON array so the step order survives.

use chrono::{DateTime, Utc};
use cued_core::repository::RecordStore;
use cued_types::chat::UserId;
use cued_types::error::RepositoryError;
use cued_types::flow::FlowKind;
use cued_types::submission::{RecordTable, SubmissionField, SubmissionRecord};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `RecordStore`.
pub struct SqliteRecordStore {
    pool: DatabasePool,
}

impl SqliteRecordStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct RecordRow {
    id: String,
    kind: String,
    submitter: i64,
    fields: String,
    submitted_at: String,
}

impl RecordRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            kind: row.try_get("kind")?,
            submitter: row.try_get("submitter")?,
            fields: row.try_get("fields")?,
            submitted_at: row.try_get("submitted_at")?,
        })
    }

    fn into_record(self) -> Result<SubmissionRecord, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid record id: {e}")))?;
        let kind: FlowKind = self
            .kind
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let fields: Vec<SubmissionField> = serde_json::from_str(&self.fields)
            .map_err(|e| RepositoryError::Query(format!("invalid fields JSON: {e}")))?;

        Ok(SubmissionRecord {
            id,
            kind,
            submitter: UserId(self.submitter),
            fields,
            submitted_at: parse_datetime(&self.submitted_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn map_write_error(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(db.message().to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        _ => RepositoryError::Query(err.to_string()),
    }
}

// ---------------------------------------------------------------------------
// RecordStore implementation
// ---------------------------------------------------------------------------

impl RecordStore for SqliteRecordStore {
    async fn put(&self, table: RecordTable, record: &SubmissionRecord) -> Result<(), RepositoryError> {
        let fields = serde_json::to_string(&record.fields)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize fields: {e}")))?;

        // Table names come from a closed enum, never from input.
        let sql = format!(
            "INSERT INTO {} (id, kind, submitter, fields, submitted_at) VALUES (?, ?, ?, ?, ?)",
            table.as_str()
        );
        sqlx::query(&sql)
            .bind(record.id.to_string())
            .bind(record.kind.to_string())
            .bind(record.submitter.0)
            .bind(&fields)
            .bind(record.submitted_at.to_rfc3339())
            .execute(&self.pool.writer)
            .await
            .map_err(map_write_error)?;

        tracing::debug!(table = %table, record = %record.id, "record inserted");
        Ok(())
    }

    async fn list(
        &self,
        table: RecordTable,
        limit: Option<i64>,
    ) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        // SQLite treats a negative LIMIT as "no limit".
        let sql = format!(
            "SELECT id, kind, submitter, fields, submitted_at FROM {} ORDER BY submitted_at DESC, id DESC LIMIT ?",
            table.as_str()
        );
        let rows = sqlx::query(&sql)
            .bind(limit.unwrap_or(-1))
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                RecordRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_record()
            })
            .collect()
    }

    async fn count(&self, table: RecordTable) -> Result<u64, RepositoryError> {
        let sql = format!("SELECT COUNT(*) AS n FROM {}", table.as_str());
        let row = sqlx::query(&sql)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(n.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn test_store() -> SqliteRecordStore {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        SqliteRecordStore::new(DatabasePool::new(&url).await.unwrap())
    }

    fn record(kind: FlowKind, submitter: i64, values: &[(&str, &str)]) -> SubmissionRecord {
        SubmissionRecord {
            id: Uuid::now_v7(),
            kind,
            submitter: UserId(submitter),
            fields: values
                .iter()
                .map(|(name, value)| SubmissionField {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect(),
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_put_then_list_preserves_field_order() {
        let store = test_store().await;
        let rec = record(
            FlowKind::Applicant,
            42,
            &[("Full Name", "Jane Doe"), ("Age", "29"), ("Skills", "Rust")],
        );

        store.put(RecordTable::Profiles, &rec).await.unwrap();

        let listed = store.list(RecordTable::Profiles, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, rec.id);
        assert_eq!(listed[0].submitter, UserId(42));
        let names: Vec<_> = listed[0].fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Full Name", "Age", "Skills"]);
    }

    #[tokio::test]
    async fn test_tables_are_separate() {
        let store = test_store().await;
        store
            .put(RecordTable::Profiles, &record(FlowKind::Recruiter, 1, &[("Full Name", "Sam")]))
            .await
            .unwrap();
        store
            .put(RecordTable::JobPostings, &record(FlowKind::JobPosting, 1, &[("Job Role", "Welder")]))
            .await
            .unwrap();
        store
            .put(RecordTable::JobPostings, &record(FlowKind::JobPosting, 2, &[("Job Role", "Baker")]))
            .await
            .unwrap();

        assert_eq!(store.count(RecordTable::Profiles).await.unwrap(), 1);
        assert_eq!(store.count(RecordTable::JobPostings).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_limit() {
        let store = test_store().await;
        let mut older = record(FlowKind::JobPosting, 1, &[("Job Role", "Welder")]);
        older.submitted_at = Utc::now() - Duration::hours(1);
        let newer = record(FlowKind::JobPosting, 2, &[("Job Role", "Baker")]);

        store.put(RecordTable::JobPostings, &older).await.unwrap();
        store.put(RecordTable::JobPostings, &newer).await.unwrap();

        let listed = store.list(RecordTable::JobPostings, Some(1)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].get("Job Role"), Some("Baker"));
    }

    #[tokio::test]
    async fn test_duplicate_id_is_conflict() {
        let store = test_store().await;
        let rec = record(FlowKind::Applicant, 5, &[("Full Name", "Jane")]);

        store.put(RecordTable::Profiles, &rec).await.unwrap();
        let err = store.put(RecordTable::Profiles, &rec).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_empty_table() {
        let store = test_store().await;
        assert_eq!(store.count(RecordTable::Profiles).await.unwrap(), 0);
        assert!(store.list(RecordTable::Profiles, Some(10)).await.unwrap().is_empty());
    }
}
