//! Record store trait.
//!
//! Defines the interface for persisting completed submissions.
//! Implementations live in cued-infra.

use cued_types::error::RepositoryError;
use cued_types::submission::{RecordTable, SubmissionRecord};

/// Trait for submission record persistence.
///
/// Two logical tables: `profiles` (applicants and recruiters) and
/// `job_postings`. Uses RPITIT (native async fn in traits, Rust 2024
/// edition).
pub trait RecordStore: Send + Sync {
    /// Write one record. Called at most once per completed flow.
    fn put(
        &self,
        table: RecordTable,
        record: &SubmissionRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Most recent records first.
    fn list(
        &self,
        table: RecordTable,
        limit: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<SubmissionRecord>, RepositoryError>> + Send;

    /// Total number of records in a table.
    fn count(
        &self,
        table: RecordTable,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
