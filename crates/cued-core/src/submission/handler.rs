//! Submission handler: persist and broadcast a completed flow.
//!
//! The two side effects are independent and best-effort. A failed `put`
//! does not stop the broadcast, and neither is rolled back when the other
//! fails. Each call is bounded by the configured timeout; nothing is
//! retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cued_types::chat::{ChatTarget, TextFormat, UserId};
use cued_types::error::SubmissionError;
use cued_types::submission::SubmissionRecord;

use crate::flow::CompletedFlow;
use crate::repository::RecordStore;
use crate::transport::ChatTransport;

use super::render::{build_record, render_broadcast};

/// Default bound on each side effect.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// What happened to one submission.
#[derive(Debug)]
pub struct SubmissionReport {
    pub record: SubmissionRecord,
    pub persisted: Result<(), SubmissionError>,
    pub broadcast: Result<(), SubmissionError>,
}

impl SubmissionReport {
    /// A submission counts as delivered once the broadcast went out.
    pub fn delivered(&self) -> bool {
        self.broadcast.is_ok()
    }
}

/// Finalizes completed flows.
pub struct SubmissionHandler<R: RecordStore, T: ChatTransport> {
    records: R,
    transport: Arc<T>,
    channel: Option<ChatTarget>,
    timeout: Duration,
}

impl<R: RecordStore, T: ChatTransport> SubmissionHandler<R, T> {
    /// Create a handler broadcasting to `channel`.
    ///
    /// With no channel configured, every broadcast fails with
    /// `SubmissionError::NoChannel` while records are still persisted.
    pub fn new(records: R, transport: Arc<T>, channel: Option<ChatTarget>) -> Self {
        Self {
            records,
            transport,
            channel,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    /// Persist, then broadcast, the record built from `completed`.
    pub async fn complete(&self, completed: CompletedFlow, submitter: UserId) -> SubmissionReport {
        let def = completed.definition();
        let record = build_record(&completed, submitter);

        let persisted = self
            .bounded("record store put", self.records.put(def.table, &record))
            .await
            .and_then(|r| r.map_err(SubmissionError::from));
        match &persisted {
            Ok(()) => tracing::info!(
                record = %record.id,
                flow = %record.kind,
                table = %def.table,
                "submission persisted"
            ),
            Err(e) => tracing::error!(
                record = %record.id,
                flow = %record.kind,
                table = %def.table,
                error = %e,
                "submission not persisted"
            ),
        }

        let broadcast = match &self.channel {
            None => Err(SubmissionError::NoChannel),
            Some(channel) => {
                let text = render_broadcast(def, &record);
                self.bounded(
                    "broadcast",
                    self.transport.send_message(channel, &text, TextFormat::Markdown),
                )
                .await
                .and_then(|r| r.map_err(SubmissionError::from))
            }
        };
        match &broadcast {
            Ok(()) => tracing::info!(record = %record.id, flow = %record.kind, "submission broadcast"),
            Err(e) => tracing::error!(
                record = %record.id,
                flow = %record.kind,
                error = %e,
                "submission not broadcast"
            ),
        }

        SubmissionReport {
            record,
            persisted,
            broadcast,
        }
    }

    async fn bounded<F: Future>(
        &self,
        operation: &'static str,
        fut: F,
    ) -> Result<F::Output, SubmissionError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| SubmissionError::Timeout {
                operation,
                secs: self.timeout.as_secs(),
            })
    }
}
