//! Long-polling loop feeding Telegram updates to the dispatcher.
//!
//! Updates are handled one at a time, in order, each to completion before
//! the next batch is fetched. Cancellation interrupts a pending fetch or
//! backoff but is otherwise checked once a batch is fully handled, so an
//! in-flight submission always finishes. On the way out the last offset
//! is confirmed to Telegram so a successor instance does not replay it.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use cued_core::dispatch::{Dispatched, Dispatcher};
use cued_core::repository::RecordStore;
use cued_core::transport::ChatTransport;
use cued_infra::telegram::{TelegramClient, Update};
use cued_types::error::TransportError;

const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Bound on the final offset confirmation at shutdown.
const CONFIRM_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of incoming updates.
pub trait UpdateSource: Send + Sync {
    fn fetch(
        &self,
        offset: Option<i64>,
        poll_secs: u64,
    ) -> impl Future<Output = Result<Vec<Update>, TransportError>> + Send;
}

impl UpdateSource for TelegramClient {
    async fn fetch(&self, offset: Option<i64>, poll_secs: u64) -> Result<Vec<Update>, TransportError> {
        self.get_updates(offset, poll_secs).await
    }
}

/// Counters reported when the loop stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub updates: u64,
    pub submissions: u64,
}

/// Poll `source` and dispatch every text message until `shutdown` fires.
///
/// Transient fetch errors back off exponentially (capped at one minute).
/// A rejected token stops the loop with an error. After cancellation the
/// offset past the last handled update is sent once with a zero poll.
pub async fn run_polling<S, R, T>(
    source: &S,
    dispatcher: &Dispatcher<R, T>,
    poll_secs: u64,
    shutdown: CancellationToken,
) -> anyhow::Result<RunSummary>
where
    S: UpdateSource,
    R: RecordStore,
    T: ChatTransport,
{
    let mut offset: Option<i64> = None;
    let mut backoff = Duration::from_secs(1);
    let mut summary = RunSummary::default();

    loop {
        let fetched = tokio::select! {
            _ = shutdown.cancelled() => break,
            res = source.fetch(offset, poll_secs) => res,
        };

        let updates = match fetched {
            Ok(updates) => {
                backoff = Duration::from_secs(1);
                updates
            }
            Err(TransportError::Unauthorized) => {
                anyhow::bail!("Telegram rejected the bot token");
            }
            Err(e) => {
                let wait = match &e {
                    TransportError::RateLimited {
                        retry_after: Some(secs),
                    } => Duration::from_secs(*secs),
                    _ => backoff,
                };
                tracing::warn!(error = %e, wait_secs = wait.as_secs(), "fetching updates failed");
                backoff = (backoff * 2).min(MAX_BACKOFF);
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(wait) => continue,
                }
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);
            summary.updates += 1;
            let Some(message) = update.into_incoming() else {
                continue;
            };
            if let Dispatched::Submitted(_) = dispatcher.handle(message).await {
                summary.submissions += 1;
            }
        }

        if shutdown.is_cancelled() {
            break;
        }
    }

    if let Some(offset) = offset {
        confirm_offset(source, offset).await;
    }

    tracing::info!(
        updates = summary.updates,
        submissions = summary.submissions,
        "polling stopped"
    );
    Ok(summary)
}

/// Acknowledge every update before `offset` without waiting for new ones.
async fn confirm_offset<S: UpdateSource>(source: &S, offset: i64) {
    match tokio::time::timeout(CONFIRM_TIMEOUT, source.fetch(Some(offset), 0)).await {
        Ok(Ok(_)) => tracing::debug!(offset, "confirmed update offset"),
        Ok(Err(e)) => tracing::warn!(error = %e, offset, "could not confirm update offset"),
        Err(_) => tracing::warn!(offset, "confirming update offset timed out"),
    }
}

/// Wait for Ctrl+C or SIGTERM, then cancel `token`.
pub async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown requested");
    token.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use cued_core::conversation::ConversationStore;
    use cued_core::flow::FlowEngine;
    use cued_core::submission::SubmissionHandler;
    use cued_types::chat::{ChatTarget, ReplyKeyboard, TextFormat};
    use cued_types::error::RepositoryError;
    use cued_types::submission::{RecordTable, SubmissionRecord};

    /// Replays scripted batches. Serving the last one cancels the token,
    /// as a signal arriving mid-batch would.
    struct ScriptedSource {
        batches: Mutex<VecDeque<Result<Vec<Update>, TransportError>>>,
        calls: Mutex<Vec<(Option<i64>, u64)>>,
        done: CancellationToken,
    }

    impl ScriptedSource {
        fn new(batches: Vec<Result<Vec<Update>, TransportError>>, done: CancellationToken) -> Self {
            Self {
                batches: Mutex::new(batches.into()),
                calls: Mutex::new(Vec::new()),
                done,
            }
        }

        fn offsets(&self) -> Vec<Option<i64>> {
            self.calls.lock().unwrap().iter().map(|(offset, _)| *offset).collect()
        }
    }

    impl UpdateSource for ScriptedSource {
        async fn fetch(&self, offset: Option<i64>, poll_secs: u64) -> Result<Vec<Update>, TransportError> {
            self.calls.lock().unwrap().push((offset, poll_secs));
            let mut batches = self.batches.lock().unwrap();
            let next = batches.pop_front();
            if batches.is_empty() {
                self.done.cancel();
            }
            next.unwrap_or(Ok(Vec::new()))
        }
    }

    #[derive(Default)]
    struct Records(Mutex<Vec<SubmissionRecord>>);

    impl RecordStore for Records {
        async fn put(&self, _table: RecordTable, record: &SubmissionRecord) -> Result<(), RepositoryError> {
            self.0.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn list(&self, _table: RecordTable, _limit: Option<i64>) -> Result<Vec<SubmissionRecord>, RepositoryError> {
            Ok(self.0.lock().unwrap().clone())
        }

        async fn count(&self, _table: RecordTable) -> Result<u64, RepositoryError> {
            Ok(self.0.lock().unwrap().len() as u64)
        }
    }

    #[derive(Default)]
    struct Outbox(Mutex<Vec<(ChatTarget, String)>>);

    impl ChatTransport for Outbox {
        async fn send_message(&self, chat: &ChatTarget, text: &str, _format: TextFormat) -> Result<(), TransportError> {
            self.0.lock().unwrap().push((chat.clone(), text.to_string()));
            Ok(())
        }

        async fn send_with_keyboard(
            &self,
            chat: &ChatTarget,
            text: &str,
            format: TextFormat,
            _keyboard: &ReplyKeyboard,
        ) -> Result<(), TransportError> {
            self.send_message(chat, text, format).await
        }
    }

    fn text_update(update_id: i64, chat: i64, text: &str) -> Update {
        serde_json::from_value(serde_json::json!({
            "update_id": update_id,
            "message": {
                "message_id": update_id,
                "chat": {"id": chat, "type": "private"},
                "text": text,
            }
        }))
        .unwrap()
    }

    fn dispatcher(outbox: Arc<Outbox>) -> Dispatcher<Records, Outbox> {
        let engine = FlowEngine::new(Arc::new(ConversationStore::new(10)));
        let submissions = SubmissionHandler::new(
            Records::default(),
            outbox.clone(),
            Some(ChatTarget::Id(-100)),
        );
        Dispatcher::new(engine, submissions, outbox)
    }

    #[tokio::test]
    async fn test_updates_are_dispatched_in_order_and_offset_advances() {
        let token = CancellationToken::new();
        let mut batch: Vec<Update> = vec![text_update(10, 1, "/recruit")];
        for (i, answer) in [
            "Sam Lee",
            "Acme",
            "CTO",
            "https://acme.example",
            "Engineers",
            "Berlin",
            "https://linkedin.com/in/sam",
        ]
        .iter()
        .enumerate()
        {
            batch.push(text_update(11 + i as i64, 1, answer));
        }
        let source = ScriptedSource::new(vec![Ok(batch)], token.clone());
        let outbox = Arc::new(Outbox::default());
        let dispatcher = dispatcher(outbox.clone());

        let summary = run_polling(&source, &dispatcher, 1, token).await.unwrap();

        assert_eq!(summary, RunSummary { updates: 8, submissions: 1 });
        assert_eq!(source.offsets(), vec![None, Some(18)]);
        assert_eq!(dispatcher.submissions().records().0.lock().unwrap().len(), 1);
        let channel_posts = outbox
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|(chat, _)| *chat == ChatTarget::Id(-100))
            .count();
        assert_eq!(channel_posts, 1);
    }

    #[tokio::test]
    async fn test_shutdown_confirms_offset_of_last_batch() {
        let token = CancellationToken::new();
        let source = ScriptedSource::new(vec![Ok(vec![text_update(41, 5, "/help")])], token.clone());
        let outbox = Arc::new(Outbox::default());
        let dispatcher = dispatcher(outbox.clone());

        let summary = run_polling(&source, &dispatcher, 30, token).await.unwrap();

        assert_eq!(summary.updates, 1);
        assert_eq!(outbox.0.lock().unwrap().len(), 1);
        assert_eq!(*source.calls.lock().unwrap(), vec![(None, 30), (Some(42), 0)]);
    }

    #[tokio::test]
    async fn test_unauthorized_stops_the_loop() {
        let token = CancellationToken::new();
        let source = ScriptedSource::new(vec![Err(TransportError::Unauthorized)], token.clone());
        let dispatcher = dispatcher(Arc::new(Outbox::default()));

        let err = run_polling(&source, &dispatcher, 1, token).await.unwrap_err();
        assert!(err.to_string().contains("rejected"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_is_retried() {
        let token = CancellationToken::new();
        let source = ScriptedSource::new(
            vec![
                Err(TransportError::Http("connection reset".to_string())),
                Ok(vec![text_update(3, 2, "/help")]),
            ],
            token.clone(),
        );
        let outbox = Arc::new(Outbox::default());
        let dispatcher = dispatcher(outbox.clone());

        let summary = run_polling(&source, &dispatcher, 1, token).await.unwrap();
        assert_eq!(summary.updates, 1);
        assert_eq!(outbox.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_handles_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let source = ScriptedSource::new(vec![], token.clone());
        let dispatcher = dispatcher(Arc::new(Outbox::default()));

        let summary = run_polling(&source, &dispatcher, 1, token).await.unwrap();
        assert_eq!(summary, RunSummary::default());
        // Nothing was handled, so there is no offset to confirm.
        assert!(source.offsets().iter().all(Option::is_none));
    }
}
