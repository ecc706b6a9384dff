//! In-memory port implementations shared by the unit tests.

use std::sync::Mutex;

use cued_types::chat::{ChatTarget, ReplyKeyboard, TextFormat};
use cued_types::error::{RepositoryError, TransportError};
use cued_types::submission::{RecordTable, SubmissionRecord};

use crate::repository::RecordStore;
use crate::transport::ChatTransport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Behavior {
    #[default]
    Succeed,
    Fail,
    Stall,
}

/// Record store keeping every `put` in memory.
#[derive(Default)]
pub struct MemoryRecordStore {
    puts: Mutex<Vec<(RecordTable, SubmissionRecord)>>,
    behavior: Behavior,
}

impl MemoryRecordStore {
    /// A store whose `put` always errors.
    pub fn failing() -> Self {
        Self {
            behavior: Behavior::Fail,
            ..Self::default()
        }
    }

    /// A store whose `put` never finishes.
    pub fn stalled() -> Self {
        Self {
            behavior: Behavior::Stall,
            ..Self::default()
        }
    }

    pub fn puts(&self) -> Vec<(RecordTable, SubmissionRecord)> {
        self.puts.lock().unwrap().clone()
    }
}

impl RecordStore for MemoryRecordStore {
    async fn put(&self, table: RecordTable, record: &SubmissionRecord) -> Result<(), RepositoryError> {
        match self.behavior {
            Behavior::Succeed => {
                self.puts.lock().unwrap().push((table, record.clone()));
                Ok(())
            }
            Behavior::Fail => Err(RepositoryError::Query("disk I/O error".to_string())),
            Behavior::Stall => std::future::pending().await,
        }
    }

    async fn list(
        &self,
        table: RecordTable,
        limit: Option<i64>,
    ) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let mut records: Vec<_> = self
            .puts()
            .into_iter()
            .filter(|(t, _)| *t == table)
            .map(|(_, r)| r)
            .rev()
            .collect();
        if let Some(limit) = limit {
            records.truncate(limit.max(0) as usize);
        }
        Ok(records)
    }

    async fn count(&self, table: RecordTable) -> Result<u64, RepositoryError> {
        Ok(self.puts().iter().filter(|(t, _)| *t == table).count() as u64)
    }
}

/// One message captured by `RecordingTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat: ChatTarget,
    pub text: String,
    pub format: TextFormat,
    pub keyboard: Option<ReplyKeyboard>,
}

/// Transport that records outgoing messages instead of sending them.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentMessage>>,
    fail: bool,
}

impl RecordingTransport {
    /// A transport whose every send errors (and records nothing).
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts sent to `chat`, in order.
    pub fn texts_to(&self, chat: &ChatTarget) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|m| &m.chat == chat)
            .map(|m| m.text)
            .collect()
    }
}

impl RecordingTransport {
    fn record(
        &self,
        chat: &ChatTarget,
        text: &str,
        format: TextFormat,
        keyboard: Option<&ReplyKeyboard>,
    ) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::Http("connection reset".to_string()));
        }
        self.sent.lock().unwrap().push(SentMessage {
            chat: chat.clone(),
            text: text.to_string(),
            format,
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }
}

impl ChatTransport for RecordingTransport {
    async fn send_message(
        &self,
        chat: &ChatTarget,
        text: &str,
        format: TextFormat,
    ) -> Result<(), TransportError> {
        self.record(chat, text, format, None)
    }

    async fn send_with_keyboard(
        &self,
        chat: &ChatTarget,
        text: &str,
        format: TextFormat,
        keyboard: &ReplyKeyboard,
    ) -> Result<(), TransportError> {
        self.record(chat, text, format, Some(keyboard))
    }
}
