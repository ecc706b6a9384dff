//! Application state wiring services together.
//!
//! `AppState` holds what every command needs (data directory, settings and
//! the database). `AppState::dispatcher` pins the core dispatcher to the
//! concrete infra implementations for `cued run`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cued_core::conversation::ConversationStore;
use cued_core::dispatch::Dispatcher;
use cued_core::flow::FlowEngine;
use cued_core::submission::SubmissionHandler;
use cued_infra::config::load_settings;
use cued_infra::data_dir::ensure_data_dir;
use cued_infra::sqlite::{DatabasePool, SqliteRecordStore};
use cued_infra::telegram::TelegramClient;
use cued_types::chat::ChatTarget;
use cued_types::config::Settings;

/// Concrete dispatcher type pinned to infra implementations.
pub type ConcreteDispatcher = Dispatcher<SqliteRecordStore, TelegramClient>;

/// Shared application state.
pub struct AppState {
    pub data_dir: PathBuf,
    pub settings: Settings,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Create the data directory, load settings and open the database.
    pub async fn init(data_dir: PathBuf) -> anyhow::Result<Self> {
        ensure_data_dir(&data_dir).await?;
        let settings = load_settings(&data_dir).await;
        let db_pool = DatabasePool::open_in(&data_dir, &settings.database_file).await?;

        Ok(Self {
            data_dir,
            settings,
            db_pool,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.request_timeout_secs)
    }

    pub fn record_store(&self) -> SqliteRecordStore {
        SqliteRecordStore::new(self.db_pool.clone())
    }

    /// Wire engine, submission handler and dispatcher around `client`.
    ///
    /// `channel` receives broadcasts; `operator` is told about submissions
    /// that could not be persisted.
    pub fn dispatcher(
        &self,
        channel: Option<ChatTarget>,
        operator: Option<ChatTarget>,
        client: Arc<TelegramClient>,
    ) -> ConcreteDispatcher {
        let store = Arc::new(ConversationStore::new(self.settings.max_active_conversations));
        let engine = FlowEngine::new(store);
        let submissions =
            SubmissionHandler::new(self.record_store(), client.clone(), channel)
                .with_timeout(self.request_timeout());

        Dispatcher::new(engine, submissions, client).with_operator(operator)
    }
}
