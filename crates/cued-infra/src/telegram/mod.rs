//! Telegram Bot API adapter.
//!
//! - `client` -- HTTPS client, `ChatTransport` implementation
//! - `types` -- wire request/response shapes

pub mod client;
pub mod types;

pub use client::TelegramClient;
pub use types::{BotUser, Update};
