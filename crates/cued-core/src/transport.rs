//! Chat transport trait.
//!
//! The engine and dispatcher only ever send text, optionally with a reply
//! keyboard; receiving updates is the runner's job. The Telegram
//! implementation lives in cued-infra.

use cued_types::chat::{ChatTarget, ReplyKeyboard, TextFormat};
use cued_types::error::TransportError;

/// Trait for delivering outgoing messages.
pub trait ChatTransport: Send + Sync {
    /// Send `text` to `chat`, rendered per `format`.
    fn send_message(
        &self,
        chat: &ChatTarget,
        text: &str,
        format: TextFormat,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// Send `text` with `keyboard` offered in place of the text input.
    fn send_with_keyboard(
        &self,
        chat: &ChatTarget,
        text: &str,
        format: TextFormat,
        keyboard: &ReplyKeyboard,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;
}
