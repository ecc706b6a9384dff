//! Telegram Bot API wire types.
//!
//! Only the fields cued reads are modelled; serde ignores the rest. These
//! are NOT the transport-neutral chat types from cued-types -- `Update`
//! converts into `IncomingMessage` at the adapter boundary.

use serde::{Deserialize, Serialize};

use cued_types::chat::{ChatKind, ChatTarget, IncomingMessage, ReplyKeyboard, UserId};

/// Envelope around every Bot API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<u16>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseParameters {
    pub retry_after: Option<u64>,
}

/// The bot's own account, from `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    /// Absent for posts made on behalf of a channel.
    pub from: Option<Sender>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sender {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ChatKind,
}

impl Update {
    /// The text message carried by this update, if any.
    ///
    /// The chat id is the conversation identity, so replies go back to the
    /// chat the message was posted in; `from.id` becomes the submitter.
    /// Stickers, photos and other non-text messages yield `None`.
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        let message = self.message?;
        let text = message.text?;
        Some(IncomingMessage {
            user: UserId(message.chat.id),
            from: message.from.map(|sender| UserId(sender.id)),
            chat_kind: message.chat.kind,
            text,
        })
    }
}

/// `getUpdates` parameters.
#[derive(Debug, Clone, Serialize)]
pub struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
}

/// `sendMessage` parameters.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a ChatTarget,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    pub disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyKeyboardMarkup<'a>>,
}

/// `ReplyKeyboardMarkup` object.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyKeyboardMarkup<'a> {
    pub keyboard: Vec<Vec<KeyboardButton<'a>>>,
    pub one_time_keyboard: bool,
    pub resize_keyboard: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyboardButton<'a> {
    pub text: &'a str,
}

impl<'a> From<&'a ReplyKeyboard> for ReplyKeyboardMarkup<'a> {
    fn from(keyboard: &'a ReplyKeyboard) -> Self {
        Self {
            keyboard: keyboard
                .rows
                .iter()
                .map(|row| row.iter().map(|label| KeyboardButton { text: label }).collect())
                .collect(),
            one_time_keyboard: keyboard.one_time,
            resize_keyboard: true,
        }
    }
}

/// `sendMessage` returns the sent message; cued only checks success.
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}
