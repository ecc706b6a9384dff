//! TelegramClient -- Bot API client over HTTPS long polling.
//!
//! Implements [`ChatTransport`] for outgoing text and exposes `get_me` and
//! `get_updates` for the runner.
//!
//! The bot token is part of every request URL. It is wrapped in
//! [`secrecy::SecretString`] and stripped from reqwest errors before they are
//! logged or returned.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;

use cued_core::transport::ChatTransport;
use cued_types::chat::{ChatTarget, ReplyKeyboard, TextFormat};
use cued_types::error::TransportError;

use super::types::{
    ApiResponse, BotUser, GetUpdatesRequest, ReplyKeyboardMarkup, SendMessageRequest, SentMessage,
    Update,
};

/// Telegram Bot API client.
pub struct TelegramClient {
    client: reqwest::Client,
    token: SecretString,
    base_url: String,
    request_timeout: Duration,
}

impl TelegramClient {
    const DEFAULT_BASE_URL: &'static str = "https://api.telegram.org";

    /// Create a client whose ordinary calls give up after `request_timeout`.
    ///
    /// Long-poll calls extend that bound by the poll timeout.
    pub fn new(token: SecretString, request_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            request_timeout,
        })
    }

    /// Override the base URL (useful for testing or a local Bot API server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token.expose_secret(), method)
    }

    async fn call<P, R>(&self, method: &str, params: &P, timeout: Duration) -> Result<R, TransportError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(params)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Http(e.without_url().to_string()))?;

        decode_response(status, &body)
    }

    /// Identify the bot. Used at startup to verify the token.
    pub async fn get_me(&self) -> Result<BotUser, TransportError> {
        self.call("getMe", &serde_json::json!({}), self.request_timeout)
            .await
    }

    /// Long-poll for updates after `offset`, waiting up to `poll_secs`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        poll_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        let params = GetUpdatesRequest {
            offset,
            timeout: poll_secs,
            allowed_updates: &["message"],
        };
        let timeout = self.request_timeout + Duration::from_secs(poll_secs);
        self.call("getUpdates", &params, timeout).await
    }
}

/// Map a Bot API response body to its result or a `TransportError`.
///
/// Telegram reports failures in the JSON envelope, so the envelope is read
/// first and the HTTP status is only a fallback for non-JSON bodies.
fn decode_response<R: DeserializeOwned>(status: u16, body: &str) -> Result<R, TransportError> {
    let envelope: ApiResponse<R> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !(200..300).contains(&status) => {
            return Err(status_error(status, body.trim().to_string(), None));
        }
        Err(e) => {
            return Err(TransportError::Deserialization(format!(
                "failed to parse response: {e}"
            )));
        }
    };

    if envelope.ok {
        return envelope.result.ok_or_else(|| {
            TransportError::Deserialization("response has no result".to_string())
        });
    }

    Err(status_error(
        envelope.error_code.unwrap_or(status),
        envelope.description.unwrap_or_default(),
        envelope.parameters.and_then(|p| p.retry_after),
    ))
}

fn status_error(code: u16, description: String, retry_after: Option<u64>) -> TransportError {
    match code {
        401 | 404 => TransportError::Unauthorized,
        429 => TransportError::RateLimited { retry_after },
        _ => TransportError::Api { code, description },
    }
}

// TelegramClient does not derive Debug; the token must never be printed.

impl TelegramClient {
    async fn send(
        &self,
        chat: &ChatTarget,
        text: &str,
        format: TextFormat,
        keyboard: Option<&ReplyKeyboard>,
    ) -> Result<(), TransportError> {
        let params = SendMessageRequest {
            chat_id: chat,
            text,
            parse_mode: match format {
                TextFormat::Plain => None,
                TextFormat::Markdown => Some("Markdown"),
            },
            disable_web_page_preview: true,
            reply_markup: keyboard.map(ReplyKeyboardMarkup::from),
        };
        let sent: SentMessage = self
            .call("sendMessage", &params, self.request_timeout)
            .await?;
        tracing::debug!(chat = %chat, message_id = sent.message_id, "message sent");
        Ok(())
    }
}

impl ChatTransport for TelegramClient {
    async fn send_message(
        &self,
        chat: &ChatTarget,
        text: &str,
        format: TextFormat,
    ) -> Result<(), TransportError> {
        self.send(chat, text, format, None).await
    }

    async fn send_with_keyboard(
        &self,
        chat: &ChatTarget,
        text: &str,
        format: TextFormat,
        keyboard: &ReplyKeyboard,
    ) -> Result<(), TransportError> {
        self.send(chat, text, format, Some(keyboard)).await
    }
}
