//! Chat identities and inbound/outbound message shapes.
//!
//! These types are transport-neutral: the Telegram adapter converts its
//! wire types into `IncomingMessage` and accepts `ChatTarget` +
//! `TextFormat` for outgoing text.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// A Telegram account or chat id.
///
/// As a conversation key it is the chat id, stable for the lifetime of a
/// conversation; as a submitter it is the sender's account id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Destination of an outgoing message.
///
/// Telegram accepts either a numeric chat id or a public `@username` for
/// channels, so both are representable. Deserializes from either a JSON
/// number or a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatTarget {
    Id(i64),
    Username(String),
}

impl From<UserId> for ChatTarget {
    fn from(user: UserId) -> Self {
        ChatTarget::Id(user.0)
    }
}

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatTarget::Id(id) => write!(f, "{id}"),
            ChatTarget::Username(name) => write!(f, "{name}"),
        }
    }
}

impl FromStr for ChatTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("chat target cannot be empty".to_string());
        }
        if let Ok(id) = s.parse::<i64>() {
            return Ok(ChatTarget::Id(id));
        }
        if let Some(name) = s.strip_prefix('@') {
            if !name.is_empty() {
                return Ok(ChatTarget::Username(s.to_string()));
            }
        }
        Err(format!("invalid chat target: '{s}' (expected a number or @username)"))
    }
}

/// Kind of chat an incoming message was posted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl fmt::Display for ChatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatKind::Private => write!(f, "private"),
            ChatKind::Group => write!(f, "group"),
            ChatKind::Supergroup => write!(f, "supergroup"),
            ChatKind::Channel => write!(f, "channel"),
        }
    }
}

/// Formatting applied by the transport when rendering outgoing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextFormat {
    #[default]
    Plain,
    Markdown,
}

/// Custom keyboard shown in place of the text input, one button per label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
    /// Hide the keyboard once a button is pressed.
    pub one_time: bool,
}

impl ReplyKeyboard {
    /// A single row of buttons, hidden after use.
    pub fn one_time_row<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: vec![labels.into_iter().map(Into::into).collect()],
            one_time: true,
        }
    }
}

/// A text message delivered to the bot, already stripped of transport detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Chat the message arrived in; replies go back here.
    pub user: UserId,
    /// Account that sent the message, when the transport reports one.
    pub from: Option<UserId>,
    pub chat_kind: ChatKind,
    pub text: String,
}

impl IncomingMessage {
    /// Build a message from a private chat, where sender and chat coincide.
    pub fn private(user: UserId, text: impl Into<String>) -> Self {
        Self {
            user,
            from: Some(user),
            chat_kind: ChatKind::Private,
            text: text.into(),
        }
    }

    /// Who a submission completed by this message is attributed to.
    pub fn submitter(&self) -> UserId {
        self.from.unwrap_or(self.user)
    }
}
