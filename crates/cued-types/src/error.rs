use thiserror::Error;

use crate::flow::FlowKind;

/// Errors from flow engine operations.
///
/// All of these are per-conversation outcomes answered with a clarifying
/// message; none is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("a {active} flow is already in progress (requested {requested})")]
    Conflict { active: FlowKind, requested: FlowKind },

    #[error("no active flow")]
    NoActiveFlow,

    #[error("too many conversations in progress (limit {limit})")]
    CapacityReached { limit: usize },
}

/// Errors from outgoing message delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("bot token rejected")]
    Unauthorized,

    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("API error {code}: {description}")]
    Api { code: u16, description: String },

    #[error("invalid response: {0}")]
    Deserialization(String),
}

/// Errors from repository operations (used by trait definitions in cued-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Failures of the two independent submission side effects.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("failed to persist submission: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("failed to broadcast submission: {0}")]
    Broadcast(#[from] TransportError),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: &'static str, secs: u64 },

    #[error("no broadcast channel configured")]
    NoChannel,
}

/// Errors loading startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("config template written to {path}")]
    TemplateCreated { path: String },

    #[error("Telegram-Bot-Token is missing in {path}")]
    MissingToken { path: String },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}
