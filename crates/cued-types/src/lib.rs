//! Shared domain types for cued.
//!
//! This crate contains the types passed between the flow engine, the
//! adapters and the binary: chat identities, flow kinds, conversation
//! state, submission records, settings and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod flow;
pub mod submission;
