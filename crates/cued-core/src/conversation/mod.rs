//! Conversation state storage.

pub mod store;

pub use store::{BeginRefused, ConversationStore, Removal, Updated};
