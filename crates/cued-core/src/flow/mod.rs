//! Flow definitions and the engine that walks them.
//!
//! - `definition` -- static, ordered steps per `FlowKind`
//! - `engine` -- `FlowEngine`, the per-user state machine

pub mod definition;
pub mod engine;

pub use definition::{FieldFormat, FlowDefinition, Step, definition};
pub use engine::{AnswerOutcome, CompletedFlow, FlowEngine, Prompt};
