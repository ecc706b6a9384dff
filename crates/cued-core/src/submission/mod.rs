//! Submission handling for completed flows.
//!
//! - `render` -- build the `SubmissionRecord` and its broadcast text
//! - `handler` -- `SubmissionHandler`, which persists and broadcasts

pub mod handler;
pub mod render;

pub use handler::{SubmissionHandler, SubmissionReport};
pub use render::{build_record, render_broadcast};
