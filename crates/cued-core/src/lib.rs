//! Conversation flows, submission handling and port traits for cued.
//!
//! This crate defines the "ports" (record store and chat transport traits)
//! that the infrastructure layer implements. It depends only on `cued-types`
//! -- never on `cued-infra` or any database/IO crate.

pub mod conversation;
pub mod dispatch;
pub mod flow;
pub mod repository;
pub mod submission;
pub mod transport;
pub mod validate;

#[cfg(test)]
mod test_support;
