//! The conversation state machine.
//!
//! States per user: `NotStarted` (no entry in the store), `AwaitingStep(i)`
//! for `i` in `0..step_count`, and `Complete`, which is never stored: the
//! entry is removed in the same critical section that accepts the last
//! answer. Transitions happen only inside `start_flow`, `submit_answer`
//! and `cancel`; the engine never does work on its own.

use std::sync::Arc;

use cued_types::chat::UserId;
use cued_types::error::FlowError;
use cued_types::flow::{ConversationState, FlowKind, FlowStatus};

use crate::conversation::{BeginRefused, ConversationStore, Removal, Updated};
use crate::validate::ValidationOutcome;

use super::definition::{FlowDefinition, Step, definition};

/// A question to send to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    pub kind: FlowKind,
    /// Zero-based index of the step being asked.
    pub index: usize,
    /// Total number of steps in the flow.
    pub of: usize,
    pub text: &'static str,
}

impl Prompt {
    fn for_step(def: &FlowDefinition, step: &Step) -> Self {
        Self {
            kind: def.kind,
            index: step.index,
            of: def.step_count(),
            text: step.prompt,
        }
    }
}

/// A flow whose last answer was accepted.
///
/// Holds the state snapshot already removed from the store, so the
/// submission side effects never observe a live entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedFlow {
    pub state: ConversationState,
}

impl CompletedFlow {
    pub fn kind(&self) -> FlowKind {
        self.state.kind
    }

    pub fn user(&self) -> UserId {
        self.state.user
    }

    pub fn definition(&self) -> &'static FlowDefinition {
        definition(self.state.kind)
    }
}

/// Result of feeding one answer to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The answer failed validation; nothing changed. Re-ask `prompt`.
    Rejected { reason: String, prompt: Prompt },
    /// The answer was recorded; ask `prompt` next.
    Next(Prompt),
    /// The answer completed the flow.
    Complete(CompletedFlow),
}

/// Drives users through flow definitions.
///
/// Cheap to clone; clones share the same store.
#[derive(Debug, Clone)]
pub struct FlowEngine {
    store: Arc<ConversationStore>,
}

impl FlowEngine {
    pub fn new(store: Arc<ConversationStore>) -> Self {
        Self { store }
    }

    /// The store backing this engine.
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Begin `kind` for `user` and return its first prompt.
    ///
    /// Restarting the flow already in progress discards its answers and
    /// starts over at step 0. Starting a different flow while one is in
    /// progress is a conflict and leaves the existing state untouched.
    pub fn start_flow(&self, user: UserId, kind: FlowKind) -> Result<Prompt, FlowError> {
        let def = definition(kind);
        let first = def.step(0).ok_or(FlowError::NoActiveFlow)?;

        self.store
            .begin(ConversationState::new(user, kind), |existing| existing.kind == kind)
            .map_err(|refused| match refused {
                BeginRefused::Occupied(existing) => FlowError::Conflict {
                    active: existing.kind,
                    requested: kind,
                },
                BeginRefused::Capacity { limit } => FlowError::CapacityReached { limit },
            })?;

        tracing::debug!(user = %user, flow = %kind, "flow started");
        Ok(Prompt::for_step(def, first))
    }

    /// Record `text` as the answer to the user's current step.
    pub fn submit_answer(&self, user: UserId, text: &str) -> Result<AnswerOutcome, FlowError> {
        let answer = text.trim();

        let updated = self.store.update(user, |state| {
            let def = definition(state.kind);
            let Some(step) = def.step(state.step_index) else {
                // Unreachable while the index invariant holds; drop the
                // corrupt entry rather than leave the user stuck.
                tracing::warn!(user = %user, flow = %state.kind, index = state.step_index, "step index out of range");
                return Removal::Remove(None);
            };

            if let ValidationOutcome::Rejected { reason } = step.check(answer) {
                return Removal::Keep(Some(AnswerOutcome::Rejected {
                    reason,
                    prompt: Prompt::for_step(def, step),
                }));
            }

            state.push_answer(answer.to_string());
            match def.step(state.step_index) {
                Some(next) => Removal::Keep(Some(AnswerOutcome::Next(Prompt::for_step(def, next)))),
                None => Removal::Remove(None),
            }
        });

        match updated {
            None => Err(FlowError::NoActiveFlow),
            Some(Updated::Kept(Some(outcome))) => {
                if let AnswerOutcome::Rejected { prompt, .. } = &outcome {
                    tracing::debug!(user = %user, flow = %prompt.kind, step = prompt.index, "answer rejected");
                }
                Ok(outcome)
            }
            Some(Updated::Removed(state, _)) if state.answers.len() == definition(state.kind).step_count() => {
                tracing::info!(user = %user, flow = %state.kind, "flow complete");
                Ok(AnswerOutcome::Complete(CompletedFlow { state }))
            }
            Some(Updated::Kept(None)) | Some(Updated::Removed(..)) => Err(FlowError::NoActiveFlow),
        }
    }

    /// Abandon the user's conversation, returning the flow it was in.
    pub fn cancel(&self, user: UserId) -> Result<FlowKind, FlowError> {
        let state = self.store.remove(user).ok_or(FlowError::NoActiveFlow)?;
        tracing::debug!(user = %user, flow = %state.kind, answered = state.answers.len(), "flow cancelled");
        Ok(state.kind)
    }

    /// Where the user is in the state machine.
    pub fn status(&self, user: UserId) -> FlowStatus {
        match self.store.get(user) {
            None => FlowStatus::NotStarted,
            Some(state) => FlowStatus::AwaitingStep {
                kind: state.kind,
                index: state.step_index,
                of: definition(state.kind).step_count(),
            },
        }
    }
}
