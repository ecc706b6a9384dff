//! Flow kinds and per-user conversation state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::chat::UserId;

/// The guided question/answer interactions a user can run.
///
/// Flows are mutually exclusive per active conversation, but distinct
/// users may run different or identical flows concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    /// Job seeker profile.
    Applicant,
    /// Recruiter self-profile.
    Recruiter,
    /// Job details posted by a recruiter.
    JobPosting,
}

impl FlowKind {
    pub const ALL: [FlowKind; 3] = [FlowKind::Applicant, FlowKind::Recruiter, FlowKind::JobPosting];
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowKind::Applicant => write!(f, "applicant"),
            FlowKind::Recruiter => write!(f, "recruiter"),
            FlowKind::JobPosting => write!(f, "job_posting"),
        }
    }
}

impl FromStr for FlowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "applicant" => Ok(FlowKind::Applicant),
            "recruiter" => Ok(FlowKind::Recruiter),
            "job_posting" | "job-posting" => Ok(FlowKind::JobPosting),
            other => Err(format!("invalid flow kind: '{other}'")),
        }
    }
}

/// Progress of one user through one flow instance.
///
/// Invariant: `answers.len() == step_index`, and `step_index` never
/// exceeds the flow's step count. The state is removed from the store as
/// soon as the last answer is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub user: UserId,
    pub kind: FlowKind,
    /// Accepted answers in step order.
    pub answers: Vec<String>,
    /// Index of the step awaiting input.
    pub step_index: usize,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationState {
    /// Fresh state at step 0.
    pub fn new(user: UserId, kind: FlowKind) -> Self {
        let now = Utc::now();
        Self {
            user,
            kind,
            answers: Vec::new(),
            step_index: 0,
            started_at: now,
            updated_at: now,
        }
    }

    /// Record an accepted answer and advance to the next step.
    pub fn push_answer(&mut self, answer: String) {
        self.answers.push(answer);
        self.step_index += 1;
        self.updated_at = Utc::now();
    }
}

/// Observable state of a user in the flow state machine.
///
/// `Complete` is never observable: a finished conversation is removed
/// immediately, which reads back as `NotStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlowStatus {
    NotStarted,
    AwaitingStep {
        kind: FlowKind,
        index: usize,
        of: usize,
    },
}
