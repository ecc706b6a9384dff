//! Answer format validators.
//!
//! Pure, deterministic checks applied to a step's answer before it is
//! recorded. Patterns must match the whole (trimmed) answer; partial
//! matches are rejected.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `local@domain.tld`: ASCII local part, dot-separated domain labels,
/// final label of at least two letters.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$").unwrap()
});

/// North-American number: optional parentheses around the area code,
/// optional `-`, `.` or space separators.
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\(\d{3}\)|\d{3})[-. ]?\d{3}[-. ]?\d{4}$").unwrap());

/// Format rule attached to a flow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    /// Any non-blank text.
    NonEmpty,
    Email,
    Phone,
}

/// Result of validating one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    Rejected { reason: String },
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted)
    }

    /// The rejection reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Accepted => None,
            ValidationOutcome::Rejected { reason } => Some(reason),
        }
    }
}

/// Check `text` against `kind`.
pub fn validate(kind: Validator, text: &str) -> ValidationOutcome {
    let text = text.trim();
    if text.is_empty() {
        return ValidationOutcome::Rejected {
            reason: "The answer cannot be empty.".to_string(),
        };
    }

    match kind {
        Validator::NonEmpty => ValidationOutcome::Accepted,
        Validator::Email if EMAIL_PATTERN.is_match(text) => ValidationOutcome::Accepted,
        Validator::Email => ValidationOutcome::Rejected {
            reason: "That doesn't look like a valid email address (e.g. name@company.com)."
                .to_string(),
        },
        Validator::Phone if PHONE_PATTERN.is_match(text) => ValidationOutcome::Accepted,
        Validator::Phone => ValidationOutcome::Rejected {
            reason: "That doesn't look like a valid phone number (e.g. 123-456-7890).".to_string(),
        },
    }
}
