//! Submission records produced when a flow completes.
//!
//! A `SubmissionRecord` is written once to the record store and rendered
//! once to the broadcast channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::chat::UserId;
use crate::flow::FlowKind;

/// Logical table a record is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordTable {
    /// Applicant and recruiter profiles.
    Profiles,
    JobPostings,
}

impl RecordTable {
    /// Physical table name in the record store.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordTable::Profiles => "profiles",
            RecordTable::JobPostings => "job_postings",
        }
    }
}

impl fmt::Display for RecordTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "profiles" => Ok(RecordTable::Profiles),
            "job_postings" | "job-postings" => Ok(RecordTable::JobPostings),
            other => Err(format!("invalid record table: '{other}'")),
        }
    }
}

/// One named answer in a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionField {
    pub name: String,
    pub value: String,
}

/// A finalized submission: field name to answer, in flow-definition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub kind: FlowKind,
    pub submitter: UserId,
    /// Ordered as the flow declares its steps.
    pub fields: Vec<SubmissionField>,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Look up a field value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}
