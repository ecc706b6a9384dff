//! Static flow definitions.
//!
//! Each `FlowKind` maps to a fixed, ordered list of steps. Steps are data:
//! the engine walks them by index and never branches on flow-specific
//! logic.

use cued_types::flow::FlowKind;
use cued_types::submission::RecordTable;

use crate::validate::{ValidationOutcome, Validator, validate};

/// Longest accepted answer for short fields, in characters.
pub const SHORT_ANSWER_CHARS: usize = 200;
/// Longest accepted answer for free-text fields.
pub const LONG_ANSWER_CHARS: usize = 1500;
/// Longest accepted link.
pub const LINK_ANSWER_CHARS: usize = 500;

/// How a field is rendered in the broadcast message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    Plain,
    /// Rendered as a Markdown `[Click Here](url)` link.
    Link,
}

/// One prompt within a flow.
#[derive(Debug)]
pub struct Step {
    pub index: usize,
    pub field_name: &'static str,
    pub prompt: &'static str,
    /// `None` means any non-blank answer.
    pub validator: Option<Validator>,
    pub format: FieldFormat,
    /// Longest accepted answer, in characters after trimming.
    pub max_chars: usize,
}

impl Step {
    /// The validator applied to this step's answers.
    pub fn effective_validator(&self) -> Validator {
        self.validator.unwrap_or(Validator::NonEmpty)
    }

    /// Check `answer` against the length limit, then the format rule.
    pub fn check(&self, answer: &str) -> ValidationOutcome {
        let len = answer.trim().chars().count();
        if len > self.max_chars {
            return ValidationOutcome::Rejected {
                reason: format!(
                    "Please keep this answer under {} characters (yours has {len}).",
                    self.max_chars
                ),
            };
        }
        validate(self.effective_validator(), answer)
    }
}

/// Read-only description of one flow.
#[derive(Debug)]
pub struct FlowDefinition {
    pub kind: FlowKind,
    /// Command (without the slash) that starts this flow.
    pub command: &'static str,
    pub title: &'static str,
    /// Sent once before the first prompt.
    pub intro: &'static str,
    /// First line of the broadcast message.
    pub heading: &'static str,
    /// Sent to the user after submission.
    pub completion_message: &'static str,
    pub table: RecordTable,
    pub steps: &'static [Step],
}

impl FlowDefinition {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, index: usize) -> Option<&'static Step> {
        self.steps.get(index)
    }

    /// Field names in declared order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps.iter().map(|s| s.field_name)
    }
}

const fn plain(index: usize, field_name: &'static str, prompt: &'static str) -> Step {
    Step {
        index,
        field_name,
        prompt,
        validator: None,
        format: FieldFormat::Plain,
        max_chars: SHORT_ANSWER_CHARS,
    }
}

const fn long(index: usize, field_name: &'static str, prompt: &'static str) -> Step {
    Step {
        index,
        field_name,
        prompt,
        validator: None,
        format: FieldFormat::Plain,
        max_chars: LONG_ANSWER_CHARS,
    }
}

const fn link(index: usize, field_name: &'static str, prompt: &'static str) -> Step {
    Step {
        index,
        field_name,
        prompt,
        validator: None,
        format: FieldFormat::Link,
        max_chars: LINK_ANSWER_CHARS,
    }
}

const fn checked(
    index: usize,
    field_name: &'static str,
    prompt: &'static str,
    validator: Validator,
) -> Step {
    Step {
        index,
        field_name,
        prompt,
        validator: Some(validator),
        format: FieldFormat::Plain,
        max_chars: SHORT_ANSWER_CHARS,
    }
}

static APPLICANT_STEPS: [Step; 7] = [
    plain(0, "Full Name", "What is your full name?"),
    plain(1, "Age", "What is your age?"),
    plain(2, "Highest Qualification", "What is your highest qualification?"),
    long(3, "Skills", "What skills do you possess?"),
    long(
        4,
        "Experience",
        "What is your relevant work experience? (mention role and duration)",
    ),
    link(
        5,
        "Resume Link",
        "Provide a link to your resume/CV on Google Drive or any other cloud storage (e.g., Dropbox).",
    ),
    link(6, "LinkedIn Profile", "Provide a link to your LinkedIn profile."),
];

static RECRUITER_STEPS: [Step; 7] = [
    plain(0, "Full Name", "What is your full name?"),
    plain(1, "Company Name", "What is your company name?"),
    plain(2, "Designation", "What is your designation at the company?"),
    link(3, "Company Website", "Provide a link to your company website."),
    long(4, "Hiring For", "Which roles are you usually hiring for?"),
    plain(5, "Location", "Where is your company located?"),
    link(6, "LinkedIn Profile", "Provide a link to your LinkedIn profile."),
];

static JOB_POSTING_STEPS: [Step; 10] = [
    plain(0, "Company Name", "What is your company name?"),
    plain(1, "Job Role", "Which specific role are you looking to fill?"),
    plain(
        2,
        "Job Type",
        "What type of position is it? (full-time, part-time, contract, internship)",
    ),
    plain(3, "Location", "Where is the job located? (city, or remote)"),
    plain(4, "Experience Required", "How much experience is required?"),
    long(5, "Skills Required", "Which skills are required for this role?"),
    plain(
        6,
        "Salary Range",
        "What is the budget or salary range for this position?",
    ),
    long(7, "Job Description", "Briefly describe the job."),
    checked(
        8,
        "Contact Email",
        "Could you provide a contact email for communication?",
        Validator::Email,
    ),
    checked(
        9,
        "Contact Phone",
        "Could you provide a contact phone number? (e.g. 123-456-7890)",
        Validator::Phone,
    ),
];

static APPLICANT: FlowDefinition = FlowDefinition {
    kind: FlowKind::Applicant,
    command: "apply",
    title: "Applicant profile",
    intro: "After submission, your details will be reviewed by recruiters. Use /help for more info.",
    heading: "Applicant Information:",
    completion_message: "Thank you. Your application has been submitted. Recruiters will review your details.",
    table: RecordTable::Profiles,
    steps: &APPLICANT_STEPS,
};

static RECRUITER: FlowDefinition = FlowDefinition {
    kind: FlowKind::Recruiter,
    command: "recruit",
    title: "Recruiter profile",
    intro: "After submission, your recruiter profile will be shared on the jobs channel. Use /help for more info.",
    heading: "Recruiter Information:",
    completion_message: "Thank you. Your recruiter profile has been submitted. Use /postjob to post a job.",
    table: RecordTable::Profiles,
    steps: &RECRUITER_STEPS,
};

static JOB_POSTING: FlowDefinition = FlowDefinition {
    kind: FlowKind::JobPosting,
    command: "postjob",
    title: "Job posting",
    intro: "After submission, the job will be displayed on the jobs channel.",
    heading: "New Job Opening:",
    completion_message: "Thank you. Your job has been submitted and will be displayed on the jobs channel.",
    table: RecordTable::JobPostings,
    steps: &JOB_POSTING_STEPS,
};

/// The definition for `kind`.
pub fn definition(kind: FlowKind) -> &'static FlowDefinition {
    match kind {
        FlowKind::Applicant => &APPLICANT,
        FlowKind::Recruiter => &RECRUITER,
        FlowKind::JobPosting => &JOB_POSTING,
    }
}

/// The definition started by `/command`, if any.
pub fn definition_for_command(command: &str) -> Option<&'static FlowDefinition> {
    FlowKind::ALL
        .into_iter()
        .map(definition)
        .find(|def| def.command.eq_ignore_ascii_case(command))
}
