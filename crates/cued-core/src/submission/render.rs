//! Building and rendering submission records.

use chrono::Utc;
use cued_types::chat::UserId;
use cued_types::submission::{SubmissionField, SubmissionRecord};
use uuid::Uuid;

use crate::flow::{CompletedFlow, FieldFormat, FlowDefinition};

/// Zip the completed answers with the flow's field names.
///
/// `submitter` is the sender's account, which differs from the
/// conversation key when the flow runs in a group.
pub fn build_record(completed: &CompletedFlow, submitter: UserId) -> SubmissionRecord {
    let fields = completed
        .definition()
        .field_names()
        .zip(&completed.state.answers)
        .map(|(name, value)| SubmissionField {
            name: name.to_string(),
            value: value.clone(),
        })
        .collect();

    SubmissionRecord {
        id: Uuid::now_v7(),
        kind: completed.kind(),
        submitter,
        fields,
        submitted_at: Utc::now(),
    }
}

/// Upper bound on a broadcast, in characters. Telegram rejects messages
/// over 4096; the margin covers characters it counts as two UTF-16 units.
pub const MAX_BROADCAST_CHARS: usize = 4000;

/// Shortest a truncated value is cut down to.
const MIN_TRUNCATED_CHARS: usize = 32;

/// Render the channel announcement for `record` (Telegram Markdown).
///
/// One `Label: value` line per field in declared order, below the flow's
/// heading. Link fields holding an http(s) URL become `[Click Here](url)`.
/// When the text would exceed `MAX_BROADCAST_CHARS`, the longest free-text
/// values are cut and end in `…`.
pub fn render_broadcast(def: &FlowDefinition, record: &SubmissionRecord) -> String {
    let heading = format!("*{}*", escape_markdown(def.heading));
    let mut lines: Vec<Line<'_>> = def
        .steps
        .iter()
        .zip(&record.fields)
        .map(|(step, field)| {
            let label = format!("{}: ", escape_markdown(&field.name));
            match step.format {
                FieldFormat::Link if is_http_url(&field.value) => Line {
                    label,
                    value: format!("[Click Here]({})", field.value.replace(')', "%29")),
                    raw: None,
                },
                FieldFormat::Link | FieldFormat::Plain => Line {
                    label,
                    value: escape_markdown(&field.value),
                    raw: Some(&field.value),
                },
            }
        })
        .collect();

    shrink_to_fit(
        &mut lines,
        MAX_BROADCAST_CHARS.saturating_sub(heading.chars().count()),
    );

    let mut out = heading;
    for line in lines {
        out.push('\n');
        out.push_str(&line.label);
        out.push_str(&line.value);
    }
    out
}

/// One rendered `Label: value` line.
struct Line<'a> {
    label: String,
    value: String,
    /// Unescaped answer; `None` for links, which are never cut.
    raw: Option<&'a str>,
}

impl Line<'_> {
    /// Width including the leading newline.
    fn width(&self) -> usize {
        1 + self.label.chars().count() + self.value.chars().count()
    }
}

/// Cap every truncatable value at one shared length so the lines fit in
/// `budget`. Values already under the cap are left whole.
fn shrink_to_fit(lines: &mut [Line<'_>], budget: usize) {
    let total: usize = lines.iter().map(Line::width).sum();
    if total <= budget {
        return;
    }

    let value_len = |line: &Line<'_>| line.value.chars().count();
    let fixed: usize = lines
        .iter()
        .map(|line| match line.raw {
            Some(_) => line.width() - value_len(line),
            None => line.width(),
        })
        .sum();
    let mut lengths: Vec<usize> = lines
        .iter()
        .filter(|line| line.raw.is_some())
        .map(value_len)
        .collect();
    lengths.sort_unstable();

    let mut available = budget.saturating_sub(fixed);
    let mut remaining = lengths.len();
    let mut cap = usize::MAX;
    for len in lengths {
        if len * remaining <= available {
            available -= len;
            remaining -= 1;
        } else {
            cap = (available / remaining).max(MIN_TRUNCATED_CHARS);
            break;
        }
    }

    for line in lines.iter_mut() {
        if let Some(raw) = line.raw {
            if line.value.chars().count() > cap {
                line.value = escape_truncated(raw, cap);
            }
        }
    }
}

fn is_http_url(value: &str) -> bool {
    (value.starts_with("https://") || value.starts_with("http://"))
        && !value.chars().any(char::is_whitespace)
}

fn needs_escape(c: char) -> bool {
    matches!(c, '_' | '*' | '`' | '[')
}

/// Escape the characters legacy Telegram Markdown treats as entities.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if needs_escape(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape `text`, keeping at most `max_chars` characters including the
/// trailing `…`. Never splits an escape sequence.
fn escape_truncated(text: &str, max_chars: usize) -> String {
    let limit = max_chars.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let width = if needs_escape(c) { 2 } else { 1 };
        if used + width > limit {
            break;
        }
        if needs_escape(c) {
            out.push('\\');
        }
        out.push(c);
        used += width;
    }
    let mut out = out.trim_end().to_string();
    out.push('…');
    out
}
