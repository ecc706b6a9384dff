//! `cued submissions`: list stored records.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use cued_core::repository::RecordStore;
use cued_types::submission::{RecordTable, SubmissionRecord};

use crate::state::AppState;

/// Longest summary cell before truncation.
const SUMMARY_WIDTH: usize = 60;

pub async fn list_submissions(
    state: &AppState,
    table: RecordTable,
    limit: i64,
    json: bool,
) -> Result<()> {
    let store = state.record_store();
    let records = store.list(table, Some(limit)).await?;
    let total = store.count(table).await?;

    if json {
        let out = serde_json::json!({
            "table": table,
            "total": total,
            "records": records,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if records.is_empty() {
        println!();
        println!("  No submissions in {} yet.", style(table).cyan());
        println!();
        return Ok(());
    }

    let mut out = Table::new();
    out.load_preset(presets::UTF8_FULL_CONDENSED);
    out.set_content_arrangement(ContentArrangement::Dynamic);
    out.set_header(vec![
        Cell::new("Submitted").fg(Color::White),
        Cell::new("Flow").fg(Color::White),
        Cell::new("From").fg(Color::White),
        Cell::new("Summary").fg(Color::White),
    ]);

    for record in &records {
        out.add_row(vec![
            Cell::new(record.submitted_at.format("%Y-%m-%d %H:%M")).fg(Color::DarkGrey),
            Cell::new(record.kind).fg(Color::Cyan),
            Cell::new(record.submitter),
            Cell::new(summary(record)),
        ]);
    }

    println!();
    println!("{out}");
    println!(
        "  {}",
        style(format!("Showing {} of {} in {}", records.len(), total, table)).dim()
    );
    println!();
    Ok(())
}

/// First few answers joined, truncated for the table.
fn summary(record: &SubmissionRecord) -> String {
    let joined = record
        .fields
        .iter()
        .take(3)
        .map(|f| f.value.as_str())
        .collect::<Vec<_>>()
        .join(" · ");
    if joined.chars().count() > SUMMARY_WIDTH {
        let cut: String = joined.chars().take(SUMMARY_WIDTH - 1).collect();
        format!("{cut}…")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cued_types::chat::UserId;
    use cued_types::flow::FlowKind;
    use cued_types::submission::SubmissionField;

    fn record(values: &[&str]) -> SubmissionRecord {
        SubmissionRecord {
            id: uuid::Uuid::now_v7(),
            kind: FlowKind::JobPosting,
            submitter: UserId(1),
            fields: values
                .iter()
                .enumerate()
                .map(|(i, v)| SubmissionField {
                    name: format!("f{i}"),
                    value: v.to_string(),
                })
                .collect(),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_takes_first_three_answers() {
        let r = record(&["Acme", "Welder", "full-time", "Remote"]);
        assert_eq!(summary(&r), "Acme · Welder · full-time");
    }

    #[test]
    fn test_summary_truncates_long_text() {
        let long = "x".repeat(200);
        let r = record(&[&long]);
        let s = summary(&r);
        assert_eq!(s.chars().count(), SUMMARY_WIDTH);
        assert!(s.ends_with('…'));
    }
}
