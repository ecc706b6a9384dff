//! `cued flows`: print the questions each flow asks.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use cued_core::flow::{FieldFormat, Step, definition};
use cued_core::validate::Validator;
use cued_types::flow::FlowKind;

fn rule_label(step: &Step) -> &'static str {
    match (step.effective_validator(), step.format) {
        (Validator::Email, _) => "email",
        (Validator::Phone, _) => "phone",
        (Validator::NonEmpty, FieldFormat::Link) => "link",
        (Validator::NonEmpty, FieldFormat::Plain) => "text",
    }
}

pub fn list_flows(json: bool) -> Result<()> {
    if json {
        let flows: Vec<_> = FlowKind::ALL
            .iter()
            .map(|kind| {
                let def = definition(*kind);
                serde_json::json!({
                    "kind": kind,
                    "command": format!("/{}", def.command),
                    "title": def.title,
                    "table": def.table,
                    "steps": def.steps.iter().map(|s| serde_json::json!({
                        "field": s.field_name,
                        "prompt": s.prompt,
                        "validator": s.effective_validator(),
                        "link": s.format == FieldFormat::Link,
                        "max_chars": s.max_chars,
                    })).collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&flows)?);
        return Ok(());
    }

    for kind in FlowKind::ALL {
        let def = definition(kind);
        println!();
        println!(
            "  {} {}  {}  {}",
            style("▸").bold(),
            style(def.title).bold(),
            style(format!("/{}", def.command)).cyan(),
            style(format!("→ {}", def.table)).dim()
        );

        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("#").fg(Color::White),
            Cell::new("Field").fg(Color::White),
            Cell::new("Question").fg(Color::White),
            Cell::new("Rule").fg(Color::White),
            Cell::new("Max").fg(Color::White),
        ]);
        for step in def.steps {
            let rule = rule_label(step);
            let rule_cell = match rule {
                "email" | "phone" => Cell::new(rule).fg(Color::Yellow),
                _ => Cell::new(rule).fg(Color::DarkGrey),
            };
            table.add_row(vec![
                Cell::new(step.index + 1),
                Cell::new(step.field_name).fg(Color::Cyan),
                Cell::new(step.prompt),
                rule_cell,
                Cell::new(step.max_chars).fg(Color::DarkGrey),
            ]);
        }
        println!("{table}");
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_labels() {
        let job = definition(FlowKind::JobPosting);
        let labels: Vec<_> = job.steps.iter().map(rule_label).collect();
        assert_eq!(labels[8], "email");
        assert_eq!(labels[9], "phone");
        assert_eq!(labels[0], "text");

        let applicant = definition(FlowKind::Applicant);
        assert_eq!(rule_label(&applicant.steps[5]), "link");
    }
}
