//! `cued init` and `cued check`.

use std::path::Path;

use anyhow::Result;
use console::style;

use cued_core::repository::RecordStore;
use cued_infra::config::{config_path, load_bot_config, masked_token, write_config_template};
use cued_infra::telegram::TelegramClient;
use cued_types::submission::RecordTable;

use crate::state::AppState;

/// Write the `config.json` template if it does not exist yet.
pub async fn init(data_dir: &Path, json: bool) -> Result<()> {
    let created = write_config_template(data_dir).await?;
    let path = config_path(data_dir);

    if json {
        let out = serde_json::json!({
            "path": path.display().to_string(),
            "created": created,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    if created {
        println!(
            "  {} Wrote {}",
            style("✓").green().bold(),
            style(path.display()).cyan()
        );
        println!("    Fill in Telegram-Bot-Token and Channel-Id, then run `cued check`.");
    } else {
        println!(
            "  {} {} already exists; left untouched.",
            style("•").dim(),
            style(path.display()).cyan()
        );
    }
    println!();
    Ok(())
}

/// Validate the configuration and reach Telegram with the token.
pub async fn check(state: &AppState, json: bool) -> Result<()> {
    let path = config_path(&state.data_dir);
    let config_exists = tokio::fs::try_exists(&path).await.unwrap_or(false);

    let mut config_error = None;
    let mut token_mask = None;
    let mut channel = None;
    let mut operator = None;
    let mut bot = None;
    if config_exists {
        match load_bot_config(&state.data_dir).await {
            Ok(config) => {
                token_mask = Some(masked_token(&config.token));
                channel = config.channel;
                operator = config.operator;
                let client = TelegramClient::new(config.token, state.request_timeout())?;
                bot = Some(client.get_me().await);
            }
            Err(e) => config_error = Some(e.to_string()),
        }
    }

    let records = state.record_store();
    let profiles = records.count(RecordTable::Profiles).await?;
    let job_postings = records.count(RecordTable::JobPostings).await?;

    let config_ok = token_mask.is_some();
    let token_ok = matches!(bot, Some(Ok(_)));
    let bot_name = match &bot {
        Some(Ok(me)) => Some(me.username.clone().unwrap_or_else(|| me.first_name.clone())),
        _ => None,
    };

    if json {
        let out = serde_json::json!({
            "data_dir": state.data_dir.display().to_string(),
            "config_exists": config_exists,
            "config_valid": config_ok,
            "config_error": config_error,
            "token_valid": token_ok,
            "bot_username": bot_name,
            "channel": channel.as_ref().map(ToString::to_string),
            "operator": operator.as_ref().map(ToString::to_string),
            "settings": state.settings,
            "submissions": {
                "profiles": profiles,
                "job_postings": job_postings,
            },
            "healthy": config_ok && token_ok && channel.is_some(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mark = |ok: bool| {
        if ok {
            format!("{}", style("✓").green())
        } else {
            format!("{}", style("✗").red())
        }
    };

    println!();
    println!(
        "  {} cued v{} health check",
        style("🔍").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("  {}", style("── Configuration ──").dim());
    println!("  {} config.json at {}", mark(config_exists), style(path.display()).dim());
    if let Some(e) = &config_error {
        println!("  {} {}", mark(false), style(e).red());
    } else if !config_exists {
        println!("    Run `cued init` to create it.");
    }
    if let Some(mask) = &token_mask {
        println!("  {} Token {}", mark(true), style(mask).dim());
        match &channel {
            Some(channel) => println!("  {} Channel {}", mark(true), style(channel).cyan()),
            None => println!(
                "  {} Channel-Id not set; submissions will not be broadcast",
                mark(false)
            ),
        }
        if let Some(operator) = &operator {
            println!("  {} Operator chat {}", mark(true), style(operator).cyan());
        }
    }
    println!();

    println!("  {}", style("── Telegram ──").dim());
    match (&bot, &bot_name) {
        (Some(Ok(_)), Some(name)) => {
            println!("  {} Connected as @{}", mark(true), style(name).cyan())
        }
        (Some(Err(e)), _) => println!("  {} {}", mark(false), style(e).red()),
        _ => println!("  {} Skipped (no valid configuration)", style("•").dim()),
    }
    println!();

    println!("  {}", style("── Storage ──").dim());
    println!("  Profiles:     {}", style(profiles).bold());
    println!("  Job postings: {}", style(job_postings).bold());
    println!(
        "  Database:     {}",
        style(state.data_dir.join(&state.settings.database_file).display()).dim()
    );
    println!();

    Ok(())
}
