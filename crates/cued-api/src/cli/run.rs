//! `cued run`: start the bot.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use console::style;
use tokio_util::sync::CancellationToken;

use cued_infra::config::load_bot_config;
use cued_infra::pidfile::PidFile;
use cued_infra::telegram::TelegramClient;
use cued_types::error::{ConfigError, TransportError};

use crate::runner::{cancel_on_signal, run_polling};
use crate::state::AppState;

const TOKEN_HELP: &str = "Open config.json in the data directory and replace the value 0 of \
     Telegram-Bot-Token with the token you received from @BotFather.";

/// Run the bot until a shutdown signal arrives.
///
/// A missing or unfilled `config.json` is not an error: the template is
/// written, instructions are logged and the command exits successfully.
pub async fn run(data_dir: PathBuf, quiet: bool) -> Result<()> {
    let state = AppState::init(data_dir).await?;

    let config = match load_bot_config(&state.data_dir).await {
        Ok(config) => config,
        Err(ConfigError::TemplateCreated { path }) => {
            tracing::info!(path = %path, "config template created. {TOKEN_HELP}");
            return Ok(());
        }
        Err(ConfigError::MissingToken { path }) => {
            tracing::info!(path = %path, "{TOKEN_HELP}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let _pid = PidFile::acquire(&state.data_dir)?;

    let client = Arc::new(TelegramClient::new(config.token, state.request_timeout())?);
    match client.get_me().await {
        Ok(me) => tracing::info!(
            bot = me.username.as_deref().unwrap_or(&me.first_name),
            "connected to Telegram"
        ),
        Err(TransportError::Unauthorized) => {
            anyhow::bail!("Telegram rejected the bot token. {TOKEN_HELP}");
        }
        // Polling retries transient failures on its own.
        Err(e) => tracing::warn!(error = %e, "could not reach Telegram yet"),
    }

    let dispatcher = state.dispatcher(config.channel, config.operator, client.clone());

    if !quiet {
        println!(
            "  {} cued is running (data dir {})",
            style("⚡").bold(),
            style(state.data_dir.display()).cyan()
        );
        println!("  {}", style("Press Ctrl+C to stop").dim());
    }

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    let result = run_polling(
        client.as_ref(),
        &dispatcher,
        state.settings.poll_timeout_secs,
        shutdown,
    )
    .await;

    state.db_pool.close().await;

    let summary = result?;
    if !quiet {
        println!(
            "\n  Stopped after {} updates ({} submissions).",
            summary.updates, summary.submissions
        );
    }
    Ok(())
}
