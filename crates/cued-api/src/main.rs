//! cued entry point.
//!
//! Binary name: `cued`
//!
//! Parses CLI arguments, sets up tracing, then dispatches to the command
//! handler. `cued run` starts the Telegram long-polling loop.

mod cli;
mod runner;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use cued_infra::data_dir::resolve_data_dir;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "cued", &mut std::io::stdout());
        return Ok(());
    }

    let otel = matches!(cli.command, Commands::Run { otel: true });
    let _tracing =
        cued_observe::tracing_setup::init_tracing(cli::log_filter(cli.verbose, cli.quiet), otel)
            .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let data_dir = resolve_data_dir(cli.data_dir.as_deref());

    match cli.command {
        Commands::Run { .. } => cli::run::run(data_dir, cli.quiet).await,

        Commands::Init => cli::setup::init(&data_dir, cli.json).await,

        Commands::Check => {
            let state = AppState::init(data_dir).await?;
            cli::setup::check(&state, cli.json).await
        }

        Commands::Submissions { table, limit } => {
            let state = AppState::init(data_dir).await?;
            cli::submissions::list_submissions(&state, table.into(), limit, cli.json).await
        }

        Commands::Flows => cli::flows::list_flows(cli.json),

        Commands::Completions { .. } => unreachable!("handled above"),
    }
}
