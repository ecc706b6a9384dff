//! CLI command definitions for the `cued` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod flows;
pub mod run;
pub mod setup;
pub mod submissions;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use cued_types::submission::RecordTable;

/// Telegram job-board bot: collects applicant profiles, recruiter profiles
/// and job postings through guided conversations.
#[derive(Parser)]
#[command(name = "cued", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (config.json, settings.toml, database, PID file).
    #[arg(long, global = true, env = "CUED_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the bot (long polling until Ctrl+C or SIGTERM).
    Run {
        /// Export tracing spans through OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,
    },

    /// Write a config.json template into the data directory.
    Init,

    /// Validate configuration and test the bot token.
    Check,

    /// List stored submissions.
    #[command(alias = "ls")]
    Submissions {
        /// Which table to list.
        table: TableArg,

        /// Show at most this many records (newest first).
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Show the questions asked by each flow.
    Flows,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Record table as named on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TableArg {
    Profiles,
    JobPostings,
}

impl From<TableArg> for RecordTable {
    fn from(arg: TableArg) -> Self {
        match arg {
            TableArg::Profiles => RecordTable::Profiles,
            TableArg::JobPostings => RecordTable::JobPostings,
        }
    }
}

/// Tracing filter for the verbosity flags.
pub fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "info",
        1 => "info,cued=debug",
        _ => "trace",
    }
}
