//! Infrastructure layer for cued.
//!
//! Implements the ports defined in `cued-core`: the SQLite record store and
//! the Telegram chat transport. Also owns startup concerns: data directory
//! resolution, `config.json`/`settings.toml` loading and the PID file.

pub mod config;
pub mod data_dir;
pub mod pidfile;
pub mod sqlite;
pub mod telegram;
