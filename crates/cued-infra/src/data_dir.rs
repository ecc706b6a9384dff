//! Data directory resolution.
//!
//! Everything cued writes (`config.json`, `settings.toml`, the SQLite
//! database and the PID file) lives in one directory.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CUED_DATA_DIR";

/// Resolve the data directory.
///
/// Priority:
/// 1. Explicit override (the `--data-dir` flag)
/// 2. `CUED_DATA_DIR` environment variable
/// 3. `~/.cued`
/// 4. `./.cued` when no home directory is known
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".cued");
    }

    PathBuf::from(".cued")
}

/// Create the data directory if needed.
pub async fn ensure_data_dir(dir: &Path) -> Result<(), std::io::Error> {
    tokio::fs::create_dir_all(dir).await
}
