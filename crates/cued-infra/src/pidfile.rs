//! Single-instance guard.
//!
//! Starting cued terminates the instance recorded in `cued.pid` (SIGTERM on
//! unix) and records the current process instead. A PID that no longer
//! exists, or a file that does not parse, is simply replaced.

use std::path::{Path, PathBuf};

pub const PID_FILE: &str = "cued.pid";

/// Holds `cued.pid` for the lifetime of the process.
///
/// The file is removed on drop if it still names this process.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    pid: u32,
}

impl PidFile {
    /// Stop any previous instance and claim the PID file in `data_dir`.
    pub fn acquire(data_dir: &Path) -> Result<Self, std::io::Error> {
        let path = data_dir.join(PID_FILE);
        let pid = std::process::id();

        match std::fs::read_to_string(&path) {
            Ok(content) => match content.trim().parse::<i32>() {
                Ok(previous) if previous as u32 != pid => {
                    if terminate(previous) {
                        tracing::info!(pid = previous, "terminated previous instance");
                    } else {
                        tracing::debug!(pid = previous, "no previous instance running");
                    }
                }
                Ok(_) => {}
                Err(_) => tracing::warn!(path = %path.display(), "ignoring unreadable PID file"),
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }

        std::fs::write(&path, format!("{pid}\n"))?;
        Ok(Self { path, pid })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        let ours = std::fs::read_to_string(&self.path)
            .map(|c| c.trim() == self.pid.to_string())
            .unwrap_or(false);
        if ours {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!(error = %e, "failed to remove PID file");
            }
        }
    }
}

/// Send SIGTERM to `pid`. Returns whether the signal was delivered.
///
/// Non-positive ids and init are refused: `kill(0)` and `kill(-1)` address
/// process groups, not a single process.
#[cfg(unix)]
fn terminate(pid: i32) -> bool {
    if pid <= 1 {
        return false;
    }
    // SAFETY: kill(2) has no memory-safety preconditions.
    unsafe { libc::kill(pid, libc::SIGTERM) == 0 }
}

#[cfg(not(unix))]
fn terminate(_pid: i32) -> bool {
    false
}
