//! Runtime settings for cued.
//!
//! `Settings` represents the optional `settings.toml` in the data
//! directory. The bot token and channel live separately in `config.json`
//! (see `cued-infra::config`).

use serde::{Deserialize, Serialize};

/// Tunable runtime settings.
///
/// Loaded from `{data_dir}/settings.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Upper bound on conversations in progress at once.
    #[serde(default = "default_max_active_conversations")]
    pub max_active_conversations: usize,

    /// Long-poll timeout passed to `getUpdates`.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Bound on each record-store and outgoing-message call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// SQLite file name, relative to the data directory.
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

fn default_max_active_conversations() -> usize {
    1_000
}

fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_database_file() -> String {
    "cued.db".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_active_conversations: default_max_active_conversations(),
            poll_timeout_secs: default_poll_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            database_file: default_database_file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.max_active_conversations, 1_000);
        assert_eq!(settings.poll_timeout_secs, 30);
        assert_eq!(settings.request_timeout_secs, 10);
        assert_eq!(settings.database_file, "cued.db");
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.max_active_conversations, 1_000);
        assert_eq!(settings.database_file, "cued.db");
    }

    #[test]
    fn test_settings_deserialize_partial() {
        let toml_str = r#"
max_active_conversations = 50
request_timeout_secs = 3
"#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.max_active_conversations, 50);
        assert_eq!(settings.request_timeout_secs, 3);
        assert_eq!(settings.poll_timeout_secs, 30);
    }
}
