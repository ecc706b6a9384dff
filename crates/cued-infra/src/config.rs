//! Configuration loaders for cued.
//!
//! Two files live in the data directory:
//!
//! - `config.json` holds the bot credentials (`Telegram-Bot-Token`,
//!   `Channel-Id`, optional `Operator-Chat-Id`). It is required; when it is
//!   missing a template is written and startup stops so the operator can
//!   fill it in.
//! - `settings.toml` holds tunables ([`Settings`]). It is optional and falls
//!   back to defaults when missing or malformed.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

use cued_types::chat::ChatTarget;
use cued_types::config::Settings;
use cued_types::error::ConfigError;

pub const CONFIG_FILE: &str = "config.json";
pub const SETTINGS_FILE: &str = "settings.toml";

/// Credentials and destinations from `config.json`.
#[derive(Debug)]
pub struct BotConfig {
    pub token: SecretString,
    /// Broadcast channel. `None` when unset; broadcasts then fail and are logged.
    pub channel: Option<ChatTarget>,
    /// Chat notified when a submission cannot be persisted.
    pub operator: Option<ChatTarget>,
}

/// On-disk shape. Values are loose JSON because operators write both
/// numbers and strings, and `0` means "not set".
#[derive(Deserialize)]
struct RawBotConfig {
    #[serde(rename = "Telegram-Bot-Token", default)]
    token: Value,
    #[serde(rename = "Channel-Id", default)]
    channel: Value,
    #[serde(rename = "Operator-Chat-Id", default)]
    operator: Value,
}

fn template() -> Value {
    serde_json::json!({
        "Telegram-Bot-Token": 0,
        "Channel-Id": 0,
        "Operator-Chat-Id": 0,
    })
}

/// Path of `config.json` in `data_dir`.
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Write the `config.json` template unless the file already exists.
///
/// Returns `true` when a template was written.
pub async fn write_config_template(data_dir: &Path) -> Result<bool, ConfigError> {
    let path = config_path(data_dir);
    if tokio::fs::try_exists(&path).await.map_err(|e| io_error(&path, e))? {
        return Ok(false);
    }

    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| io_error(data_dir, e))?;
    let body = serde_json::to_string_pretty(&template())
        .map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    tokio::fs::write(&path, body)
        .await
        .map_err(|e| io_error(&path, e))?;
    Ok(true)
}

/// Load `config.json` from `data_dir`.
///
/// - Missing file: a template is written and `ConfigError::TemplateCreated`
///   is returned.
/// - Token unset (`0`, empty or absent): `ConfigError::MissingToken`.
/// - Channel unset: loads, with a warning.
pub async fn load_bot_config(data_dir: &Path) -> Result<BotConfig, ConfigError> {
    let path = config_path(data_dir);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            write_config_template(data_dir).await?;
            return Err(ConfigError::TemplateCreated {
                path: path.display().to_string(),
            });
        }
        Err(err) => return Err(io_error(&path, err)),
    };

    let config = parse_bot_config(&content, &path)?;
    if config.channel.is_none() {
        tracing::warn!(
            "Channel-Id is not set in {}; submissions will be stored but not broadcast",
            path.display()
        );
    }
    Ok(config)
}

fn parse_bot_config(content: &str, path: &Path) -> Result<BotConfig, ConfigError> {
    let raw: RawBotConfig = serde_json::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let token = match &raw.token {
        Value::String(s) if !is_unset(s) => SecretString::from(s.trim().to_string()),
        _ => {
            return Err(ConfigError::MissingToken {
                path: path.display().to_string(),
            });
        }
    };

    Ok(BotConfig {
        token,
        channel: chat_target("Channel-Id", &raw.channel)?,
        operator: chat_target("Operator-Chat-Id", &raw.operator)?,
    })
}

fn is_unset(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s == "0"
}

fn chat_target(key: &'static str, value: &Value) -> Result<Option<ChatTarget>, ConfigError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(None),
            Some(id) => Ok(Some(ChatTarget::Id(id))),
            None => Err(ConfigError::InvalidValue {
                key,
                message: format!("{n} is not a chat id"),
            }),
        },
        Value::String(s) if is_unset(s) => Ok(None),
        Value::String(s) => s
            .parse()
            .map(Some)
            .map_err(|message| ConfigError::InvalidValue { key, message }),
        other => Err(ConfigError::InvalidValue {
            key,
            message: format!("expected a number or @channel, got {other}"),
        }),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Token with everything but the bot id masked, for `cued check`.
pub fn masked_token(token: &SecretString) -> String {
    match token.expose_secret().split_once(':') {
        Some((bot_id, _)) => format!("{bot_id}:****"),
        None => "****".to_string(),
    }
}

/// Load runtime settings from `{data_dir}/settings.toml`.
///
/// - If the file does not exist, returns [`Settings::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_settings(data_dir: &Path) -> Settings {
    let path = data_dir.join(SETTINGS_FILE);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No settings.toml found at {}, using defaults", path.display());
            return Settings::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return Settings::default();
        }
    };

    match toml::from_str::<Settings>(&content) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn write_config(dir: &TempDir, body: &str) {
        tokio::fs::write(dir.path().join(CONFIG_FILE), body)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_config_writes_template() {
        let tmp = TempDir::new().unwrap();
        let err = load_bot_config(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::TemplateCreated { .. }));

        let written = tokio::fs::read_to_string(tmp.path().join(CONFIG_FILE))
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["Telegram-Bot-Token"], 0);
        assert_eq!(value["Channel-Id"], 0);

        // The template itself has no token yet.
        let err = load_bot_config(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken { .. }));
    }

    #[tokio::test]
    async fn template_is_not_overwritten() {
        let tmp = TempDir::new().unwrap();
        write_config(&tmp, r#"{"Telegram-Bot-Token": "1:abc", "Channel-Id": 5}"#).await;
        assert!(!write_config_template(tmp.path()).await.unwrap());
        assert!(load_bot_config(tmp.path()).await.is_ok());
    }

    #[tokio::test]
    async fn numeric_and_username_channels() {
        let tmp = TempDir::new().unwrap();
        write_config(
            &tmp,
            r#"{"Telegram-Bot-Token": "123:abc", "Channel-Id": -1001234, "Operator-Chat-Id": "@ops_team"}"#,
        )
        .await;
        let config = load_bot_config(tmp.path()).await.unwrap();
        assert_eq!(config.token.expose_secret(), "123:abc");
        assert_eq!(config.channel, Some(ChatTarget::Id(-1001234)));
        assert_eq!(config.operator, Some(ChatTarget::Username("@ops_team".to_string())));
    }

    #[tokio::test]
    async fn zero_channel_means_unset() {
        let tmp = TempDir::new().unwrap();
        write_config(&tmp, r#"{"Telegram-Bot-Token": "123:abc", "Channel-Id": 0}"#).await;
        let config = load_bot_config(tmp.path()).await.unwrap();
        assert!(config.channel.is_none());
        assert!(config.operator.is_none());
    }

    #[tokio::test]
    async fn invalid_channel_is_rejected() {
        let tmp = TempDir::new().unwrap();
        write_config(&tmp, r#"{"Telegram-Bot-Token": "123:abc", "Channel-Id": "jobs"}"#).await;
        let err = load_bot_config(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "Channel-Id", .. }));
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        write_config(&tmp, "{ not json").await;
        let err = load_bot_config(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn masked_token_keeps_bot_id() {
        assert_eq!(masked_token(&SecretString::from("123:secret")), "123:****");
        assert_eq!(masked_token(&SecretString::from("garbage")), "****");
    }

    #[tokio::test]
    async fn load_settings_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let settings = load_settings(tmp.path()).await;
        assert_eq!(settings.max_active_conversations, 1_000);
        assert_eq!(settings.database_file, "cued.db");
    }

    #[tokio::test]
    async fn load_settings_partial_toml() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(SETTINGS_FILE), "poll_timeout_secs = 50\n")
            .await
            .unwrap();
        let settings = load_settings(tmp.path()).await;
        assert_eq!(settings.poll_timeout_secs, 50);
        assert_eq!(settings.request_timeout_secs, 10);
    }

    #[tokio::test]
    async fn load_settings_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(SETTINGS_FILE), "this is not { valid toml !!!")
            .await
            .unwrap();
        let settings = load_settings(tmp.path()).await;
        assert_eq!(settings.poll_timeout_secs, 30);
    }
}
