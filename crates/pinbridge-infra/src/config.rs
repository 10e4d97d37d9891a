//! Configuration loader for pinbridge.
//!
//! Reads a TOML file and deserializes it into [`AppConfig`]. Falls back to
//! defaults when the file is missing or malformed, then applies environment
//! overrides.

use std::path::Path;

use pinbridge_types::config::AppConfig;
use secrecy::SecretString;

/// Environment variable that overrides `[telegram] token`.
pub const TELEGRAM_TOKEN_ENV: &str = "PINBRIDGE_TELEGRAM_TOKEN";

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
///
/// In every case a non-empty `PINBRIDGE_TELEGRAM_TOKEN` replaces the token.
pub async fn load_config(path: &Path) -> AppConfig {
    let mut config = read_config_file(path).await;

    if let Some(token) = std::env::var(TELEGRAM_TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
    {
        config.telegram.token = Some(SecretString::from(token));
    }

    config
}

async fn read_config_file(path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinbridge_types::config::{LogFormat, SessionBackend};
    use tempfile::TempDir;

    #[tokio::test]
    async fn read_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config_file(&tmp.path().join("pinbridge.toml")).await;
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.sessions.backend, SessionBackend::Sqlite);
    }

    #[tokio::test]
    async fn read_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("pinbridge.toml");
        tokio::fs::write(
            &path,
            r#"
[logger]
format = "json"

[server]
bind_addr = "0.0.0.0:3000"

[consumer]
event_timeout_secs = 5
"#,
        )
        .await
        .unwrap();

        let config = read_config_file(&path).await;
        assert_eq!(config.logger.format, LogFormat::Json);
        assert_eq!(config.server.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.consumer.event_timeout_secs, 5);
        assert_eq!(config.consumer.channel_capacity, 256);
    }

    #[tokio::test]
    async fn read_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("pinbridge.toml");
        tokio::fs::write(&path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = read_config_file(&path).await;
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert!(config.telegram.token.is_none());
    }
}
