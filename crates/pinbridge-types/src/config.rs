//! Application configuration types for pinbridge.
//!
//! `AppConfig` represents the `pinbridge.toml` file that controls logging,
//! the database location, the HTTP bind address, the Telegram poller, and
//! the inbound event consumer.

use secrecy::SecretString;
use serde::Deserialize;

/// Top-level configuration. Every section and field has a default, so an
/// empty file (or no file at all) yields a runnable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logger: LoggerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub consumer: ConsumerConfig,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggerConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset (e.g. "info", "pinbridge=debug").
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Bridge spans to an OpenTelemetry stdout exporter.
    #[serde(default)]
    pub otel: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_log_level(),
            otel: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "sqlite://pinbridge.db?mode=rwc".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token. The poller is disabled when absent.
    #[serde(default)]
    pub token: Option<SecretString>,
    /// Long-poll timeout passed to `getUpdates`.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_poll_timeout_secs() -> u64 {
    60
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            poll_timeout_secs: default_poll_timeout_secs(),
            api_base: default_api_base(),
        }
    }
}

/// Where registration sessions live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionsConfig {
    #[serde(default)]
    pub backend: SessionBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsumerConfig {
    /// Capacity of the inbound event channel between poller and consumer.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Deadline for handling a single event.
    #[serde(default = "default_event_timeout_secs")]
    pub event_timeout_secs: u64,
}

fn default_channel_capacity() -> usize {
    256
}

fn default_event_timeout_secs() -> u64 {
    30
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            event_timeout_secs: default_event_timeout_secs(),
        }
    }
}
