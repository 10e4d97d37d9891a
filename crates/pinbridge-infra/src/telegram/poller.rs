//! `getUpdates` long-poll loop.
//!
//! The bot token is wrapped in [`SecretString`] and only exposed when the
//! request URL is built. It never appears in Debug output or logs.

use std::time::Duration;

use pinbridge_types::config::TelegramConfig;
use pinbridge_types::event::InboundEvent;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::types::{ApiResponse, Update};

/// Pause after a failed `getUpdates` call before polling again.
const ERROR_BACKOFF: Duration = Duration::from_secs(3);

/// Slack added on top of the long-poll timeout for the HTTP client timeout.
const CLIENT_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("telegram token is not configured")]
    MissingToken,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telegram api error: {0}")]
    Api(String),
}

pub struct TelegramPoller {
    client: reqwest::Client,
    token: SecretString,
    api_base: String,
    poll_timeout: Duration,
    offset: i64,
}

impl TelegramPoller {
    pub fn new(token: SecretString, api_base: String, poll_timeout: Duration) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder()
            .timeout(poll_timeout + CLIENT_TIMEOUT_SLACK)
            .build()?;

        Ok(Self {
            client,
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
            poll_timeout,
            offset: 0,
        })
    }

    /// Build a poller from the `[telegram]` config section.
    pub fn from_config(config: &TelegramConfig) -> Result<Self, TelegramError> {
        let token = config.token.clone().ok_or(TelegramError::MissingToken)?;
        Self::new(
            token,
            config.api_base.clone(),
            Duration::from_secs(config.poll_timeout_secs),
        )
    }

    /// Next update id to request.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    fn url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token.expose_secret(), method)
    }

    /// Fetch one batch of updates starting at the current offset.
    pub async fn fetch_updates(&self) -> Result<Vec<Update>, TelegramError> {
        let response: ApiResponse<Vec<Update>> = self
            .client
            .get(self.url("getUpdates"))
            .query(&[
                ("offset", self.offset.to_string()),
                ("timeout", self.poll_timeout.as_secs().to_string()),
                ("allowed_updates", r#"["message"]"#.to_string()),
            ])
            .send()
            .await
            .map_err(|e| TelegramError::Http(e.without_url()))?
            .json()
            .await
            .map_err(|e| TelegramError::Http(e.without_url()))?;

        if !response.ok {
            return Err(TelegramError::Api(
                response
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(response.result.unwrap_or_default())
    }

    /// Poll until `cancel` fires or the consumer side of `events` closes.
    ///
    /// Failed polls are logged and retried after a short pause; this is the
    /// only retry in the system and it belongs to the transport.
    pub async fn run(mut self, events: mpsc::Sender<InboundEvent>, cancel: CancellationToken) {
        info!(api_base = %self.api_base, "Telegram poller started");

        loop {
            let batch = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                batch = self.fetch_updates() => batch,
            };

            let updates = match batch {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "getUpdates failed");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(ERROR_BACKOFF) => continue,
                    }
                }
            };

            for update in updates {
                let update_id = update.update_id;
                if let Some(event) = update.into_event() {
                    debug!(update_id, chat_id = event.chat_id, "Inbound message");
                    let sent = tokio::select! {
                        _ = cancel.cancelled() => false,
                        sent = events.send(event) => sent.is_ok(),
                    };
                    if !sent {
                        info!(offset = self.offset, "Telegram poller stopped");
                        return;
                    }
                }
                self.offset = self.offset.max(update_id + 1);
            }
        }

        info!(offset = self.offset, "Telegram poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;

    /// Fake Bot API: serves one batch for offset 0, then empty batches.
    async fn fake_get_updates(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        if params.get("offset").map(String::as_str) == Some("0") {
            Json(json!({
                "ok": true,
                "result": [
                    {"update_id": 100, "message": {"chat": {"id": 42},
                        "from": {"first_name": "Alice", "username": "alice"}, "text": "/start"}},
                    {"update_id": 101, "message": {"chat": {"id": 42},
                        "from": {"first_name": "Alice", "username": "alice"}, "text": "1234"}}
                ]
            }))
        } else {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Json(json!({"ok": true, "result": []}))
        }
    }

    async fn spawn_fake_api() -> String {
        let app = Router::new().route("/bottest-token/getUpdates", get(fake_get_updates));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_run_forwards_messages_in_order() {
        let base = spawn_fake_api().await;
        let poller = TelegramPoller::new(
            SecretString::from("test-token"),
            base,
            Duration::from_secs(1),
        )
        .unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poller.run(tx, cancel.clone()));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first, InboundEvent::new(42, "alice", "/start"));
        assert_eq!(second, InboundEvent::new(42, "alice", "1234"));

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let app = Router::new().route(
            "/botbad/getUpdates",
            get(|| async { Json(json!({"ok": false, "description": "Unauthorized"})) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let poller = TelegramPoller::new(
            SecretString::from("bad"),
            format!("http://{addr}/"),
            Duration::from_secs(1),
        )
        .unwrap();

        let err = poller.fetch_updates().await.unwrap_err();
        assert!(matches!(err, TelegramError::Api(msg) if msg == "Unauthorized"));
        assert_eq!(poller.offset(), 0);
    }

    #[test]
    fn test_from_config_requires_token() {
        let config = TelegramConfig::default();
        assert!(matches!(
            TelegramPoller::from_config(&config),
            Err(TelegramError::MissingToken)
        ));
    }
}
