//! `pinbridge serve`: HTTP server, Telegram poller and event consumer.

use std::sync::Arc;
use std::time::Duration;

use pinbridge_core::consumer::EventConsumer;
use pinbridge_infra::telegram::{TelegramError, TelegramPoller};
use pinbridge_types::config::AppConfig;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::http;
use crate::state::AppState;

/// Run until Ctrl+C or SIGTERM. The database pool is closed on every exit
/// path, including startup failures.
pub async fn serve(state: AppState, config: &AppConfig, bind: Option<String>) -> anyhow::Result<()> {
    let result = run_services(&state, config, bind).await;
    state.db_pool.close().await;
    result
}

async fn run_services(
    state: &AppState,
    config: &AppConfig,
    bind: Option<String>,
) -> anyhow::Result<()> {
    let recovered = state.reconciler.recover_pending().await?;
    if recovered > 0 {
        info!(recovered, "Finished sessions interrupted by a previous run");
    }

    let addr = bind.unwrap_or_else(|| config.server.bind_addr.clone());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Built before any task is spawned so a bad config leaves nothing running.
    let poller = match TelegramPoller::from_config(&config.telegram) {
        Ok(poller) => Some(poller),
        Err(TelegramError::MissingToken) => {
            warn!("No Telegram token configured, poller disabled");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let cancel = CancellationToken::new();
    let (events_tx, events_rx) = mpsc::channel(config.consumer.channel_capacity.max(1));

    let consumer = EventConsumer::new(
        Arc::clone(&state.reconciler),
        Duration::from_secs(config.consumer.event_timeout_secs),
    );
    let consumer_task = tokio::spawn({
        let cancel = cancel.clone();
        async move { consumer.run(events_rx, cancel).await }
    });

    let poller_task =
        poller.map(|poller| tokio::spawn(poller.run(events_tx.clone(), cancel.clone())));

    info!(%addr, "pinbridge API listening");

    let router = http::router::build_router(state.clone());
    let served = axum::serve(listener, router)
        .with_graceful_shutdown({
            let cancel = cancel.clone();
            async move {
                shutdown_signal().await;
                info!("Shutdown signal received");
                cancel.cancel();
            }
        })
        .await;

    cancel.cancel();
    drop(events_tx);

    if let Some(task) = poller_task {
        task.await?;
    }
    let stats = consumer_task.await?;
    info!(handled = stats.handled, failed = stats.failed, "Server stopped");

    served?;
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
