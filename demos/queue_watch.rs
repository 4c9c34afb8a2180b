//! # Queue Watch Example
//!
//! Demonstrates a complete queue synchronizer lifecycle:
//!
//! 1. Fetch the authoritative queue over REST
//! 2. Subscribe to `queue_updated` broadcasts over WebSocket
//! 3. Optionally submit a player name
//! 4. Print every queue change and connection event
//! 5. Shut down gracefully on Ctrl+C or when reconnection gives up
//!
//! ## Running
//!
//! ```sh
//! # Start the dashboard backend on localhost:5000, then:
//! cargo run --example queue_watch
//!
//! # Override the endpoints and add yourself to the queue:
//! QUEUE_DASHBOARD_URL=http://my-host:5000 \
//! QUEUE_DASHBOARD_WS_URL=ws://my-host:5000/ws \
//! cargo run --example queue_watch -- "My Summoner"
//! ```

use queue_dashboard::error::ADD_PLAYER_FAILED;
use queue_dashboard::{
    HttpBackend, QueueEvent, QueueStatus, QueueSyncConfig, QueueSynchronizer, WebSocketConnector,
};

/// Default REST root when `QUEUE_DASHBOARD_URL` is not set.
const DEFAULT_URL: &str = "http://localhost:5000";

/// Default push-channel URL when `QUEUE_DASHBOARD_WS_URL` is not set.
const DEFAULT_WS_URL: &str = "ws://localhost:5000/ws";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    // Initialize tracing. Set `RUST_LOG=debug` for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Configuration ───────────────────────────────────────────────
    let url = std::env::var("QUEUE_DASHBOARD_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let ws_url =
        std::env::var("QUEUE_DASHBOARD_WS_URL").unwrap_or_else(|_| DEFAULT_WS_URL.to_string());
    let join_as = std::env::args().nth(1);
    tracing::info!("Watching queue at {url} (push channel {ws_url})");

    let config = QueueSyncConfig::new().with_heartbeat_interval(std::time::Duration::from_secs(25));

    // ── Start ───────────────────────────────────────────────────────
    // Spawns the initial fetch and the push-channel loop.
    let (mut sync, mut event_rx) = QueueSynchronizer::start(
        HttpBackend::new(url),
        WebSocketConnector::new(ws_url),
        config,
    );

    if let Some(name) = join_as {
        match sync.add_player(&name).await {
            Ok(message) => tracing::info!("{message}"),
            Err(e) => tracing::warn!("{}", e.user_message_or(ADD_PLAYER_FAILED)),
        }
    }

    // ── Event loop ──────────────────────────────────────────────────
    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else {
                    tracing::info!("Event channel closed, exiting");
                    break;
                };

                match event {
                    QueueEvent::QueueUpdated { players } => {
                        if players.is_empty() {
                            println!("Queue is empty.");
                        }
                        for (position, name) in players.iter().enumerate() {
                            println!("{:>3}. {name}", position + 1);
                        }
                    }
                    QueueEvent::StatusChanged(QueueStatus::Error(message)) => {
                        tracing::warn!("{message}");
                    }
                    QueueEvent::StatusChanged(status) => {
                        tracing::debug!(?status, "queue status");
                    }
                    QueueEvent::Connected => tracing::info!("Push channel connected"),
                    QueueEvent::Reconnected => tracing::info!("Push channel restored"),
                    QueueEvent::Reconnecting { attempt, attempts_remaining } => {
                        tracing::warn!("Reconnecting (attempt {attempt}, {attempts_remaining} left)");
                    }
                    QueueEvent::Disconnected { reason } => {
                        tracing::warn!("Push channel down: {reason}");
                    }
                    QueueEvent::ReconnectFailed => {
                        tracing::error!("Giving up on the push channel; the list shown may be stale");
                        break;
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, shutting down");
                break;
            }
        }
    }

    sync.shutdown().await;
    Ok(())
}
