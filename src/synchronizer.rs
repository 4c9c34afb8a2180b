//! Push-synchronized view of the backend's player queue.
//!
//! [`QueueSynchronizer`] is a thin handle over two background tasks:
//!
//! - a one-shot authoritative fetch (`GET /api/queue`) through a [`QueueApi`];
//! - the channel loop, which opens push-channel transports through a
//!   [`Connector`], applies every `queue_updated` broadcast wholesale in
//!   receipt order, and reconnects according to [`ConnectionState`].
//!
//! The backend is the only writer. [`QueueSynchronizer::add_player`] submits a
//! request and returns the server's answer, but the local list only changes when
//! the resulting broadcast arrives.
//!
//! # Example
//!
//! ```rust,ignore
//! let api = HttpBackend::new("http://localhost:5000");
//! let connector = WebSocketConnector::new("ws://localhost:5000/ws");
//! let (sync, mut events) = QueueSynchronizer::start(api, connector, QueueSyncConfig::new());
//!
//! sync.add_player("Alice").await?;
//!
//! while let Some(event) = events.recv().await {
//!     if let QueueEvent::QueueUpdated { players } = event {
//!         println!("{players:?}");
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::{require_non_blank, QueueApi};
use crate::error::{DashboardError, Result, CHANNEL_FAILED, FETCH_QUEUE_FAILED};
use crate::event::QueueEvent;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::queue::{QueueState, QueueStatus};
use crate::reconnect::{
    ConnectionState, DisconnectReason, ReconnectDecision, DEFAULT_RECONNECTION_ATTEMPTS,
};
use crate::transport::{Connector, Transport};

/// Default capacity of the bounded event channel.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default timeout for the graceful shutdown.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Default per-attempt connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default pause before a budgeted reconnection attempt.
const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

const EMPTY_PLAYER_NAME: &str = "Player name cannot be empty.";

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`QueueSynchronizer`].
///
/// # Example
///
/// ```
/// use queue_dashboard::synchronizer::QueueSyncConfig;
/// use std::time::Duration;
///
/// let config = QueueSyncConfig::new()
///     .with_reconnection_attempts(3)
///     .with_connect_timeout(Duration::from_secs(5));
/// assert_eq!(config.reconnection_attempts, 3);
/// ```
#[derive(Debug, Clone)]
pub struct QueueSyncConfig {
    /// Capacity of the bounded event channel.
    ///
    /// When the consumer falls behind, events are dropped with a warning.
    /// `ReconnectFailed` and the shutdown `Disconnected` are always delivered.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    pub event_channel_capacity: usize,
    /// How long [`QueueSynchronizer::shutdown`] waits for the channel loop to
    /// close the transport before aborting it. Defaults to **1 second**.
    pub shutdown_timeout: Duration,
    /// Budgeted reconnection attempts after an unexpected drop.
    /// Defaults to **5**.
    pub reconnection_attempts: u32,
    /// Timeout applied to every connection attempt. Defaults to **10 seconds**.
    pub connect_timeout: Duration,
    /// Pause before each budgeted reconnection attempt. Defaults to **1 second**.
    pub reconnect_delay: Duration,
    /// Send a `ping` envelope on this period while connected. Off by default.
    pub heartbeat_interval: Option<Duration>,
}

impl QueueSyncConfig {
    pub fn new() -> Self {
        Self {
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            reconnection_attempts: DEFAULT_RECONNECTION_ATTEMPTS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            heartbeat_interval: None,
        }
    }

    /// Defaults to **256**. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_reconnection_attempts(mut self, attempts: u32) -> Self {
        self.reconnection_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }
}

impl Default for QueueSyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ── Shared state ────────────────────────────────────────────────────

/// State shared between the handle, the fetch tasks and the channel loop.
struct Shared<A> {
    api: A,
    state_tx: watch::Sender<QueueState>,
    event_tx: mpsc::Sender<QueueEvent>,
    connection: Mutex<ConnectionState>,
    /// Set while the push channel is down after an error; keeps the banner up
    /// even when a fetch succeeds in the meantime.
    channel_error: AtomicBool,
    running: AtomicBool,
}

impl<A: QueueApi> Shared<A> {
    /// Replace the list wholesale with an authoritative one.
    fn on_update(&self, players: Vec<String>) {
        let channel_down = self.channel_error.load(Ordering::Acquire);

        let mut status_changed = None;
        self.state_tx.send_modify(|state| {
            let previous = state.status.clone();
            state.replace(players.clone());
            if channel_down {
                state.fail(CHANNEL_FAILED);
            }
            if state.status != previous {
                status_changed = Some(state.status.clone());
            }
        });
        debug!(len = players.len(), "state: queue replaced");

        emit_event(&self.event_tx, QueueEvent::QueueUpdated { players });
        if let Some(status) = status_changed {
            emit_event(&self.event_tx, QueueEvent::StatusChanged(status));
        }
    }

    fn set_status(&self, status: QueueStatus) {
        let changed = self.state_tx.send_if_modified(|state| {
            if state.status == status {
                return false;
            }
            state.status = status.clone();
            true
        });
        if changed {
            debug!(?status, "state: status changed");
            emit_event(&self.event_tx, QueueEvent::StatusChanged(status));
        }
    }

    fn channel_failed(&self) {
        self.channel_error.store(true, Ordering::Release);
        self.set_status(QueueStatus::Error(CHANNEL_FAILED.to_string()));
    }

    fn channel_recovered(&self) {
        if self.channel_error.swap(false, Ordering::AcqRel) {
            self.set_status(QueueStatus::Ready);
        }
    }

    /// Authoritative fetch. Keeps the previous list on failure.
    async fn fetch(&self) -> Result<()> {
        self.set_status(QueueStatus::Loading);
        match self.api.fetch_queue().await {
            Ok(players) => {
                self.on_update(players);
                Ok(())
            }
            Err(e) => {
                error!("failed to fetch queue: {e}");
                self.set_status(QueueStatus::Error(FETCH_QUEUE_FAILED.to_string()));
                Err(e)
            }
        }
    }
}

// ── Synchronizer handle ─────────────────────────────────────────────

/// Handle to a running queue synchronizer.
///
/// Created via [`QueueSynchronizer::start`]. Dropping the handle aborts the
/// background tasks; call [`shutdown`](Self::shutdown) to close the push
/// channel gracefully.
pub struct QueueSynchronizer<A: QueueApi> {
    shared: Arc<Shared<A>>,
    /// Handle to the channel loop task.
    task: Option<JoinHandle<()>>,
    /// Handle to the initial fetch task.
    fetch_task: Option<JoinHandle<()>>,
    /// Oneshot sender to signal the channel loop to shut down gracefully.
    shutdown_tx: Option<oneshot::Sender<()>>,
    shutdown_timeout: Duration,
}

impl<A: QueueApi> QueueSynchronizer<A> {
    /// Start the synchronizer and return a handle plus event receiver.
    ///
    /// Kicks off the initial fetch and the push channel concurrently. Whichever
    /// authoritative list arrives last wins.
    #[must_use = "the event receiver must be used to receive events"]
    pub fn start<C: Connector>(
        api: A,
        connector: C,
        config: QueueSyncConfig,
    ) -> (Self, mpsc::Receiver<QueueEvent>) {
        // Clamp capacity to at least 1 (tokio panics on 0).
        let capacity = config.event_channel_capacity.max(1);
        let (event_tx, event_rx) = mpsc::channel::<QueueEvent>(capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (state_tx, _) = watch::channel(QueueState::new());

        let shared = Arc::new(Shared {
            api,
            state_tx,
            event_tx,
            connection: Mutex::new(ConnectionState::new(config.reconnection_attempts)),
            channel_error: AtomicBool::new(false),
            running: AtomicBool::new(true),
        });

        let fetch_shared = Arc::clone(&shared);
        let fetch_task = tokio::spawn(async move {
            // Failures are already reflected in the queue status.
            let _ = fetch_shared.fetch().await;
        });

        let task = tokio::spawn(channel_loop(
            connector,
            Arc::clone(&shared),
            LoopSettings::from(&config),
            shutdown_rx,
        ));

        let synchronizer = Self {
            shared,
            task: Some(task),
            fetch_task: Some(fetch_task),
            shutdown_tx: Some(shutdown_tx),
            shutdown_timeout: config.shutdown_timeout,
        };

        (synchronizer, event_rx)
    }

    // ── Public API methods ──────────────────────────────────────────

    /// Ask the backend to enqueue `name` and return its confirmation message.
    ///
    /// Issues exactly one request. The local list is not touched; the new queue
    /// arrives through the push channel.
    ///
    /// # Errors
    ///
    /// - [`DashboardError::Validation`] for a blank name (no request is sent)
    /// - [`DashboardError::ServerRejection`] with the server's message
    /// - [`DashboardError::NotRunning`] after [`shutdown`](Self::shutdown)
    /// - [`DashboardError::Network`] otherwise
    pub async fn add_player(&self, name: &str) -> Result<String> {
        self.ensure_open()?;
        let name = require_non_blank(name, EMPTY_PLAYER_NAME)?;
        debug!(%name, "submitting player");
        let message = self.shared.api.add_player(name).await?;
        info!(%name, "player submitted: {message}");
        Ok(message)
    }

    /// Re-run the authoritative fetch.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the previous list is kept and the status shows
    /// the failure.
    pub async fn refresh(&self) -> Result<()> {
        self.ensure_open()?;
        self.shared.fetch().await
    }

    /// Requests stay available after the push channel gives up, but not after
    /// an explicit shutdown.
    fn ensure_open(&self) -> Result<()> {
        if self.shutdown_tx.is_none() {
            return Err(DashboardError::NotRunning);
        }
        Ok(())
    }

    /// Watch the queue. Any number of consumers may subscribe.
    pub fn subscribe(&self) -> watch::Receiver<QueueState> {
        self.shared.state_tx.subscribe()
    }

    /// Snapshot of the current queue.
    pub fn state(&self) -> QueueState {
        self.shared.state_tx.borrow().clone()
    }

    /// Snapshot of the push-channel connection state.
    pub async fn connection(&self) -> ConnectionState {
        self.shared.connection.lock().await.clone()
    }

    /// Returns `true` while the channel loop is running.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Shut down the synchronizer, closing the push channel.
    ///
    /// After this returns, the event receiver yields `None` once drained.
    pub async fn shutdown(&mut self) {
        debug!("QueueSynchronizer: shutdown requested");

        if let Some(fetch) = self.fetch_task.take() {
            fetch.abort();
        }

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!("channel loop terminated with join error: {join_err}");
                }
                Err(_) => {
                    warn!("channel loop did not exit within timeout; aborting task");
                    task.abort();
                    if let Err(join_err) = task.await {
                        debug!("channel loop aborted: {join_err}");
                    }
                }
            }
        }

        self.shared.running.store(false, Ordering::Release);
    }
}

impl<A: QueueApi> std::fmt::Debug for QueueSynchronizer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state_tx.borrow();
        f.debug_struct("QueueSynchronizer")
            .field("running", &self.is_running())
            .field("players", &state.players.len())
            .field("status", &state.status)
            .finish()
    }
}

impl<A: QueueApi> Drop for QueueSynchronizer<A> {
    fn drop(&mut self) {
        // No executor to drive a graceful close from `Drop`; abort instead.
        if let Some(fetch) = self.fetch_task.take() {
            fetch.abort();
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ── Channel loop ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct LoopSettings {
    connect_timeout: Duration,
    reconnect_delay: Duration,
    heartbeat_interval: Option<Duration>,
}

impl From<&QueueSyncConfig> for LoopSettings {
    fn from(config: &QueueSyncConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout,
            reconnect_delay: config.reconnect_delay,
            heartbeat_interval: config.heartbeat_interval.filter(|d| !d.is_zero()),
        }
    }
}

/// How the next connection attempt is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    /// Startup, or right after a server-initiated close.
    Free,
    /// Spends one unit of the reconnection budget.
    Budgeted,
}

/// Why a connected session ended.
enum SessionEnd {
    Shutdown,
    Dropped(DisconnectReason),
}

/// Owns the single live transport and reconnects it.
///
/// Exits on shutdown, on a dropped handle, or when the budget is spent.
async fn channel_loop<C: Connector, A: QueueApi>(
    mut connector: C,
    shared: Arc<Shared<A>>,
    settings: LoopSettings,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    debug!("channel loop started");

    let mut attempt = Attempt::Free;
    let mut has_connected = false;
    let mut refetch: Option<JoinHandle<()>> = None;

    loop {
        if attempt == Attempt::Budgeted {
            let begun = {
                let mut connection = shared.connection.lock().await;
                connection
                    .begin_attempt()
                    .map(|n| (n, connection.attempts_remaining()))
            };
            match begun {
                Some((n, attempts_remaining)) => {
                    warn!(attempt = n, attempts_remaining, "reconnecting push channel");
                    emit_event(
                        &shared.event_tx,
                        QueueEvent::Reconnecting {
                            attempt: n,
                            attempts_remaining,
                        },
                    );
                }
                None => {
                    give_up(&shared).await;
                    break;
                }
            }
        } else {
            shared.connection.lock().await.begin_free_attempt();
        }

        let connected = tokio::select! {
            result = tokio::time::timeout(settings.connect_timeout, connector.connect()) => result,
            _ = &mut shutdown_rx => {
                stop(&shared).await;
                break;
            }
        };

        let mut transport = match connected {
            Ok(Ok(transport)) => transport,
            Ok(Err(e)) => {
                error!("push channel connect failed: {e}");
                let reason = DisconnectReason::TransportError(e.to_string());
                if !after_failure(&shared, reason, settings, &mut shutdown_rx).await {
                    break;
                }
                attempt = Attempt::Budgeted;
                continue;
            }
            Err(_) => {
                error!(timeout = ?settings.connect_timeout, "push channel connect timed out");
                let reason = DisconnectReason::TransportError(DashboardError::Timeout.to_string());
                if !after_failure(&shared, reason, settings, &mut shutdown_rx).await {
                    break;
                }
                attempt = Attempt::Budgeted;
                continue;
            }
        };

        shared.connection.lock().await.on_connected();
        shared.channel_recovered();
        emit_event(&shared.event_tx, QueueEvent::Connected);
        if has_connected {
            info!("push channel reconnected; refetching queue");
            emit_event(&shared.event_tx, QueueEvent::Reconnected);
            if let Some(previous) = refetch.take() {
                previous.abort();
            }
            let fetch_shared = Arc::clone(&shared);
            refetch = Some(tokio::spawn(async move {
                let _ = fetch_shared.fetch().await;
            }));
        }
        has_connected = true;

        match run_session(&mut transport, &shared, settings, &mut shutdown_rx).await {
            SessionEnd::Shutdown => {
                if let Err(e) = transport.close().await {
                    debug!("closing transport on shutdown: {e}");
                }
                stop(&shared).await;
                break;
            }
            SessionEnd::Dropped(reason) => {
                if let Err(e) = transport.close().await {
                    debug!("closing dropped transport: {e}");
                }
                drop(transport);

                emit_event(
                    &shared.event_tx,
                    QueueEvent::Disconnected {
                        reason: reason.clone(),
                    },
                );
                if matches!(reason, DisconnectReason::TransportError(_)) {
                    shared.channel_failed();
                }

                let decision = shared.connection.lock().await.on_disconnect(reason);
                match decision {
                    ReconnectDecision::Immediate => attempt = Attempt::Free,
                    ReconnectDecision::Retry => {
                        if !pause(settings.reconnect_delay, &shared, &mut shutdown_rx).await {
                            break;
                        }
                        attempt = Attempt::Budgeted;
                    }
                    ReconnectDecision::Stop => {
                        give_up(&shared).await;
                        break;
                    }
                }
            }
        }
    }

    if let Some(task) = refetch {
        task.abort();
    }
    shared.running.store(false, Ordering::Release);
    debug!("channel loop exited");
}

/// Pump one connected transport until it drops or shutdown is requested.
async fn run_session<T: Transport, A: QueueApi>(
    transport: &mut T,
    shared: &Shared<A>,
    settings: LoopSettings,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> SessionEnd {
    let mut heartbeat = settings.heartbeat_interval.map(|period| {
        tokio::time::interval_at(tokio::time::Instant::now() + period, period)
    });

    loop {
        tokio::select! {
            _ = &mut *shutdown_rx => {
                debug!("shutdown signal received");
                return SessionEnd::Shutdown;
            }

            _ = next_heartbeat(&mut heartbeat) => {
                let ping = match serde_json::to_string(&ClientMessage::Ping) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("failed to serialize ClientMessage: {e}");
                        continue;
                    }
                };
                if let Err(e) = transport.send(ping).await {
                    error!("heartbeat send error: {e}");
                    return SessionEnd::Dropped(DisconnectReason::TransportError(e.to_string()));
                }
            }

            incoming = transport.recv() => {
                match incoming {
                    Some(Ok(text)) => match serde_json::from_str::<ServerMessage>(&text) {
                        Ok(ServerMessage::QueueUpdated { queue }) => shared.on_update(queue),
                        Ok(ServerMessage::Pong) => debug!("pong"),
                        Err(e) => warn!("failed to deserialize server message: {e}; raw: {text}"),
                    },
                    Some(Err(e)) => {
                        error!("transport receive error: {e}");
                        return SessionEnd::Dropped(DisconnectReason::TransportError(e.to_string()));
                    }
                    None => {
                        debug!("push channel closed by server");
                        return SessionEnd::Dropped(DisconnectReason::ServerDisconnect);
                    }
                }
            }
        }
    }
}

async fn next_heartbeat(heartbeat: &mut Option<tokio::time::Interval>) {
    match heartbeat {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Handle a failed connection attempt. Returns `false` if the loop must exit.
async fn after_failure<A: QueueApi>(
    shared: &Shared<A>,
    reason: DisconnectReason,
    settings: LoopSettings,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> bool {
    shared.channel_failed();
    let decision = shared.connection.lock().await.on_attempt_failed(reason);
    match decision {
        ReconnectDecision::Retry | ReconnectDecision::Immediate => {
            pause(settings.reconnect_delay, shared, shutdown_rx).await
        }
        ReconnectDecision::Stop => {
            give_up(shared).await;
            false
        }
    }
}

/// Sleep before the next attempt. Returns `false` if shutdown arrived first.
async fn pause<A: QueueApi>(
    delay: Duration,
    shared: &Shared<A>,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = shutdown_rx => {
            stop(shared).await;
            false
        }
    }
}

/// Announce the client-side disconnect. The caller closes any open transport.
async fn stop<A: QueueApi>(shared: &Shared<A>) {
    shared.connection.lock().await.on_shutdown();
    emit_terminal(
        &shared.event_tx,
        QueueEvent::Disconnected {
            reason: DisconnectReason::ClientDisconnect,
        },
    )
    .await;
}

/// The budget is spent: keep the stale list, keep the banner, stop retrying.
async fn give_up<A: QueueApi>(shared: &Shared<A>) {
    error!("push channel reconnection failed; giving up");
    shared.channel_failed();
    emit_terminal(&shared.event_tx, QueueEvent::ReconnectFailed).await;
}

/// Emit an event to the event channel. If the channel is full, log a warning
/// and drop the event to avoid blocking the loop.
fn emit_event(event_tx: &mpsc::Sender<QueueEvent>, event: QueueEvent) {
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            warn!("event channel full, dropping event: {dropped:?}");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("event channel closed, receiver dropped");
        }
    }
}

/// Emit an event that must not be dropped (it is the last one on the channel).
async fn emit_terminal(event_tx: &mpsc::Sender<QueueEvent>, event: QueueEvent) {
    if event_tx.send(event).await.is_err() {
        debug!("event channel closed, receiver dropped");
    }
}
