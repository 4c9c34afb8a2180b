#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing,
    dead_code
)]
//! Shared test utilities for queue dashboard integration tests.
//!
//! Provides a scripted [`MockTransport`], a [`MockConnector`] that hands them
//! out in order, a recording [`MockQueueApi`], and helpers for building push
//! channel JSON.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use queue_dashboard::protocol::ServerMessage;
use queue_dashboard::{Connector, DashboardError, QueueApi, QueueEvent, Transport};
use tokio::sync::mpsc;

/// One scripted `recv()` result.
pub type Incoming = Option<Result<String, DashboardError>>;

// ── MockTransport ───────────────────────────────────────────────────

/// Live-transport bookkeeping shared between a connector and its transports.
#[derive(Debug, Default)]
pub struct LiveCounter {
    live: AtomicUsize,
    max_live: AtomicUsize,
}

impl LiveCounter {
    fn opened(&self) {
        let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(now, Ordering::SeqCst);
    }

    fn dropped(&self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }
}

/// A mock transport for integration testing.
///
/// Scripted server frames are consumed in order by `recv()`; once the script
/// runs out, `recv()` hangs so the session stays up until shutdown. All
/// messages sent by the client are recorded in `sent`.
pub struct MockTransport {
    incoming: VecDeque<Incoming>,
    pub sent: Arc<StdMutex<Vec<String>>>,
    pub closed: Arc<AtomicBool>,
    live: Option<Arc<LiveCounter>>,
}

impl MockTransport {
    /// Create a transport with the given script.
    ///
    /// Returns the transport plus shared handles for inspecting sent messages
    /// and whether close was called.
    pub fn new(incoming: Vec<Incoming>) -> (Self, Arc<StdMutex<Vec<String>>>, Arc<AtomicBool>) {
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let transport = Self {
            incoming: VecDeque::from(incoming),
            sent: Arc::clone(&sent),
            closed: Arc::clone(&closed),
            live: None,
        };
        (transport, sent, closed)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, message: String) -> Result<(), DashboardError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, DashboardError>> {
        match self.incoming.pop_front() {
            Some(item) => item,
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), DashboardError> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        if let Some(live) = &self.live {
            live.dropped();
        }
    }
}

// ── MockConnector ───────────────────────────────────────────────────

/// Outcome of one scripted `connect()` call.
pub enum Connect {
    /// Hand out a transport with this `recv()` script.
    Session(Vec<Incoming>),
    /// Fail the attempt.
    Fail(&'static str),
    /// Never complete; only a connect timeout ends the attempt.
    Hang,
}

/// Hands out scripted connection outcomes in order.
///
/// When the script runs out, every further connect yields a transport that
/// stays silent until shutdown.
pub struct MockConnector {
    script: VecDeque<Connect>,
    pub connects: Arc<AtomicUsize>,
    pub live: Arc<LiveCounter>,
    pub sent: Arc<StdMutex<Vec<String>>>,
    pub closed: Arc<AtomicUsize>,
}

impl MockConnector {
    pub fn new(script: Vec<Connect>) -> Self {
        Self {
            script: VecDeque::from(script),
            connects: Arc::new(AtomicUsize::new(0)),
            live: Arc::new(LiveCounter::default()),
            sent: Arc::new(StdMutex::new(Vec::new())),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handles to inspect the connector after it moves into the synchronizer.
    pub fn probes(&self) -> ConnectorProbes {
        ConnectorProbes {
            connects: Arc::clone(&self.connects),
            live: Arc::clone(&self.live),
            sent: Arc::clone(&self.sent),
            closed: Arc::clone(&self.closed),
        }
    }
}

/// Shared views into a [`MockConnector`].
#[derive(Clone)]
pub struct ConnectorProbes {
    pub connects: Arc<AtomicUsize>,
    pub live: Arc<LiveCounter>,
    pub sent: Arc<StdMutex<Vec<String>>>,
    pub closed: Arc<AtomicUsize>,
}

impl ConnectorProbes {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Wraps a [`MockTransport`] so closes are counted across sessions.
pub struct CountedTransport {
    inner: MockTransport,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl Transport for CountedTransport {
    async fn send(&mut self, message: String) -> Result<(), DashboardError> {
        self.inner.send(message).await
    }

    async fn recv(&mut self) -> Option<Result<String, DashboardError>> {
        self.inner.recv().await
    }

    async fn close(&mut self) -> Result<(), DashboardError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        self.inner.close().await
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Transport = CountedTransport;

    async fn connect(&mut self) -> Result<CountedTransport, DashboardError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let incoming = match self.script.pop_front() {
            Some(Connect::Fail(message)) => return Err(DashboardError::Channel(message.into())),
            Some(Connect::Session(incoming)) => incoming,
            Some(Connect::Hang) => std::future::pending().await,
            None => Vec::new(),
        };

        let (mut inner, _, _) = MockTransport::new(incoming);
        inner.sent = Arc::clone(&self.sent);
        self.live.opened();
        inner.live = Some(Arc::clone(&self.live));
        Ok(CountedTransport {
            inner,
            closed: Arc::clone(&self.closed),
        })
    }
}

// ── MockQueueApi ────────────────────────────────────────────────────

#[derive(Default)]
struct ApiLog {
    /// Successive `fetch_queue` answers; the last one repeats.
    fetches: StdMutex<VecDeque<Result<Vec<String>, DashboardError>>>,
    /// Answer for `add_player`; `None` means success with a canned message.
    add_error: StdMutex<Option<DashboardError>>,
    fetch_calls: AtomicUsize,
    added: StdMutex<Vec<String>>,
}

/// Recording double for the REST seam. Clones share one log.
#[derive(Clone, Default)]
pub struct MockQueueApi {
    log: Arc<ApiLog>,
}

impl MockQueueApi {
    pub fn with_queue(players: &[&str]) -> Self {
        let api = Self::default();
        api.push_fetch(Ok(names(players)));
        api
    }

    pub fn failing_fetch() -> Self {
        let api = Self::default();
        api.push_fetch(Err(DashboardError::Network("connection refused".into())));
        api
    }

    /// Queue another `fetch_queue` answer.
    pub fn push_fetch(&self, answer: Result<Vec<String>, DashboardError>) {
        self.log.fetches.lock().unwrap().push_back(answer);
    }

    /// Make every `add_player` fail with `error`.
    pub fn reject_adds(&self, error: DashboardError) {
        *self.log.add_error.lock().unwrap() = Some(error);
    }

    pub fn fetch_calls(&self) -> usize {
        self.log.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn added(&self) -> Vec<String> {
        self.log.added.lock().unwrap().clone()
    }
}

fn replay(error: &DashboardError) -> DashboardError {
    match error {
        DashboardError::Network(m) => DashboardError::Network(m.clone()),
        DashboardError::ServerRejection { status, message } => DashboardError::ServerRejection {
            status: *status,
            message: message.clone(),
        },
        other => DashboardError::Network(other.to_string()),
    }
}

#[async_trait]
impl QueueApi for MockQueueApi {
    async fn fetch_queue(&self) -> Result<Vec<String>, DashboardError> {
        self.log.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let mut fetches = self.log.fetches.lock().unwrap();
        let answer = if fetches.len() > 1 {
            fetches.pop_front()
        } else {
            fetches.front().map(|a| match a {
                Ok(players) => Ok(players.clone()),
                Err(e) => Err(replay(e)),
            })
        };
        answer.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn add_player(&self, player_name: &str) -> Result<String, DashboardError> {
        self.log.added.lock().unwrap().push(player_name.to_string());
        match self.log.add_error.lock().unwrap().as_ref() {
            Some(e) => Err(replay(e)),
            None => Ok(format!("{player_name} added to the queue.")),
        }
    }
}

// ── JSON helper functions ───────────────────────────────────────────

pub fn names(players: &[&str]) -> Vec<String> {
    players.iter().map(|p| (*p).to_string()).collect()
}

/// Returns the JSON string for a `queue_updated` broadcast.
pub fn queue_updated_json(players: &[&str]) -> String {
    serde_json::to_string(&ServerMessage::QueueUpdated {
        queue: names(players),
    })
    .expect("queue_updated_json serialization")
}

/// A scripted `queue_updated` frame.
pub fn update(players: &[&str]) -> Incoming {
    Some(Ok(queue_updated_json(players)))
}

/// Returns the JSON string for a `pong` frame.
pub fn pong_json() -> String {
    serde_json::to_string(&ServerMessage::Pong).expect("pong_json serialization")
}

/// A scripted receive error.
pub fn channel_error() -> Incoming {
    Some(Err(DashboardError::TransportReceive("connection reset".into())))
}

// ── Event helpers ───────────────────────────────────────────────────

/// Receive events until one matches `pred`, returning it. Panics after
/// `limit` of (paused-clock) time.
pub async fn wait_for<F>(events: &mut mpsc::Receiver<QueueEvent>, mut pred: F) -> QueueEvent
where
    F: FnMut(&QueueEvent) -> bool,
{
    let limit = Duration::from_secs(120);
    tokio::time::timeout(limit, async {
        loop {
            let event = events.recv().await.expect("event channel closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

/// Collect every event up to and including the first one matching `pred`.
pub async fn collect_until<F>(events: &mut mpsc::Receiver<QueueEvent>, mut pred: F) -> Vec<QueueEvent>
where
    F: FnMut(&QueueEvent) -> bool,
{
    let mut seen = Vec::new();
    wait_for(events, |event| {
        seen.push(event.clone());
        pred(event)
    })
    .await;
    seen
}
