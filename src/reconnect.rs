//! Push-channel connection state and reconnection budget.
//!
//! [`ConnectionState`] is a plain state machine with no I/O. The synchronizer
//! loop drives it and acts on the [`ReconnectDecision`] it returns, which keeps
//! the policy testable without sockets or timers.
//!
//! Policy:
//!
//! - A server-initiated close reconnects immediately and does not spend budget.
//! - An unexpected drop (channel error) starts bounded retries. Each attempt
//!   spends one unit of budget.
//! - A successful connect refills the budget.
//! - Once the budget is spent and the last attempt failed, the state is
//!   [`ConnectionPhase::ReconnectFailed`] and stays there.

use std::fmt;

/// Default number of reconnection attempts after an unexpected drop.
pub const DEFAULT_RECONNECTION_ATTEMPTS: u32 = 5;

/// Why the push channel went down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The server closed the channel deliberately.
    ServerDisconnect,
    /// The channel errored, dropped, or could not be opened.
    TransportError(String),
    /// The client shut the channel down.
    ClientDisconnect,
}

impl DisconnectReason {
    /// Short reason string, matching the names dashboards already log.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ServerDisconnect => "io server disconnect",
            Self::TransportError(_) => "transport error",
            Self::ClientDisconnect => "io client disconnect",
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransportError(detail) => write!(f, "transport error: {detail}"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Lifecycle phase of the push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionPhase {
    Connecting,
    Connected,
    Disconnected(DisconnectReason),
    /// The budget is spent. No further automatic retries.
    ReconnectFailed,
}

/// What the loop should do after a disconnect or a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Reconnect now, without spending budget.
    Immediate,
    /// Wait the reconnect delay, then try again.
    Retry,
    /// Stop the loop.
    Stop,
}

/// Connection phase plus the bounded reconnection counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    phase: ConnectionPhase,
    attempts_remaining: u32,
    max_attempts: u32,
}

impl ConnectionState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            phase: ConnectionPhase::Connecting,
            attempts_remaining: max_attempts,
            max_attempts,
        }
    }

    pub fn phase(&self) -> &ConnectionPhase {
        &self.phase
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.phase, ConnectionPhase::Connected)
    }

    /// The channel is up. Refills the budget.
    pub fn on_connected(&mut self) {
        self.phase = ConnectionPhase::Connected;
        self.attempts_remaining = self.max_attempts;
    }

    /// The live channel went down.
    pub fn on_disconnect(&mut self, reason: DisconnectReason) -> ReconnectDecision {
        let decision = match &reason {
            DisconnectReason::ServerDisconnect => ReconnectDecision::Immediate,
            DisconnectReason::ClientDisconnect => ReconnectDecision::Stop,
            DisconnectReason::TransportError(_) => self.retry_or_give_up(),
        };
        if !matches!(self.phase, ConnectionPhase::ReconnectFailed) {
            self.phase = ConnectionPhase::Disconnected(reason);
        }
        decision
    }

    /// Spend one unit of budget on a reconnection attempt.
    ///
    /// Returns the 1-based attempt number, or `None` if the budget is spent.
    pub fn begin_attempt(&mut self) -> Option<u32> {
        if self.attempts_remaining == 0 {
            self.phase = ConnectionPhase::ReconnectFailed;
            return None;
        }
        self.attempts_remaining -= 1;
        self.phase = ConnectionPhase::Connecting;
        Some(self.max_attempts - self.attempts_remaining)
    }

    /// Begin a connect that does not spend budget (startup, or after a
    /// server-initiated close).
    pub fn begin_free_attempt(&mut self) {
        self.phase = ConnectionPhase::Connecting;
    }

    /// A connection attempt failed.
    pub fn on_attempt_failed(&mut self, reason: DisconnectReason) -> ReconnectDecision {
        let decision = self.retry_or_give_up();
        if decision == ReconnectDecision::Retry {
            self.phase = ConnectionPhase::Disconnected(reason);
        }
        decision
    }

    /// Stop for good; used by explicit shutdown.
    pub fn on_shutdown(&mut self) {
        self.phase = ConnectionPhase::Disconnected(DisconnectReason::ClientDisconnect);
    }

    fn retry_or_give_up(&mut self) -> ReconnectDecision {
        if self.attempts_remaining == 0 {
            self.phase = ConnectionPhase::ReconnectFailed;
            ReconnectDecision::Stop
        } else {
            ReconnectDecision::Retry
        }
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new(DEFAULT_RECONNECTION_ATTEMPTS)
    }
}
