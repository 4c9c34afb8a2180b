//! Client-side view of the authoritative player queue.

/// Load status of the queue view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueueStatus {
    /// Waiting on an authoritative fetch.
    #[default]
    Loading,
    /// `players` reflects the last authoritative list received.
    Ready,
    /// A fetch failed or the push channel is down. `players` still holds the
    /// last known list.
    Error(String),
}

/// The queue as last reported by the backend.
///
/// Names keep the backend's order (index = queue position). Duplicates are
/// kept as received.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueState {
    pub players: Vec<String>,
    pub status: QueueStatus,
}

impl QueueState {
    /// Empty, loading state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list wholesale with an authoritative one and mark it ready.
    pub fn replace(&mut self, players: Vec<String>) {
        self.players = players;
        self.status = QueueStatus::Ready;
    }

    /// Record a failure without touching `players`.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = QueueStatus::Error(message.into());
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, QueueStatus::Loading)
    }

    /// The error banner text, if any.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            QueueStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    /// 1-based `(position, name)` pairs, as a queue list renders them.
    pub fn positions(&self) -> impl Iterator<Item = (usize, &str)> {
        self.players
            .iter()
            .enumerate()
            .map(|(i, name)| (i + 1, name.as_str()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_loading() {
        let state = QueueState::new();
        assert!(state.players.is_empty());
        assert!(state.is_loading());
    }

    #[test]
    fn replace_supersedes_previous_list() {
        let mut state = QueueState::new();
        state.replace(vec!["Alice".into(), "Bob".into()]);
        state.replace(vec!["Carol".into()]);
        assert_eq!(state.players, vec!["Carol".to_string()]);
        assert_eq!(state.status, QueueStatus::Ready);
    }

    #[test]
    fn fail_keeps_players() {
        let mut state = QueueState::new();
        state.replace(vec!["Alice".into()]);
        state.fail("WebSocket connection failed.");
        assert_eq!(state.players, vec!["Alice".to_string()]);
        assert_eq!(state.error(), Some("WebSocket connection failed."));
    }

    #[test]
    fn duplicates_are_preserved() {
        let mut state = QueueState::new();
        state.replace(vec!["Alice".into(), "Alice".into()]);
        let positions: Vec<_> = state.positions().collect();
        assert_eq!(positions, vec![(1, "Alice"), (2, "Alice")]);
    }

    #[test]
    fn replacing_with_empty_twice_is_stable() {
        let mut state = QueueState::new();
        state.replace(Vec::new());
        state.replace(Vec::new());
        assert!(state.players.is_empty());
        assert_eq!(state.status, QueueStatus::Ready);
    }
}
