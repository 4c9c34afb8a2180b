//! Wire types for the queue backend.
//!
//! Two families live here:
//!
//! - Push-channel envelopes ([`ServerMessage`], [`ClientMessage`]), encoded as
//!   `{"event": "<name>", "data": {...}}` JSON text frames.
//! - REST request/response bodies for the `/api/*` endpoints. Field names match
//!   the backend's JSON exactly, including its mix of `snake_case` and
//!   `camelCase`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Push channel ────────────────────────────────────────────────────

/// Messages sent from the client over the push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Heartbeat.
    Ping,
}

/// Messages broadcast by the server over the push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The authoritative queue changed. Replaces the client's list wholesale.
    QueueUpdated {
        /// Player names in queue order.
        queue: Vec<String>,
    },
    /// Heartbeat response.
    Pong,
}

// ── REST: queue ─────────────────────────────────────────────────────

/// Body of `GET /api/queue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueResponse {
    pub queue: Vec<String>,
}

/// Body of `POST /api/queue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPlayerRequest {
    pub player_name: String,
}

/// Success body of `POST /api/queue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPlayerResponse {
    pub message: String,
    /// The server echoes the queue after the insert; clients must still wait
    /// for the push event before treating it as current.
    #[serde(default)]
    pub queue: Option<Vec<String>>,
}

/// Body of any non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ── REST: search ────────────────────────────────────────────────────

/// One scored team member from a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerScore {
    #[serde(rename = "summonerName")]
    pub summoner_name: String,
    pub score: f64,
}

/// Body of `GET /api/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Team members sorted by ascending score.
    pub scores: Vec<PlayerScore>,
    /// The lowest scorer, who makes room for the next queued player.
    pub player_to_remove: Option<PlayerScore>,
    /// The player popped off the front of the queue, if any.
    pub new_player_added: Option<String>,
}

// ── REST: leaderboard / stats / scores ──────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub summoner_name: String,
    #[serde(default)]
    pub tagline: Option<String>,
    pub average_score: f64,
    #[serde(default)]
    pub most_played_role: Option<String>,
    #[serde(default)]
    pub average_opponent_rank: Option<String>,
    #[serde(default)]
    pub highest_score: Option<f64>,
    #[serde(default)]
    pub lowest_score: Option<f64>,
    #[serde(default)]
    pub tenth_game_score: Option<f64>,
    pub last_updated: String,
}

/// Body of `GET /api/leaderboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// One ranked row in a stats category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    pub summoner_name: String,
    pub value: f64,
}

/// Body of `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub most_kills: Vec<StatEntry>,
    #[serde(default)]
    pub most_deaths: Vec<StatEntry>,
    #[serde(default)]
    pub most_assists: Vec<StatEntry>,
    #[serde(default)]
    pub most_cs: Vec<StatEntry>,
}

/// Body of `GET /api/scores`: the last ten game scores per player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoresResponse {
    pub player_scores: BTreeMap<String, Vec<f64>>,
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    #[test]
    fn queue_updated_uses_event_envelope() {
        let msg = ServerMessage::QueueUpdated {
            queue: vec!["Alice".into(), "Bob".into()],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "event": "queue_updated", "data": { "queue": ["Alice", "Bob"] } })
        );
    }

    #[test]
    fn ping_serializes_without_data() {
        let json = serde_json::to_string(&ClientMessage::Ping).unwrap();
        assert_eq!(json, r#"{"event":"ping"}"#);
    }

    #[test]
    fn unknown_event_is_rejected() {
        let result = serde_json::from_str::<ServerMessage>(r#"{"event":"match_found","data":{}}"#);
        assert!(result.is_err());
    }
}
