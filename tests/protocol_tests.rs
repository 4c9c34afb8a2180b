#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Protocol serialization tests for the queue dashboard.
//!
//! Decodes JSON fixtures shaped exactly like the backend's output: push-channel
//! frames and the REST bodies of every `/api/*` endpoint the client reads.

use queue_dashboard::protocol::{
    AddPlayerRequest, AddPlayerResponse, ClientMessage, ErrorResponse, LeaderboardResponse,
    QueueResponse, ScoresResponse, SearchResponse, ServerMessage, StatsResponse,
};

// ════════════════════════════════════════════════════════════════════
// Push channel
// ════════════════════════════════════════════════════════════════════

#[test]
fn queue_updated_fixture_decodes() {
    let json = r#"{"event":"queue_updated","data":{"queue":["Alice","Bob","Carol"]}}"#;
    let msg: ServerMessage = serde_json::from_str(json).expect("deserialize");
    assert_eq!(
        msg,
        ServerMessage::QueueUpdated {
            queue: vec!["Alice".into(), "Bob".into(), "Carol".into()]
        }
    );
}

#[test]
fn empty_queue_update_decodes() {
    let json = r#"{"event":"queue_updated","data":{"queue":[]}}"#;
    let msg: ServerMessage = serde_json::from_str(json).expect("deserialize");
    assert_eq!(msg, ServerMessage::QueueUpdated { queue: vec![] });
}

#[test]
fn queue_updated_keeps_duplicate_names_in_order() {
    let json = r#"{"event":"queue_updated","data":{"queue":["Bob","Alice","Bob"]}}"#;
    let ServerMessage::QueueUpdated { queue } = serde_json::from_str(json).expect("deserialize")
    else {
        panic!("expected QueueUpdated");
    };
    assert_eq!(queue, vec!["Bob", "Alice", "Bob"]);
}

#[test]
fn pong_decodes_without_data() {
    let msg: ServerMessage = serde_json::from_str(r#"{"event":"pong"}"#).expect("deserialize");
    assert_eq!(msg, ServerMessage::Pong);
}

#[test]
fn queue_updated_without_queue_field_is_rejected() {
    let result = serde_json::from_str::<ServerMessage>(r#"{"event":"queue_updated","data":{}}"#);
    assert!(result.is_err());
}

#[test]
fn ping_encodes_as_bare_event() {
    let json = serde_json::to_string(&ClientMessage::Ping).expect("serialize");
    assert_eq!(json, r#"{"event":"ping"}"#);
}

// ════════════════════════════════════════════════════════════════════
// REST: queue
// ════════════════════════════════════════════════════════════════════

#[test]
fn queue_response_fixture_decodes() {
    let body: QueueResponse = serde_json::from_str(r#"{"queue":["Alice"]}"#).expect("deserialize");
    assert_eq!(body.queue, vec!["Alice"]);
}

#[test]
fn add_player_request_uses_snake_case_field() {
    let body = AddPlayerRequest {
        player_name: "Alice".into(),
    };
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        serde_json::json!({ "player_name": "Alice" })
    );
}

#[test]
fn add_player_response_with_and_without_queue_echo() {
    let with_echo: AddPlayerResponse = serde_json::from_str(
        r#"{"message":"Alice added to the queue.","queue":["Bob","Alice"]}"#,
    )
    .expect("deserialize");
    assert_eq!(with_echo.message, "Alice added to the queue.");
    assert_eq!(with_echo.queue.as_deref().map(<[String]>::len), Some(2));

    let bare: AddPlayerResponse =
        serde_json::from_str(r#"{"message":"ok"}"#).expect("deserialize");
    assert!(bare.queue.is_none());
}

#[test]
fn error_body_decodes() {
    let body: ErrorResponse =
        serde_json::from_str(r#"{"error":"Player already in the queue."}"#).expect("deserialize");
    assert_eq!(body.error, "Player already in the queue.");
}

// ════════════════════════════════════════════════════════════════════
// REST: search, leaderboard, stats, scores
// ════════════════════════════════════════════════════════════════════

#[test]
fn search_fixture_uses_camel_case_summoner_name() {
    let json = r#"{
        "scores": [
            {"summonerName": "Low", "score": 2.25},
            {"summonerName": "Mid", "score": 5.5},
            {"summonerName": "High", "score": 8.0}
        ],
        "player_to_remove": {"summonerName": "Low", "score": 2.25},
        "new_player_added": "Alice"
    }"#;
    let body: SearchResponse = serde_json::from_str(json).expect("deserialize");
    assert_eq!(body.scores.len(), 3);
    assert_eq!(body.scores[2].summoner_name, "High");
    assert_eq!(body.player_to_remove.unwrap().score, 2.25);
    assert_eq!(body.new_player_added.as_deref(), Some("Alice"));
}

#[test]
fn search_with_empty_queue_has_null_new_player() {
    let json = r#"{"scores":[],"player_to_remove":null,"new_player_added":null}"#;
    let body: SearchResponse = serde_json::from_str(json).expect("deserialize");
    assert!(body.scores.is_empty());
    assert!(body.player_to_remove.is_none());
    assert!(body.new_player_added.is_none());
}

#[test]
fn leaderboard_fixture_decodes_minimal_entries() {
    let json = r#"{"leaderboard":[
        {"summoner_name":"Alice","tagline":"NA1","average_score":7.5,"last_updated":"2024-11-02T18:00:00"},
        {"summoner_name":"Bob","tagline":"EUW","average_score":0.0,"last_updated":"2024-11-02T18:00:00"}
    ]}"#;
    let body: LeaderboardResponse = serde_json::from_str(json).expect("deserialize");
    assert_eq!(body.leaderboard.len(), 2);
    let first = &body.leaderboard[0];
    assert_eq!(first.summoner_name, "Alice");
    assert_eq!(first.tagline.as_deref(), Some("NA1"));
    assert_eq!(first.average_score, 7.5);
    assert!(first.most_played_role.is_none());
    assert!(first.tenth_game_score.is_none());
}

#[test]
fn leaderboard_fixture_decodes_extended_entries() {
    let json = r#"{"leaderboard":[{
        "summoner_name":"Alice","average_score":6.1,"most_played_role":"JUNGLE",
        "average_opponent_rank":"GOLD II","highest_score":9.4,"lowest_score":2.0,
        "tenth_game_score":5.5,"last_updated":"2024-11-02T18:00:00"
    }]}"#;
    let body: LeaderboardResponse = serde_json::from_str(json).expect("deserialize");
    let entry = &body.leaderboard[0];
    assert_eq!(entry.most_played_role.as_deref(), Some("JUNGLE"));
    assert_eq!(entry.highest_score, Some(9.4));
    assert!(entry.tagline.is_none());
}

#[test]
fn stats_fixture_decodes_all_categories() {
    let json = r#"{
        "most_kills":[{"summoner_name":"Alice","value":120}],
        "most_deaths":[{"summoner_name":"Bob","value":88}],
        "most_assists":[],
        "most_cs":[{"summoner_name":"Carol","value":2450}]
    }"#;
    let body: StatsResponse = serde_json::from_str(json).expect("deserialize");
    assert_eq!(body.most_kills[0].value, 120.0);
    assert_eq!(body.most_deaths[0].summoner_name, "Bob");
    assert!(body.most_assists.is_empty());
    assert_eq!(body.most_cs[0].value, 2450.0);
}

#[test]
fn scores_fixture_keeps_players_sorted() {
    let json = r#"{"player_scores":{"Zed":[1.0,2.0],"Alice":[3.5]}}"#;
    let body: ScoresResponse = serde_json::from_str(json).expect("deserialize");
    let players: Vec<_> = body.player_scores.keys().cloned().collect();
    assert_eq!(players, vec!["Alice", "Zed"]);
    assert_eq!(body.player_scores["Zed"], vec![1.0, 2.0]);
}
