//! `reqwest` bindings for the backend REST API.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::api::{require_non_blank, QueueApi};
use crate::error::{DashboardError, Result};
use crate::protocol::{
    AddPlayerRequest, AddPlayerResponse, ErrorResponse, LeaderboardEntry, LeaderboardResponse,
    QueueResponse, ScoresResponse, SearchResponse, StatsResponse,
};

const SEARCH_FIELDS_REQUIRED: &str = "Both Summoner Name and Tagline are required.";

/// HTTP client for the dashboard backend.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Client rooted at `base_url`, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Use a preconfigured `reqwest::Client` (proxies, TLS roots, timeouts).
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /api/search`: score the searched player's last team.
    ///
    /// The backend also pops the front of the queue as part of this call; that
    /// change arrives over the push channel like any other.
    ///
    /// # Errors
    ///
    /// [`DashboardError::Validation`] if either field is blank, otherwise see
    /// [`QueueApi::fetch_queue`].
    pub async fn search(&self, summoner_name: &str, summoner_tagline: &str) -> Result<SearchResponse> {
        let name = require_non_blank(summoner_name, SEARCH_FIELDS_REQUIRED)?;
        let tagline = require_non_blank(summoner_tagline, SEARCH_FIELDS_REQUIRED)?;

        tracing::debug!(%name, %tagline, "searching player");
        let request = self
            .client
            .get(self.url("/api/search"))
            .query(&[("summoner_name", name), ("summoner_tagline", tagline)]);
        read_json(request.send().await).await
    }

    /// `GET /api/leaderboard`.
    ///
    /// # Errors
    ///
    /// See [`QueueApi::fetch_queue`].
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        let body: LeaderboardResponse =
            read_json(self.client.get(self.url("/api/leaderboard")).send().await).await?;
        Ok(body.leaderboard)
    }

    /// `GET /api/stats`.
    ///
    /// # Errors
    ///
    /// See [`QueueApi::fetch_queue`].
    pub async fn stats(&self) -> Result<StatsResponse> {
        read_json(self.client.get(self.url("/api/stats")).send().await).await
    }

    /// `GET /api/scores`: recent game scores keyed by player name.
    ///
    /// # Errors
    ///
    /// See [`QueueApi::fetch_queue`].
    pub async fn scores(&self) -> Result<BTreeMap<String, Vec<f64>>> {
        let body: ScoresResponse =
            read_json(self.client.get(self.url("/api/scores")).send().await).await?;
        Ok(body.player_scores)
    }
}

#[async_trait]
impl QueueApi for HttpBackend {
    async fn fetch_queue(&self) -> Result<Vec<String>> {
        let body: QueueResponse =
            read_json(self.client.get(self.url("/api/queue")).send().await).await?;
        Ok(body.queue)
    }

    async fn add_player(&self, player_name: &str) -> Result<String> {
        let request = self
            .client
            .post(self.url("/api/queue"))
            .json(&AddPlayerRequest {
                player_name: player_name.to_string(),
            });
        let body: AddPlayerResponse = read_json(request.send().await).await?;
        Ok(body.message)
    }
}

/// Decode a 2xx body as `T`, or turn the response into a [`DashboardError`].
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Result<reqwest::Response>,
) -> Result<T> {
    let response = response.map_err(|e| DashboardError::Network(e.to_string()))?;
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| DashboardError::Network(e.to_string()))?;

    if status.is_success() {
        return Ok(serde_json::from_slice(&bytes)?);
    }

    match serde_json::from_slice::<ErrorResponse>(&bytes) {
        Ok(body) => Err(DashboardError::ServerRejection {
            status: status.as_u16(),
            message: body.error,
        }),
        Err(_) => Err(DashboardError::Network(format!(
            "unexpected status {status}"
        ))),
    }
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
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request text.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::sync::oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (request_tx, request_rx) = tokio::sync::oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let raw = read_request(&mut socket).await;
            let _ = request_tx.send(raw);

            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        (format!("http://{addr}"), request_rx)
    }

    /// Read headers plus a `content-length` body.
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut raw = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&raw).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if raw.len() >= header_end + 4 + content_length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&raw).to_string()
    }

    #[tokio::test]
    async fn fetch_queue_reads_queue_field() {
        let (url, request) = serve_once("200 OK", r#"{"queue":["Alice","Bob"]}"#).await;
        let backend = HttpBackend::new(url);

        let queue = backend.fetch_queue().await.unwrap();
        assert_eq!(queue, vec!["Alice".to_string(), "Bob".to_string()]);
        assert!(request.await.unwrap().starts_with("GET /api/queue"));
    }

    #[tokio::test]
    async fn add_player_returns_server_message() {
        let (url, request) = serve_once(
            "201 Created",
            r#"{"message":"Alice added to the queue.","queue":["Alice"]}"#,
        )
        .await;
        let backend = HttpBackend::new(url);

        let message = backend.add_player("Alice").await.unwrap();
        assert_eq!(message, "Alice added to the queue.");

        let raw = request.await.unwrap();
        assert!(raw.starts_with("POST /api/queue"));
        assert!(raw.contains(r#"{"player_name":"Alice"}"#));
    }

    #[tokio::test]
    async fn duplicate_player_is_a_server_rejection() {
        let (url, _request) =
            serve_once("400 Bad Request", r#"{"error":"Player already in the queue."}"#).await;
        let backend = HttpBackend::new(url);

        match backend.add_player("Alice").await.unwrap_err() {
            DashboardError::ServerRejection { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Player already in the queue.");
            }
            other => panic!("expected ServerRejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_is_a_network_error() {
        let (url, _request) = serve_once("502 Bad Gateway", "upstream down").await;
        let backend = HttpBackend::new(url);
        let err = backend.fetch_queue().await.unwrap_err();
        assert!(matches!(err, DashboardError::Network(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let backend = HttpBackend::new("http://127.0.0.1:1");
        let err = backend.fetch_queue().await.unwrap_err();
        assert!(matches!(err, DashboardError::Network(_)));
    }

    #[tokio::test]
    async fn search_rejects_blank_tagline_without_request() {
        let backend = HttpBackend::new("http://127.0.0.1:1");
        let err = backend.search("Faker", "   ").await.unwrap_err();
        assert!(matches!(err, DashboardError::Validation(ref m) if m == SEARCH_FIELDS_REQUIRED));
    }

    #[tokio::test]
    async fn search_sends_trimmed_query() {
        let (url, request) = serve_once(
            "200 OK",
            r#"{"scores":[{"summonerName":"Low","score":1.5},{"summonerName":"High","score":9.0}],
               "player_to_remove":{"summonerName":"Low","score":1.5},
               "new_player_added":"Alice"}"#,
        )
        .await;
        let backend = HttpBackend::new(format!("{url}/"));

        let result = backend.search(" Faker ", " KR1 ").await.unwrap();
        assert_eq!(result.scores.len(), 2);
        assert_eq!(
            result.player_to_remove.map(|p| p.summoner_name).as_deref(),
            Some("Low")
        );
        assert_eq!(result.new_player_added.as_deref(), Some("Alice"));

        let raw = request.await.unwrap();
        assert!(raw.starts_with("GET /api/search?summoner_name=Faker&summoner_tagline=KR1"));
    }

    #[tokio::test]
    async fn scores_are_keyed_by_player() {
        let (url, _request) = serve_once(
            "200 OK",
            r#"{"player_scores":{"Alice":[1,2,3,4,5,6,7,8,9,10]}}"#,
        )
        .await;
        let backend = HttpBackend::new(url);

        let scores = backend.scores().await.unwrap();
        assert_eq!(scores["Alice"].len(), 10);
        assert_eq!(scores["Alice"][9], 10.0);
    }

    #[tokio::test]
    async fn stats_tolerate_missing_categories() {
        let (url, _request) = serve_once(
            "200 OK",
            r#"{"most_kills":[{"summoner_name":"Alice","value":42}]}"#,
        )
        .await;
        let backend = HttpBackend::new(url);

        let stats = backend.stats().await.unwrap();
        assert_eq!(stats.most_kills[0].summoner_name, "Alice");
        assert!(stats.most_cs.is_empty());
    }
}
