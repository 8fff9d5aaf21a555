use std::time::Duration;

use reqwest::{Client, Response};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::playlist::PlaylistResult;

/// HTTP client for the remote extraction service. One outbound request per
/// call; no retries — a failed fetch propagates to the caller.
#[derive(Debug, Clone)]
pub struct ExtractorClient {
    client: Client,
    base_url: String,
    timeout_duration: Duration,
    user_agent: String,
}

impl ExtractorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_duration: Duration::from_secs(30),
            user_agent: format!("playlist-proxy/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_duration = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch and validate the playlist for `playlist_url`. The URL goes out
    /// as a percent-encoded `playlist_url` query parameter.
    pub async fn fetch_playlist(&self, playlist_url: &str) -> Result<PlaylistResult> {
        let endpoint = format!("{}/get_playlist", self.base_url);
        debug!("Fetching playlist from {}: {}", endpoint, playlist_url);

        let response = timeout(
            self.timeout_duration,
            self.fetch_response(&endpoint, playlist_url),
        )
        .await
        .map_err(|_| Error::Timeout(format!("Request for {} timed out", playlist_url)))?;

        let response = response?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!("Extraction service returned HTTP {} for {}", status, playlist_url);
            return Err(Error::UpstreamStatus(status));
        }

        let playlist: PlaylistResult = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("invalid JSON body: {}", e)))?;

        playlist.validate()?;

        debug!(
            "Extraction service returned {} videos for {}",
            playlist.count, playlist_url
        );

        Ok(playlist)
    }

    async fn fetch_response(&self, endpoint: &str, playlist_url: &str) -> Result<Response> {
        let response = self
            .client
            .get(endpoint)
            .query(&[("playlist_url", playlist_url)])
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Request failed: {}", e)))?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_PLAYLIST_RESPONSE: &str = r#"{
        "count": 2,
        "videos": [
            {"title": "A", "video_id": "v1", "video_url": "https://x/v1", "position": 1},
            {"title": "B", "video_id": "v2", "video_url": "https://x/v2", "position": 2}
        ]
    }"#;

    #[tokio::test]
    async fn test_fetch_valid_playlist() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get_playlist"))
            .and(query_param("playlist_url", "https://example.com/playlist?list=abc"))
            .and(header("accept", "application/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_PLAYLIST_RESPONSE)
                    .insert_header("content-type", "application/json"),
            )
            .mount(&mock_server)
            .await;

        let client = ExtractorClient::new(mock_server.uri());
        let result = client
            .fetch_playlist("https://example.com/playlist?list=abc")
            .await
            .unwrap();

        assert_eq!(result.count, 2);
        assert_eq!(result.videos[0].title, "A");
        assert_eq!(result.videos[1].video_id, "v2");
    }

    #[tokio::test]
    async fn test_fetch_encodes_query_parameter() {
        let mock_server = MockServer::start().await;

        // The raw playlist URL contains characters that must be
        // percent-encoded on the wire; wiremock matches on the decoded value.
        Mock::given(method("GET"))
            .and(path("/get_playlist"))
            .and(query_param(
                "playlist_url",
                "https://example.com/playlist?list=abc&index=1",
            ))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(VALID_PLAYLIST_RESPONSE),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ExtractorClient::new(mock_server.uri());
        let result = client
            .fetch_playlist("https://example.com/playlist?list=abc&index=1")
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_upstream_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get_playlist"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = ExtractorClient::new(mock_server.uri());
        let result = client.fetch_playlist("https://example.com/p").await;

        assert!(matches!(result, Err(Error::UpstreamStatus(503))));
    }

    #[tokio::test]
    async fn test_fetch_malformed_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get_playlist"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("{\"count\": \"not a number\"}"),
            )
            .mount(&mock_server)
            .await;

        let client = ExtractorClient::new(mock_server.uri());
        let result = client.fetch_playlist("https://example.com/p").await;

        assert!(matches!(result, Err(Error::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_count_mismatch() {
        let mock_server = MockServer::start().await;

        let body = r#"{"count": 3, "videos": [
            {"title": "A", "video_id": "v1", "video_url": "https://x/v1", "position": 1}
        ]}"#;

        Mock::given(method("GET"))
            .and(path("/get_playlist"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let client = ExtractorClient::new(mock_server.uri());
        let result = client.fetch_playlist("https://example.com/p").await;

        assert!(matches!(result, Err(Error::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get_playlist"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(5))
                    .set_body_string(VALID_PLAYLIST_RESPONSE),
            )
            .mount(&mock_server)
            .await;

        let client =
            ExtractorClient::new(mock_server.uri()).with_timeout(Duration::from_millis(100));
        let result = client.fetch_playlist("https://example.com/p").await;

        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        // Nothing listens on this port.
        let client = ExtractorClient::new("http://127.0.0.1:1")
            .with_timeout(Duration::from_secs(2));
        let result = client.fetch_playlist("https://example.com/p").await;

        assert!(matches!(result, Err(Error::Upstream(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ExtractorClient::new("https://extractor.example.com/");
        assert_eq!(client.base_url(), "https://extractor.example.com");
    }
}
