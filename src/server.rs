use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::signal;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::playlist::PlaylistResult;
use crate::resolver::PlaylistResolver;

/// Shared handler state: the resolver owns the cache store and the upstream
/// client.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<PlaylistResolver>,
}

impl AppState {
    pub fn new(resolver: Arc<PlaylistResolver>) -> Self {
        Self { resolver }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = if err.is_user_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        // The 400 envelope carries the bare message the frontend matches on;
        // everything else keeps the full error description.
        let message = match err {
            Error::InvalidRequest(msg) => msg,
            other => other.to_string(),
        };

        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        let body = serde_json::json!({
            "error": self.message,
        });
        (self.status, headers, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct PlaylistQuery {
    pub url: Option<String>,
}

/// `GET /api/playlist?url=<percent-encoded playlist URL>`
pub async fn get_playlist(
    State(state): State<AppState>,
    Query(query): Query<PlaylistQuery>,
) -> ApiResult<Json<PlaylistResult>> {
    let url = query.url.unwrap_or_default();

    let playlist = state.resolver.resolve(&url).await.map_err(|err| {
        if !err.is_user_error() {
            error!("Failed to resolve playlist: {}", err);
        }
        ApiError::from(err)
    })?;

    Ok(Json(playlist))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/playlist", get(get_playlist))
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    // Failure here only affects graceful shutdown; the process still exits
    // when the signal fires.
    if let Err(err) = signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::extractor::ExtractorClient;
    use crate::storage::MemoryStore;
    use axum::body::to_bytes;
    use serde_json::Value;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PLAYLIST_BODY: &str = r#"{
        "count": 2,
        "videos": [
            {"title": "A", "video_id": "v1", "video_url": "https://x/v1", "position": 1},
            {"title": "B", "video_id": "v2", "video_url": "https://x/v2", "position": 2}
        ]
    }"#;

    fn state_for(mock_server: &MockServer) -> AppState {
        let resolver = PlaylistResolver::new(
            Arc::new(MemoryStore::new()),
            ExtractorClient::new(mock_server.uri()),
        );
        AppState::new(Arc::new(resolver))
    }

    #[tokio::test]
    async fn test_get_playlist_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_playlist"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PLAYLIST_BODY))
            .mount(&mock_server)
            .await;

        let state = state_for(&mock_server);
        let Json(payload) = get_playlist(
            State(state),
            Query(PlaylistQuery {
                url: Some("https://example.com/playlist?list=abc".to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(payload.count, 2);
        assert_eq!(payload.videos[1].title, "B");
    }

    #[tokio::test]
    async fn test_get_playlist_missing_url_is_400() {
        let mock_server = MockServer::start().await;
        let state = state_for(&mock_server);

        let err = get_playlist(State(state), Query(PlaylistQuery { url: None }))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Playlist URL is required");
    }

    #[tokio::test]
    async fn test_get_playlist_empty_url_is_400() {
        let mock_server = MockServer::start().await;
        let state = state_for(&mock_server);

        let err = get_playlist(
            State(state),
            Query(PlaylistQuery {
                url: Some(String::new()),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_playlist_upstream_failure_is_500() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_playlist"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let state = state_for(&mock_server);
        let err = get_playlist(
            State(state),
            Query(PlaylistQuery {
                url: Some("https://example.com/p".to_string()),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("503"));
    }

    #[tokio::test]
    async fn test_api_error_serializes_json_envelope() {
        let response = ApiError {
            status: StatusCode::BAD_REQUEST,
            message: "Playlist URL is required".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["error"], "Playlist URL is required");
    }
}
