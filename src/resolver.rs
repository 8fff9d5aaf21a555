use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::playlist::extractor::ExtractorClient;
use crate::playlist::PlaylistResult;
use crate::storage::{CacheEntry, CacheStore, Freshness, DEFAULT_RETENTION};

/// The proxy-cache core: resolves a playlist URL to a `PlaylistResult`,
/// serving repeated requests for the same URL from the in-memory store for
/// the duration of the retention window.
///
/// The cache key is the verbatim URL string. Concurrent misses on one key
/// may each fetch upstream; last write wins. Failed fetches never populate
/// the store.
pub struct PlaylistResolver {
    store: Arc<dyn CacheStore>,
    client: ExtractorClient,
    retention: Duration,
}

impl PlaylistResolver {
    pub fn new(store: Arc<dyn CacheStore>, client: ExtractorClient) -> Self {
        Self {
            store,
            client,
            retention: DEFAULT_RETENTION,
        }
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub async fn resolve(&self, playlist_url: &str) -> Result<PlaylistResult> {
        if playlist_url.is_empty() {
            return Err(Error::InvalidRequest(
                "Playlist URL is required".to_string(),
            ));
        }

        let now = SystemTime::now();
        let entry = self.store.get(playlist_url);

        match Freshness::of(entry.as_ref(), now, self.retention) {
            Freshness::Fresh => {
                // Unwrap is safe: Fresh implies an entry exists.
                let entry = entry.expect("fresh entry present");
                debug!(
                    "Cache hit for {} (age {:?})",
                    playlist_url,
                    entry.age(now)
                );
                return Ok(entry.data);
            }
            Freshness::Stale => {
                debug!("Cache entry for {} is stale, refetching", playlist_url);
            }
            Freshness::Absent => {
                debug!("Cache miss for {}", playlist_url);
            }
        }

        let playlist = self.client.fetch_playlist(playlist_url).await?;
        info!(
            "Resolved {} videos for {}",
            playlist.count, playlist_url
        );

        self.store
            .put(playlist_url.to_string(), CacheEntry::new(playlist.clone()));

        Ok(playlist)
    }
}
