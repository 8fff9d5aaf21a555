pub mod extractor;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One entry of a resolved playlist, exactly as the extraction service
/// reports it. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub title: String,
    pub video_id: String,
    pub video_url: String,
    /// 1-based ordinal within the playlist.
    pub position: u32,
}

/// The outcome of resolving one playlist URL. `count` must equal the number
/// of entries; `videos` preserves playlist order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistResult {
    pub count: usize,
    pub videos: Vec<Video>,
}

impl PlaylistResult {
    /// Strict schema check applied to every payload received from upstream.
    /// A response that fails here is rejected whole rather than repaired.
    pub fn validate(&self) -> Result<()> {
        if self.count != self.videos.len() {
            return Err(Error::MalformedResponse(format!(
                "count is {} but response contains {} videos",
                self.count,
                self.videos.len()
            )));
        }

        for video in &self.videos {
            if video.position == 0 {
                return Err(Error::MalformedResponse(format!(
                    "video {} has position 0 (positions are 1-based)",
                    video.video_id
                )));
            }
        }

        Ok(())
    }

    /// Case-insensitive substring filter against title or video id, the
    /// search the frontend applies client-side. An empty or whitespace-only
    /// query returns every entry in playlist order.
    pub fn filter(&self, query: &str) -> Vec<&Video> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.videos.iter().collect();
        }

        self.videos
            .iter()
            .filter(|video| {
                video.title.to_lowercase().contains(&query)
                    || video.video_id.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Clipboard export: one `<position>. <title>` line per entry, playlist
    /// order, joined with newlines.
    pub fn export_titles(&self) -> String {
        self.videos
            .iter()
            .map(|video| format!("{}. {}", video.position, video.title))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}
