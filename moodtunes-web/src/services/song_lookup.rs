//! Song lookup backends
//!
//! Given a (mood, artist) pair, return an ordered, finite list of songs.
//! Backends are interchangeable behind [`SongLookup`]; the flow driver holds
//! an `Arc<dyn SongLookup>` and never knows which one it talks to.

use async_trait::async_trait;
use moodtunes_common::config::{LookupBackend, LookupConfig};
use moodtunes_common::{ArtistSelection, MoodSelection, Result, SongResult};
use reqwest::Url;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::youtube_client::YouTubeSongLookup;

const YOUTUBE_RESULTS_URL: &str = "https://www.youtube.com/results";

const THUMBNAILS: [&str; 2] = [
    "https://images.unsplash.com/photo-1493225457124-a3eb161ffa5f?w=120&h=120&fit=crop",
    "https://images.unsplash.com/photo-1511379938547-c1f69419868d?w=120&h=120&fit=crop",
];

/// Result of a lookup that did not fail
///
/// "No results" is an outcome, not an error; both it and a failure render as
/// an explanatory state in the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "songs", rename_all = "snake_case")]
pub enum LookupOutcome {
    Results(Vec<SongResult>),
    NoResults,
}

impl LookupOutcome {
    /// Wrap a result list, mapping an empty list to `NoResults`
    pub fn from_songs(songs: Vec<SongResult>) -> Self {
        if songs.is_empty() {
            LookupOutcome::NoResults
        } else {
            LookupOutcome::Results(songs)
        }
    }

    pub fn songs(&self) -> &[SongResult] {
        match self {
            LookupOutcome::Results(songs) => songs,
            LookupOutcome::NoResults => &[],
        }
    }
}

/// Song search backend
#[async_trait]
pub trait SongLookup: Send + Sync {
    /// Backend identifier for logs and build info (e.g. "mock", "youtube")
    fn backend_name(&self) -> &'static str;

    /// Search for songs matching the mood and artist
    ///
    /// Every call produces a fresh list; results are never merged with a
    /// previous call's.
    async fn search(&self, mood: &MoodSelection, artist: &ArtistSelection)
        -> Result<LookupOutcome>;
}

/// Build the YouTube search-page URL for a free-text query
pub fn youtube_search_url(query: &str) -> String {
    Url::parse_with_params(YOUTUBE_RESULTS_URL, &[("search_query", query)])
        .map(String::from)
        .unwrap_or_else(|_| YOUTUBE_RESULTS_URL.to_string())
}

// ============================================================================
// Mock backend
// ============================================================================

/// Templated results after a fixed delay
///
/// Stands in for a real search service: interpolates mood and artist into
/// title and URL templates and never fails.
#[derive(Debug, Clone)]
pub struct MockSongLookup {
    latency: Duration,
    result_count: usize,
}

impl MockSongLookup {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            result_count: 5,
        }
    }

    /// Limit the number of entries (at most the five templates)
    pub fn with_result_count(mut self, result_count: usize) -> Self {
        self.result_count = result_count;
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    fn build_results(&self, mood: &str, artist: &str) -> Vec<SongResult> {
        let templates = [
            (
                format!("{} Vibes - {}", mood, artist),
                format!("{} {} songs", artist, mood),
                "3:45",
            ),
            (
                format!("Best of {} - {} Mix", artist, mood),
                format!("{} hits", artist),
                "4:12",
            ),
            (
                format!("{} - {} Collection", artist, mood),
                format!("{} latest songs", artist),
                "3:28",
            ),
            (
                format!("{} Mood - {} Special", mood, artist),
                format!("{} {}", artist, mood),
                "4:05",
            ),
            (
                format!("{} - {} Playlist", artist, mood),
                format!("{} playlist", artist),
                "3:52",
            ),
        ];

        templates
            .into_iter()
            .take(self.result_count)
            .enumerate()
            .map(|(index, (title, query, duration))| SongResult {
                id: format!("mock-{}", index + 1),
                title,
                artist: artist.to_string(),
                thumbnail: THUMBNAILS[index % THUMBNAILS.len()].to_string(),
                url: youtube_search_url(&query),
                duration: duration.to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl SongLookup for MockSongLookup {
    fn backend_name(&self) -> &'static str {
        "mock"
    }

    async fn search(
        &self,
        mood: &MoodSelection,
        artist: &ArtistSelection,
    ) -> Result<LookupOutcome> {
        debug!(
            "Mock lookup for mood='{}' artist='{}' ({:?} delay)",
            mood, artist, self.latency
        );
        tokio::time::sleep(self.latency).await;

        Ok(LookupOutcome::from_songs(
            self.build_results(mood.as_str(), &artist.name),
        ))
    }
}

/// Construct the configured backend
///
/// A YouTube client that cannot be built falls back to the mock backend.
pub fn build_song_lookup(config: &LookupConfig) -> Arc<dyn SongLookup> {
    if config.effective_backend() == LookupBackend::Youtube {
        let api_key = config.youtube_api_key.clone().unwrap_or_default();
        match YouTubeSongLookup::new(api_key, config.result_count, config.youtube_region.clone()) {
            Ok(client) => {
                info!("Song lookup backend: YouTube Data API");
                return Arc::new(client);
            }
            Err(e) => warn!("YouTube client unavailable ({}); using mock backend", e),
        }
    }

    info!(
        "Song lookup backend: mock ({} ms latency)",
        config.latency_ms
    );
    Arc::new(MockSongLookup::new(config.latency()).with_result_count(config.result_count))
}
