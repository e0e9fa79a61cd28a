//! YouTube Data API search client
//!
//! Real song lookup backend. Queries `search.list` for videos matching
//! "<artist> <mood> songs" and maps each hit to a watch URL.

use async_trait::async_trait;
use moodtunes_common::{ArtistSelection, Error, MoodSelection, Result, SongResult};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use super::song_lookup::{LookupOutcome, SongLookup};

const YOUTUBE_SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch";
const USER_AGENT: &str = concat!("MoodTunes/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// YouTube client errors
#[derive(Debug, Error)]
pub enum YouTubeError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid or exhausted API key")]
    InvalidApiKey,
}

impl From<YouTubeError> for Error {
    fn from(err: YouTubeError) -> Self {
        Error::Lookup(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    channel_title: Option<String>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    default: Option<Thumbnail>,
    medium: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

/// YouTube-backed song lookup
pub struct YouTubeSongLookup {
    http_client: reqwest::Client,
    api_key: String,
    result_count: usize,
    region: Option<String>,
}

impl YouTubeSongLookup {
    pub fn new(api_key: String, result_count: usize, region: Option<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| YouTubeError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            result_count,
            region,
        })
    }

    fn query(mood: &MoodSelection, artist: &ArtistSelection) -> String {
        format!("{} {} songs", artist.name, mood.as_str())
    }

    async fn fetch(&self, query: &str) -> std::result::Result<SearchResponse, YouTubeError> {
        let max_results = self.result_count.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("type", "video"),
            ("maxResults", max_results.as_str()),
            ("q", query),
            ("key", self.api_key.as_str()),
        ];
        if let Some(region) = self.region.as_deref() {
            params.push(("regionCode", region));
        }

        tracing::debug!(query = %query, "Querying YouTube search API");

        let response = self
            .http_client
            .get(YOUTUBE_SEARCH_URL)
            .query(&params)
            .send()
            .await
            .map_err(|e| YouTubeError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == 400 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            if body.contains("keyInvalid") || body.contains("quotaExceeded") {
                return Err(YouTubeError::InvalidApiKey);
            }
            return Err(YouTubeError::ApiError(status.as_u16(), body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YouTubeError::ApiError(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| YouTubeError::ParseError(e.to_string()))
    }
}

fn to_song(item: SearchItem, artist: &ArtistSelection) -> Option<SongResult> {
    let video_id = item.id.video_id?;
    let snippet = item.snippet?;
    let thumbnail = snippet
        .thumbnails
        .and_then(|t| t.medium.or(t.default))
        .map(|t| t.url)
        .unwrap_or_default();

    Some(SongResult {
        url: format!("{}?v={}", YOUTUBE_WATCH_URL, video_id),
        id: video_id,
        title: snippet.title,
        artist: snippet
            .channel_title
            .unwrap_or_else(|| artist.name.clone()),
        thumbnail,
        // search.list does not report durations
        duration: String::new(),
    })
}

#[async_trait]
impl SongLookup for YouTubeSongLookup {
    fn backend_name(&self) -> &'static str {
        "youtube"
    }

    async fn search(
        &self,
        mood: &MoodSelection,
        artist: &ArtistSelection,
    ) -> Result<LookupOutcome> {
        let query = Self::query(mood, artist);
        let response = self.fetch(&query).await?;

        let songs: Vec<SongResult> = response
            .items
            .into_iter()
            .filter_map(|item| to_song(item, artist))
            .take(self.result_count)
            .collect();

        tracing::info!(
            query = %query,
            results = songs.len(),
            "YouTube lookup complete"
        );

        Ok(LookupOutcome::from_songs(songs))
    }
}
