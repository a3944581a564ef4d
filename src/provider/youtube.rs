use crate::provider::{FetchError, PlaylistClient, PlaylistEntry, PlaylistPage};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// The API refuses larger pages.
pub const MAX_PAGE_SIZE: u32 = 50;

pub struct YoutubeClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct YoutubePlaylistItemsResponse {
    items: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct YoutubePlaylistItem {
    snippet: YoutubeItemSnippet,
}

#[derive(Deserialize)]
struct YoutubeItemSnippet {
    title: String,
    position: u32,
    #[serde(rename = "resourceId")]
    resource_id: YoutubeResourceId,
}

#[derive(Deserialize)]
struct YoutubeResourceId {
    #[serde(rename = "videoId")]
    video_id: String,
}

impl YoutubePlaylistItem {
    fn into_entry(self) -> PlaylistEntry {
        PlaylistEntry {
            video_id: self.snippet.resource_id.video_id,
            title: self.snippet.title,
            position: self.snippet.position,
        }
    }
}

impl Default for YoutubeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YoutubeClient {
    pub fn new() -> Self {
        Self {
            base_url: API_BASE.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn playlist_items_url(&self, playlist_id: &str, max_results: u32, api_key: &str) -> String {
        format!(
            "{}/playlistItems?part=snippet&maxResults={}&playlistId={}&key={}",
            self.base_url,
            max_results,
            urlencoding::encode(playlist_id),
            urlencoding::encode(api_key),
        )
    }

    fn validate(playlist_id: &str, max_results: u32, api_key: &str) -> Result<(), FetchError> {
        let reason = if playlist_id.trim().is_empty() {
            "playlist id is empty".to_string()
        } else if !(1..=MAX_PAGE_SIZE).contains(&max_results) {
            format!("max results {} outside 1..={}", max_results, MAX_PAGE_SIZE)
        } else if api_key.trim().is_empty() {
            "api key is empty".to_string()
        } else {
            return Ok(());
        };

        Err(FetchError::InvalidRequest { reason })
    }
}

/// Decode a `playlistItems` body.
///
/// The envelope must be valid JSON with an `items` array. Individual items
/// that don't match the schema, or carry an empty video id, are skipped.
pub fn decode_page(body: &str) -> Result<PlaylistPage, FetchError> {
    let response: YoutubePlaylistItemsResponse =
        serde_json::from_str(body).map_err(|e| FetchError::DecodeFailure {
            cause: e.to_string(),
        })?;

    let mut entries = Vec::with_capacity(response.items.len());

    for (index, raw) in response.items.into_iter().enumerate() {
        match serde_json::from_value::<YoutubePlaylistItem>(raw) {
            Ok(item) if item.snippet.resource_id.video_id.is_empty() => {
                warn!(index, "Skipping playlist item with empty video id");
            }
            Ok(item) => entries.push(item.into_entry()),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed playlist item");
            }
        }
    }

    Ok(PlaylistPage::new(entries))
}

#[async_trait]
impl PlaylistClient for YoutubeClient {
    async fn fetch(
        &self,
        playlist_id: &str,
        max_results: u32,
        api_key: &str,
    ) -> Result<PlaylistPage, FetchError> {
        Self::validate(playlist_id, max_results, api_key)?;

        let url = self.playlist_items_url(playlist_id, max_results, api_key);
        debug!(playlist_id = %playlist_id, max_results, "Fetching playlist items");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::TransportFailure {
                cause: e.without_url().to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "YouTube API rejected playlist request");
            return Err(FetchError::RemoteRejected {
                status_code: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::TransportFailure {
                cause: e.without_url().to_string(),
            })?;

        let page = decode_page(&body)?;
        debug!(playlist_id = %playlist_id, items = page.entries().len(), "Decoded playlist page");

        Ok(page)
    }
}
