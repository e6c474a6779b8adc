//! YouTube Data API v3 playlist source.
//!
//! Lists a playlist's items through the `playlistItems` endpoint with an API
//! key, following `nextPageToken` pagination until the playlist is
//! exhausted. Items without a title or video id (deleted or private videos)
//! are skipped with a warning rather than failing the whole listing.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::error::PlaylistError;
use super::{PlaylistItem, PlaylistSource, playlist_id_from_url};

/// Production base URL of the YouTube Data API v3.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Watch-URL prefix for canonical video links.
const VIDEO_BASE_URL: &str = "https://www.youtube.com/watch?v=";

/// Page size for playlist listing (API maximum).
const PAGE_SIZE: &str = "50";

/// Wire format of a `playlistItems.list` response page.
#[derive(Debug, Deserialize)]
struct PlaylistItemsPage {
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<ApiPlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylistItem {
    snippet: Option<Snippet>,
    #[serde(rename = "contentDetails")]
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

/// Playlist source backed by the YouTube Data API v3.
#[derive(Debug, Clone)]
pub struct YouTubePlaylist {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl YouTubePlaylist {
    /// Creates a source using the production API base URL.
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::with_api_base(client, api_key, DEFAULT_API_BASE)
    }

    /// Creates a source against a custom API base URL. Used by tests against
    /// a mock server.
    #[must_use]
    pub fn with_api_base(
        client: reqwest::Client,
        api_key: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            api_base: api_base.into(),
        }
    }

    /// Fetches one page of playlist items.
    async fn fetch_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemsPage, PlaylistError> {
        let url = format!("{}/playlistItems", self.api_base);
        let mut request = self.client.get(&url).query(&[
            ("part", "snippet,contentDetails"),
            ("maxResults", PAGE_SIZE),
            ("playlistId", playlist_id),
            ("key", self.api_key.as_str()),
        ]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(PlaylistError::request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaylistError::api(status.as_u16()));
        }

        response.json().await.map_err(PlaylistError::malformed)
    }
}

#[async_trait]
impl PlaylistSource for YouTubePlaylist {
    #[instrument(skip(self), fields(playlist_url = %playlist_url))]
    async fn list_items(&self, playlist_url: &str) -> Result<Vec<PlaylistItem>, PlaylistError> {
        let playlist_id = playlist_id_from_url(playlist_url)?;

        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(&playlist_id, page_token.as_deref()).await?;

            for api_item in page.items {
                let title = api_item.snippet.and_then(|s| s.title);
                let video_id = api_item.content_details.and_then(|c| c.video_id);
                match (title, video_id) {
                    (Some(title), Some(video_id)) => {
                        items.push(PlaylistItem::new(
                            title,
                            format!("{VIDEO_BASE_URL}{video_id}"),
                        ));
                    }
                    _ => {
                        // Deleted/private videos come back without details
                        warn!("skipping playlist entry without title or video id");
                    }
                }
            }

            debug!(total = items.len(), "fetched playlist page");

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(items)
    }
}
