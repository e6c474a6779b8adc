//! Playlist items and the item-source seam.
//!
//! The download engine only needs an ordered sequence of `(title, url)`
//! pairs. [`PlaylistSource`] is the seam that produces it; [`YouTubePlaylist`]
//! is the YouTube Data API implementation used by the binary, and tests
//! substitute their own sources.

mod error;
mod youtube;

pub use error::PlaylistError;
pub use youtube::YouTubePlaylist;

use async_trait::async_trait;
use url::Url;

/// One playlist entry: a video title and its canonical watch URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    /// Video title, used (sanitized) as the output filename stem.
    pub title: String,
    /// Canonical video URL submitted to the conversion service.
    pub url: String,
}

impl PlaylistItem {
    /// Creates a playlist item.
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Source of playlist items.
///
/// Implementations materialize the full item list; pagination stays behind
/// this seam.
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// Lists every item of the playlist referenced by `playlist_url`.
    ///
    /// # Errors
    ///
    /// Returns [`PlaylistError`] when the URL is invalid or the backing API
    /// fails.
    async fn list_items(&self, playlist_url: &str) -> Result<Vec<PlaylistItem>, PlaylistError>;
}

/// Extracts the playlist id (`list` query parameter) from a playlist URL.
///
/// # Errors
///
/// Returns [`PlaylistError::InvalidUrl`] when the string does not parse as a
/// URL or carries no `list` parameter.
pub fn playlist_id_from_url(playlist_url: &str) -> Result<String, PlaylistError> {
    let parsed = Url::parse(playlist_url).map_err(|_| PlaylistError::invalid_url(playlist_url))?;

    parsed
        .query_pairs()
        .find(|(key, value)| key == "list" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| PlaylistError::invalid_url(playlist_url))
}
