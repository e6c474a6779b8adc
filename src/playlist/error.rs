//! Error types for playlist listing.

use thiserror::Error;

/// Errors that can occur while listing a playlist's items.
#[derive(Debug, Error)]
pub enum PlaylistError {
    /// The playlist URL carries no `list` query parameter or is not a URL.
    #[error("invalid playlist URL: {url}")]
    InvalidUrl {
        /// The offending URL string.
        url: String,
    },

    /// The playlist API was unreachable or the connection failed mid-flight.
    #[error("playlist request failed: {source}")]
    Request {
        /// The underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    /// The playlist API answered with a body that does not decode as a
    /// playlist page.
    #[error("playlist API returned a malformed response: {source}")]
    MalformedResponse {
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },

    /// The playlist API returned a non-success HTTP status.
    #[error("playlist API returned HTTP {status}")]
    Api {
        /// The HTTP status code.
        status: u16,
    },
}

impl PlaylistError {
    /// Creates an invalid-URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a transport error.
    pub fn request(source: reqwest::Error) -> Self {
        Self::Request { source }
    }

    /// Creates a malformed-response error.
    pub fn malformed(source: reqwest::Error) -> Self {
        Self::MalformedResponse { source }
    }

    /// Creates an API status error.
    pub fn api(status: u16) -> Self {
        Self::Api { status }
    }
}
