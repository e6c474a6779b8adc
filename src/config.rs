//! Endpoint configuration and HTTP client construction.
//!
//! All components take a constructed [`reqwest::Client`] and their endpoint
//! URLs explicitly; there is no process-wide client singleton. The binary
//! builds one client here and hands clones to the token provider, the
//! conversion client, and the artifact fetcher so they share a connection
//! pool.

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes, conversion jobs can be slow).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Default one-time key endpoint of the conversion service.
pub const DEFAULT_AUTH_URL: &str = "https://cnv.cx/v2/sanity/key";

/// Default conversion endpoint.
pub const DEFAULT_CONVERT_URL: &str = "https://cnv.cx/v2/converter";

/// Origin header the conversion service expects on every request.
pub const DEFAULT_ORIGIN: &str = "https://frame.y2meta-uk.com";

/// Default output directory for downloaded audio files.
pub const DEFAULT_OUTPUT_DIR: &str = "download";

/// Endpoint URLs of the conversion service.
///
/// Defaults point at the production service; tests inject mock server URLs.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// One-time key endpoint (GET).
    pub auth_url: String,
    /// Conversion endpoint (POST).
    pub convert_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            convert_url: DEFAULT_CONVERT_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Creates endpoints rooted at a custom base URL, preserving the
    /// production path layout. Used by tests against a mock server.
    #[must_use]
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            auth_url: format!("{base}/v2/sanity/key"),
            convert_url: format!("{base}/v2/converter"),
        }
    }
}

/// Builds the shared HTTP client with default timeouts and the Origin header
/// required by the conversion service.
///
/// # Errors
///
/// Returns [`reqwest::Error`] if the client builder fails, e.g. when TLS
/// backend initialization fails.
pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    build_http_client_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
}

/// Builds the shared HTTP client with explicit timeout values.
///
/// # Errors
///
/// Returns [`reqwest::Error`] if the client builder fails.
pub fn build_http_client_with_timeouts(
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = reqwest::header::HeaderMap::new();
    if let Ok(origin) = reqwest::header::HeaderValue::from_str(DEFAULT_ORIGIN) {
        headers.insert(reqwest::header::ORIGIN, origin);
    }

    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .read_timeout(Duration::from_secs(read_timeout_secs))
        .default_headers(headers)
        .build()
}
