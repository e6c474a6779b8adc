//! Conversion client for the video-to-mp3 service.
//!
//! Submits a video link to the conversion endpoint with a one-time key and
//! returns the materialized download URL. The request payload is fixed policy
//! for this deployment (mp3 at 320kbps, pretty filenames); the only per-item
//! input is the video link.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::auth::AuthToken;
use super::error::DownloadError;

/// Header carrying the one-time key on conversion requests.
const AUTH_HEADER: &str = "key";

/// Fixed output format requested from the conversion service.
const TARGET_FORMAT: &str = "mp3";

/// Fixed audio bitrate requested from the conversion service.
const TARGET_BITRATE: &str = "320";

/// Fixed filename style requested from the conversion service.
const FILENAME_STYLE: &str = "pretty";

/// Fixed video codec field; required by the API even for audio output.
const VIDEO_CODEC: &str = "h264";

/// Wire format of a conversion request.
#[derive(Debug, Serialize)]
struct ConvertPayload<'a> {
    link: &'a str,
    format: &'static str,
    #[serde(rename = "audioBitrate")]
    audio_bitrate: &'static str,
    #[serde(rename = "filenameStyle")]
    filename_style: &'static str,
    #[serde(rename = "vCodec")]
    v_codec: &'static str,
}

impl<'a> ConvertPayload<'a> {
    /// Builds the fixed-policy payload for a video link.
    fn new(link: &'a str) -> Self {
        Self {
            link,
            format: TARGET_FORMAT,
            audio_bitrate: TARGET_BITRATE,
            filename_style: FILENAME_STYLE,
            v_codec: VIDEO_CODEC,
        }
    }
}

/// Wire format of a conversion response. Every field is optional; a missing
/// download URL is a failure condition, not a silent success.
#[derive(Debug, Deserialize)]
struct ConvertResponse {
    #[allow(dead_code)]
    status: Option<String>,
    url: Option<String>,
    filename: Option<String>,
}

/// A successful conversion: where to fetch the artifact from.
///
/// Transient; consumed immediately by the artifact fetcher and discarded.
#[derive(Debug)]
pub struct Conversion {
    /// Materialized artifact URL.
    pub download_url: String,
    /// Filename suggested by the service, if any. The engine names files
    /// after the playlist title instead, so this is informational.
    pub filename: Option<String>,
}

/// Client for the conversion endpoint.
#[derive(Debug, Clone)]
pub struct ConversionClient {
    client: reqwest::Client,
    convert_url: String,
}

impl ConversionClient {
    /// Creates a conversion client using the given client and endpoint.
    #[must_use]
    pub fn new(client: reqwest::Client, convert_url: impl Into<String>) -> Self {
        Self {
            client,
            convert_url: convert_url.into(),
        }
    }

    /// Submits a video link for conversion using a one-time key.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ConversionRequest`] on transport errors or an
    /// undecodable body, [`DownloadError::ConversionStatus`] on a non-success
    /// HTTP status, and [`DownloadError::ConversionEmpty`] when the response
    /// carries no download URL.
    #[instrument(skip(self, token), fields(link = %link))]
    pub async fn convert(
        &self,
        link: &str,
        token: &AuthToken,
    ) -> Result<Conversion, DownloadError> {
        let payload = ConvertPayload::new(link);

        let response = self
            .client
            .post(&self.convert_url)
            .header(AUTH_HEADER, token.as_key())
            .json(&payload)
            .send()
            .await
            .map_err(|e| DownloadError::conversion_request(link, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::conversion_status(link, status.as_u16()));
        }

        let body: ConvertResponse = response
            .json()
            .await
            .map_err(|e| DownloadError::conversion_request(link, e))?;

        match body.url {
            Some(url) if !url.is_empty() => {
                debug!(filename = ?body.filename, "conversion ready");
                Ok(Conversion {
                    download_url: url,
                    filename: body.filename,
                })
            }
            _ => Err(DownloadError::conversion_empty(link)),
        }
    }
}
