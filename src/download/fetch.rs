//! Artifact fetcher: streams a converted file from its URL to disk.
//!
//! The fetcher opens a byte stream from the artifact URL and copies it into
//! the destination file through a buffered writer, overwriting any existing
//! file at that path. The destination directory is created if absent. On a
//! stream or write failure the partial file is removed so a failed item does
//! not leave truncated data behind.

use std::path::Path;

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

use super::error::DownloadError;

/// Streams remote artifacts into local files.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    client: reqwest::Client,
}

impl ArtifactFetcher {
    /// Creates a fetcher using the given HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Downloads `url` to `dest`, returning the number of bytes written.
    ///
    /// Ensures the parent directory of `dest` exists before writing. An
    /// existing file at `dest` is truncated and overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ArtifactRequest`] on transport errors,
    /// [`DownloadError::ArtifactStatus`] on a non-success HTTP status, and
    /// [`DownloadError::Io`] on filesystem faults. None of these are retried
    /// by the caller.
    #[instrument(skip(self), fields(url = %url, dest = %dest.display()))]
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::io(parent.to_path_buf(), e))?;
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::artifact_request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::artifact_status(url, status.as_u16()));
        }

        let mut file = File::create(dest)
            .await
            .map_err(|e| DownloadError::io(dest.to_path_buf(), e))?;

        let stream_result = stream_to_file(&mut file, response, url, dest).await;

        if stream_result.is_err() {
            debug!(path = %dest.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(dest).await;
        }

        let bytes_written = stream_result?;

        info!(path = %dest.display(), bytes = bytes_written, "artifact fetched");
        Ok(bytes_written)
    }
}

/// Streams response body to file, returning bytes written.
///
/// Extracted to enable cleanup on error in the caller.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::artifact_request(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}
