//! Per-item download pipeline with bounded retry.
//!
//! One pipeline run moves an item through key fetch, conversion, and artifact
//! fetch. Key fetch and conversion form a single retryable unit: every retry
//! starts over with a fresh one-time key, so a stale key can never mask a
//! conversion failure. Once a conversion succeeds the artifact fetch runs at
//! most once; its failures are terminal for the item.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use super::auth::TokenProvider;
use super::convert::{Conversion, ConversionClient};
use super::error::DownloadError;
use super::fetch::ArtifactFetcher;
use super::filename::audio_file_path;
use super::retry::{RetryDecision, RetryPolicy, classify_error};
use crate::playlist::PlaylistItem;

/// Downloads a single playlist item end to end.
///
/// Composes [`TokenProvider`] -> [`ConversionClient`] -> [`ArtifactFetcher`]
/// with a bounded retry loop around the first two stages. All state is local
/// to one invocation; a `Downloader` can be shared across concurrent tasks.
#[derive(Debug)]
pub struct Downloader {
    tokens: TokenProvider,
    converter: ConversionClient,
    fetcher: ArtifactFetcher,
    policy: RetryPolicy,
    output_dir: PathBuf,
}

impl Downloader {
    /// Creates a downloader writing into `output_dir`.
    #[must_use]
    pub fn new(
        tokens: TokenProvider,
        converter: ConversionClient,
        fetcher: ArtifactFetcher,
        policy: RetryPolicy,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tokens,
            converter,
            fetcher,
            policy,
            output_dir: output_dir.into(),
        }
    }

    /// Returns the configured output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Downloads one item, returning the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns the terminal [`DownloadError`] once the retry policy is
    /// exhausted for the key+conversion stage, or immediately for artifact
    /// and filesystem failures.
    #[instrument(skip(self, item), fields(title = %item.title, url = %item.url))]
    pub async fn download_item(&self, item: &PlaylistItem) -> Result<PathBuf, DownloadError> {
        let (conversion, attempts) = self.convert_with_retry(item).await?;

        let dest = audio_file_path(&self.output_dir, &item.title);
        let bytes = self.fetcher.fetch(&conversion.download_url, &dest).await?;

        info!(
            path = %dest.display(),
            bytes,
            attempts,
            "finished downloading item"
        );
        Ok(dest)
    }

    /// Runs the key-fetch + conversion unit until it succeeds or the retry
    /// policy is exhausted, returning the conversion and total attempt count.
    async fn convert_with_retry(
        &self,
        item: &PlaylistItem,
    ) -> Result<(Conversion, u32), DownloadError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(attempt, "attempting conversion");

            // Fresh key every attempt; token and conversion failures share
            // one retry budget.
            let result = async {
                let token = self.tokens.obtain_token().await?;
                self.converter.convert(&item.url, &token).await
            }
            .await;

            match result {
                Ok(conversion) => return Ok((conversion, attempt)),
                Err(e) => {
                    match self.policy.should_retry(classify_error(&e), attempt) {
                        RetryDecision::Retry {
                            delay,
                            attempt: next_attempt,
                        } => {
                            debug!(
                                title = %item.title,
                                attempt = next_attempt,
                                max_attempts = self.policy.max_attempts(),
                                delay_ms = delay.as_millis(),
                                error = %e,
                                "retrying conversion"
                            );
                            if !delay.is_zero() {
                                tokio::time::sleep(delay).await;
                            }
                        }
                        RetryDecision::DoNotRetry { reason } => {
                            debug!(title = %item.title, %reason, "not retrying conversion");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }
}
