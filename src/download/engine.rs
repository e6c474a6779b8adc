//! Orchestration engine for concurrent playlist downloads.
//!
//! The engine fans playlist items out across tokio tasks, one task per item,
//! bounded by a semaphore permit. Each task runs the full per-item pipeline
//! ([`Downloader::download_item`]) to a terminal state; a failing item is
//! recorded in its [`DownloadOutcome`] and never cancels or affects sibling
//! tasks. The engine itself errors only when the concurrency substrate fails.
//!
//! # Concurrency Model
//!
//! - Each item runs in its own tokio task
//! - A semaphore permit is acquired before spawning each task
//! - Permits are released automatically when tasks complete (RAII)
//! - No shared mutable state between tasks; each item's pipeline state is
//!   fully local to its task
//! - Outcomes are returned in submission order

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::downloader::Downloader;
use super::error::DownloadError;
use crate::playlist::PlaylistItem;

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
const MAX_CONCURRENCY: usize = 100;

/// Default concurrency if not specified.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Error type for orchestration failures.
///
/// These are fatal to the whole run, unlike per-item failures which are
/// captured in [`DownloadOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,

    /// A download task could not be joined.
    #[error("download task failed to join: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Terminal record for one item's full pipeline run.
#[derive(Debug)]
pub struct DownloadOutcome {
    /// The playlist item this outcome belongs to.
    pub item: PlaylistItem,
    /// Path of the written file on success, terminal error on failure.
    pub result: Result<PathBuf, DownloadError>,
}

impl DownloadOutcome {
    /// Returns `true` if the item reached a successful terminal state.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns the terminal error, if the item failed.
    #[must_use]
    pub fn error(&self) -> Option<&DownloadError> {
        self.result.as_ref().err()
    }
}

/// Statistics from a download batch run.
///
/// Uses atomic counters for thread-safe updates from concurrent tasks.
#[derive(Debug, Default)]
pub struct DownloadStats {
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl DownloadStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of successfully completed downloads.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Returns the number of failed downloads.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Returns the total number of items processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed() + self.failed()
    }

    fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Concurrent download orchestrator.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use ytaudio_core::config::{Endpoints, build_http_client};
/// use ytaudio_core::download::{
///     ArtifactFetcher, ConversionClient, Downloader, Engine, RetryPolicy, TokenProvider,
/// };
/// use ytaudio_core::playlist::PlaylistItem;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = build_http_client()?;
/// let endpoints = Endpoints::default();
/// let downloader = Arc::new(Downloader::new(
///     TokenProvider::new(client.clone(), &endpoints.auth_url),
///     ConversionClient::new(client.clone(), &endpoints.convert_url),
///     ArtifactFetcher::new(client),
///     RetryPolicy::default(),
///     "download",
/// ));
/// let engine = Engine::new(10)?;
/// let items = vec![PlaylistItem::new("Song A", "https://www.youtube.com/watch?v=a")];
/// let outcomes = engine.download_all(&downloader, items).await?;
/// println!("{} item(s) processed", outcomes.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Engine {
    /// Semaphore for concurrency control.
    semaphore: Arc<Semaphore>,
    /// Configured concurrency limit.
    concurrency: usize,
    /// Batch statistics.
    stats: Arc<DownloadStats>,
}

impl Engine {
    /// Creates an engine with the specified concurrency limit.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-100).
    pub fn new(concurrency: usize) -> Result<Self, EngineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(EngineError::InvalidConcurrency { value: concurrency });
        }

        debug!(concurrency, "creating download engine");

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            stats: Arc::new(DownloadStats::new()),
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the batch statistics.
    #[must_use]
    pub fn stats(&self) -> &DownloadStats {
        &self.stats
    }

    /// Downloads every item, returning one outcome per item in submission
    /// order.
    ///
    /// Waits for every task to reach a terminal state before returning.
    /// Partial failure is not global failure: an item whose pipeline fails is
    /// recorded with `result: Err(..)` while its siblings run to completion.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] or [`EngineError::Join`] only
    /// when the concurrency substrate itself fails; per-item failures never
    /// surface here.
    #[instrument(skip(self, downloader, items), fields(items = items.len()))]
    pub async fn download_all(
        &self,
        downloader: &Arc<Downloader>,
        items: Vec<PlaylistItem>,
    ) -> Result<Vec<DownloadOutcome>, EngineError> {
        info!(items = items.len(), "starting playlist download");

        let mut handles = Vec::with_capacity(items.len());

        for item in items {
            // Acquire semaphore permit (blocks if at concurrency limit)
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| EngineError::SemaphoreClosed)?;

            let downloader = Arc::clone(downloader);
            let stats = Arc::clone(&self.stats);

            handles.push(tokio::spawn(async move {
                // Permit is dropped when this block exits (RAII)
                let _permit = permit;

                let result = downloader.download_item(&item).await;

                match &result {
                    Ok(path) => {
                        info!(title = %item.title, path = %path.display(), "download completed");
                        stats.increment_completed();
                    }
                    Err(e) => {
                        warn!(
                            title = %item.title,
                            url = %item.url,
                            error = %e,
                            "download failed after all attempts"
                        );
                        stats.increment_failed();
                    }
                }

                DownloadOutcome { item, result }
            }));
        }

        debug!(
            task_count = handles.len(),
            "waiting for downloads to complete"
        );

        // Join in submission order; a JoinError means the substrate itself
        // failed (task panic or cancellation) and aborts the run.
        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            outcomes.push(handle.await?);
        }

        info!(
            completed = self.stats.completed(),
            failed = self.stats.failed(),
            total = self.stats.total(),
            "playlist download complete"
        );

        Ok(outcomes)
    }
}
