//! Concurrent download engine for playlist items.
//!
//! This module drives one item through key fetch, conversion, and artifact
//! streaming, and fans the playlist out across concurrent tasks:
//!
//! - [`TokenProvider`] - fetches a one-time key per conversion attempt
//! - [`ConversionClient`] - submits a video link for mp3 conversion
//! - [`ArtifactFetcher`] - streams the converted file to disk
//! - [`Downloader`] - composes the three with a bounded retry loop
//! - [`Engine`] - runs one task per item and collects [`DownloadOutcome`]s
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ytaudio_core::config::{Endpoints, build_http_client};
//! use ytaudio_core::download::{
//!     ArtifactFetcher, ConversionClient, Downloader, Engine, RetryPolicy, TokenProvider,
//! };
//! use ytaudio_core::playlist::PlaylistItem;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = build_http_client()?;
//! let endpoints = Endpoints::default();
//! let downloader = Arc::new(Downloader::new(
//!     TokenProvider::new(client.clone(), &endpoints.auth_url),
//!     ConversionClient::new(client.clone(), &endpoints.convert_url),
//!     ArtifactFetcher::new(client),
//!     RetryPolicy::default(),
//!     "download",
//! ));
//! let engine = Engine::new(10)?;
//! let items = vec![PlaylistItem::new("Song A", "https://www.youtube.com/watch?v=a")];
//! let outcomes = engine.download_all(&downloader, items).await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod convert;
mod downloader;
mod engine;
mod error;
mod fetch;
mod filename;
mod retry;

pub use auth::{AuthToken, TokenProvider};
pub use convert::{Conversion, ConversionClient};
pub use downloader::Downloader;
pub use engine::{DEFAULT_CONCURRENCY, DownloadOutcome, DownloadStats, Engine, EngineError};
pub use error::DownloadError;
pub use fetch::ArtifactFetcher;
pub use filename::{AUDIO_EXTENSION, audio_file_path, sanitize_title};
pub use retry::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_RETRIES, FailureType, RetryDecision, RetryPolicy,
    classify_error,
};

// Note: no module-local Result aliases; use `Result<T, DownloadError>`
// explicitly in function signatures.
