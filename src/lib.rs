//! YouTube playlist audio downloader core library.
//!
//! This library resolves a YouTube playlist into its items and downloads an
//! mp3 artifact for each item through an external conversion API.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Endpoint configuration, conversion policy, HTTP client construction
//! - [`playlist`] - Playlist item listing via the YouTube Data API
//! - [`download`] - Concurrent download engine with per-item retry

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod playlist;

// Re-export commonly used types
pub use config::{Endpoints, build_http_client};
pub use download::{
    ArtifactFetcher, ConversionClient, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DownloadError,
    DownloadOutcome, DownloadStats, Downloader, Engine, EngineError, FailureType, RetryDecision,
    RetryPolicy, TokenProvider, classify_error,
};
pub use playlist::{PlaylistError, PlaylistItem, PlaylistSource, YouTubePlaylist};
