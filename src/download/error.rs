//! Error types for the download module.
//!
//! This module defines structured errors for every stage of the per-item
//! pipeline (key fetch, conversion, artifact fetch), providing context-rich
//! messages for logs and per-item failure reports.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while downloading one playlist item.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The key endpoint was unreachable or returned a transport-level error.
    #[error("auth request to {url} failed: {source}")]
    AuthRequest {
        /// The key endpoint URL.
        url: String,
        /// The underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    /// The key endpoint returned a non-success HTTP status.
    #[error("auth endpoint {url} returned HTTP {status}")]
    AuthStatus {
        /// The key endpoint URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The key endpoint answered but the response carried no usable key.
    #[error("auth response from {url} contained no key")]
    AuthMissingKey {
        /// The key endpoint URL.
        url: String,
    },

    /// The conversion endpoint was unreachable, timed out, or returned an
    /// undecodable body.
    #[error("conversion request for {link} failed: {source}")]
    ConversionRequest {
        /// The video link submitted for conversion.
        link: String,
        /// The underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    /// The conversion endpoint returned a non-success HTTP status.
    #[error("conversion of {link} rejected with HTTP {status}")]
    ConversionStatus {
        /// The video link submitted for conversion.
        link: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The conversion endpoint answered without a download URL.
    #[error("conversion of {link} returned no download URL")]
    ConversionEmpty {
        /// The video link submitted for conversion.
        link: String,
    },

    /// Network-level error while streaming the converted artifact.
    #[error("artifact request to {url} failed: {source}")]
    ArtifactRequest {
        /// The artifact URL.
        url: String,
        /// The underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    /// The artifact URL returned a non-success HTTP status.
    #[error("artifact fetch from {url} returned HTTP {status}")]
    ArtifactStatus {
        /// The artifact URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Local filesystem error while writing the artifact.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates an auth transport error.
    pub fn auth_request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::AuthRequest {
            url: url.into(),
            source,
        }
    }

    /// Creates an auth HTTP status error.
    pub fn auth_status(url: impl Into<String>, status: u16) -> Self {
        Self::AuthStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a missing-key auth error.
    pub fn auth_missing_key(url: impl Into<String>) -> Self {
        Self::AuthMissingKey { url: url.into() }
    }

    /// Creates a conversion transport error.
    pub fn conversion_request(link: impl Into<String>, source: reqwest::Error) -> Self {
        Self::ConversionRequest {
            link: link.into(),
            source,
        }
    }

    /// Creates a conversion HTTP status error.
    pub fn conversion_status(link: impl Into<String>, status: u16) -> Self {
        Self::ConversionStatus {
            link: link.into(),
            status,
        }
    }

    /// Creates an empty-conversion-result error.
    pub fn conversion_empty(link: impl Into<String>) -> Self {
        Self::ConversionEmpty { link: link.into() }
    }

    /// Creates an artifact transport error.
    pub fn artifact_request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::ArtifactRequest {
            url: url.into(),
            source,
        }
    }

    /// Creates an artifact HTTP status error.
    pub fn artifact_status(url: impl Into<String>, status: u16) -> Self {
        Self::ArtifactStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// Note on From trait implementations:
// We intentionally do NOT implement `From<reqwest::Error>` or
// `From<std::io::Error>` because the variants require context (url, link,
// path) that the source errors don't carry. The helper constructors are the
// pattern used throughout this crate instead.
