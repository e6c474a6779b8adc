//! One-time key retrieval for the conversion service.
//!
//! Every conversion request must carry a short-lived key obtained from the
//! service's key endpoint. Keys are single-use: the downloader fetches a
//! fresh one for every conversion attempt, including retries, so a stale key
//! never masks a conversion failure. This module performs exactly one round
//! trip per call and never retries internally - retrying is the downloader's
//! responsibility.

use serde::Deserialize;
use tracing::{debug, instrument};

use super::error::DownloadError;

/// A short-lived, single-use authorization key.
///
/// Owned by the pipeline invocation that requested it; never cached or shared
/// across items or retry attempts.
#[derive(Debug)]
pub struct AuthToken {
    key: String,
}

impl AuthToken {
    /// Returns the raw key value for the `key` request header.
    #[must_use]
    pub fn as_key(&self) -> &str {
        &self.key
    }
}

/// Wire format of the key endpoint response.
#[derive(Debug, Deserialize)]
struct KeyResponse {
    key: Option<String>,
}

/// Fetches one-time keys from the conversion service.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    client: reqwest::Client,
    auth_url: String,
}

impl TokenProvider {
    /// Creates a token provider using the given client and key endpoint.
    #[must_use]
    pub fn new(client: reqwest::Client, auth_url: impl Into<String>) -> Self {
        Self {
            client,
            auth_url: auth_url.into(),
        }
    }

    /// Obtains a fresh one-time key.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::AuthRequest`] if the endpoint is unreachable
    /// or the body is undecodable, [`DownloadError::AuthStatus`] on a
    /// non-success HTTP status, and [`DownloadError::AuthMissingKey`] if the
    /// response decodes but carries no key.
    #[instrument(skip(self), fields(url = %self.auth_url))]
    pub async fn obtain_token(&self) -> Result<AuthToken, DownloadError> {
        let response = self
            .client
            .get(&self.auth_url)
            .send()
            .await
            .map_err(|e| DownloadError::auth_request(&self.auth_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::auth_status(&self.auth_url, status.as_u16()));
        }

        let body: KeyResponse = response
            .json()
            .await
            .map_err(|e| DownloadError::auth_request(&self.auth_url, e))?;

        match body.key {
            Some(key) if !key.is_empty() => {
                debug!("obtained one-time key");
                Ok(AuthToken { key })
            }
            _ => Err(DownloadError::auth_missing_key(&self.auth_url)),
        }
    }
}
