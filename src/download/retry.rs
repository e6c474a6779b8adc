//! Retry policy for transient conversion failures.
//!
//! A failed pipeline stage is classified into a [`FailureType`]:
//! - [`FailureType::Transient`] - remote-API failures (key fetch, conversion)
//!   that may succeed on a fresh attempt
//! - [`FailureType::Permanent`] - artifact-stream and filesystem failures that
//!   are never retried
//!
//! The [`RetryPolicy`] then decides whether to re-enter the token+conversion
//! loop based on failure type and attempt count. The default policy performs
//! immediate retries (no delay) with a cap of six total attempts; exponential
//! backoff with jitter can be enabled via [`RetryPolicy::with_backoff`].

use std::time::Duration;

use rand::Rng;
use tracing::debug;

use super::DownloadError;

/// Default number of extra attempts after the first failure.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default maximum total attempts (initial attempt plus retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = DEFAULT_MAX_RETRIES + 1;

/// Default delay cap when backoff is enabled (32 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(32);

/// Default backoff multiplier when backoff is enabled.
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Maximum jitter added to non-zero delays (500ms).
const MAX_JITTER: Duration = Duration::from_millis(500);

/// Classification of per-item failures for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Remote-API failure that may succeed on retry with a fresh key.
    Transient,

    /// Artifact-stream or filesystem failure; retrying the conversion step
    /// would not help and could clobber a partially usable state.
    Permanent,
}

/// Decision on whether to retry a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying (zero for immediate retries).
        delay: Duration,
        /// Which attempt number this will be (1-indexed).
        attempt: u32,
    },

    /// Do not retry.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Configuration for the bounded retry loop around token fetch + conversion.
///
/// # Default Values
///
/// - `max_attempts`: 6 (one initial attempt plus five retries)
/// - `base_delay`: zero (immediate retries)
///
/// With a non-zero base delay the wait grows as
/// `min(base_delay * multiplier^attempt, max_delay) + jitter`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Base delay for the first retry; zero disables waiting entirely.
    base_delay: Duration,

    /// Maximum delay cap.
    max_delay: Duration,

    /// Multiplier applied each attempt.
    backoff_multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::ZERO,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with a custom attempt cap and immediate retries.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Creates a policy with exponential backoff between attempts.
    ///
    /// # Arguments
    ///
    /// * `max_attempts` - Maximum attempts including initial (must be >= 1)
    /// * `base_delay` - Delay before the first retry
    /// * `max_delay` - Delay cap
    /// * `backoff_multiplier` - Multiplier for exponential increase
    #[must_use]
    pub fn with_backoff(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Determines whether to retry a failed attempt.
    ///
    /// # Arguments
    ///
    /// * `failure_type` - Classification of the failure
    /// * `attempt` - The attempt number that just failed (1-indexed)
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        match failure_type {
            FailureType::Permanent => {
                return RetryDecision::DoNotRetry {
                    reason: "permanent failure - retry would not help".to_string(),
                };
            }
            FailureType::Transient => {}
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);

        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    /// Calculates the delay before the next attempt.
    ///
    /// A zero base delay means immediate retries with no jitter. Otherwise:
    /// `min(base_delay * multiplier^(attempt-1), max_delay) + jitter`.
    fn calculate_delay(&self, attempt: u32) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }

        let base_ms = self.base_delay.as_millis() as f64;
        let multiplier = f64::from(self.backoff_multiplier);

        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = base_ms * multiplier.powf(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_ms as u64) + calculate_jitter()
    }
}

/// Generates random jitter between 0 and [`MAX_JITTER`].
///
/// Jitter spreads out retries when many items fail at the same time.
fn calculate_jitter() -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_ms = rng.gen_range(0..=MAX_JITTER.as_millis() as u64);
    Duration::from_millis(jitter_ms)
}

/// Classifies a download error into a failure type for retry decisions.
///
/// Key-fetch and conversion failures are transient: a new attempt gets a
/// fresh key and the remote service may recover. Artifact and filesystem
/// failures are permanent for the item; the conversion step is never
/// re-entered once the artifact fetch has started.
#[must_use]
pub fn classify_error(error: &DownloadError) -> FailureType {
    match error {
        DownloadError::AuthRequest { .. }
        | DownloadError::AuthStatus { .. }
        | DownloadError::AuthMissingKey { .. }
        | DownloadError::ConversionRequest { .. }
        | DownloadError::ConversionStatus { .. }
        | DownloadError::ConversionEmpty { .. } => FailureType::Transient,

        DownloadError::ArtifactRequest { .. }
        | DownloadError::ArtifactStatus { .. }
        | DownloadError::Io { .. } => FailureType::Permanent,
    }
}
