use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};

use crate::{DEFAULT_RETRY_DELAY_SECS, DEFAULT_RETRY_MAX_RETRIES, RetryError};

/// Re-run a failing operation up to `max_retries` more times, sleeping
/// `delay` between attempts.
#[serde_as]
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    #[serde(default = "RetryPolicy::default_max_retries")]
    pub max_retries: u32,

    #[serde(rename = "delaySeconds", default = "RetryPolicy::default_delay")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self { Self::fixed_delay(Self::default_max_retries(), Self::default_delay()) }
}

impl RetryPolicy {
    #[inline]
    #[must_use]
    pub const fn fixed_delay(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// A policy that runs the operation exactly once.
    #[inline]
    #[must_use]
    pub const fn none() -> Self { Self::fixed_delay(0, Duration::ZERO) }

    /// The first attempt plus every retry.
    #[inline]
    #[must_use]
    pub const fn max_attempts(&self) -> u32 { self.max_retries.saturating_add(1) }

    #[inline]
    #[must_use]
    pub const fn default_max_retries() -> u32 { DEFAULT_RETRY_MAX_RETRIES }

    #[inline]
    #[must_use]
    pub const fn default_delay() -> Duration { Duration::from_secs(DEFAULT_RETRY_DELAY_SECS) }
}

/// Runs `operation` until it succeeds or the policy runs out of attempts.
///
/// Every error is considered transient.
///
/// # Errors
///
/// Returns [`RetryError::Exhausted`] carrying the last error once
/// [`RetryPolicy::max_attempts`] attempts have failed.
pub async fn retry<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(source) if attempt >= max_attempts => {
                return Err(RetryError::Exhausted { attempts: attempt, source });
            }
            Err(err) => {
                tracing::debug!(
                    attempt,
                    max_attempts,
                    "Attempt failed, retrying in {:?}, error: {err}",
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
