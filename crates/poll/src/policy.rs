use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};

use crate::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_POLL_TIMEOUT_SECS, PolicyError};

/// What to do when the log accessor itself fails.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FetchErrorPolicy {
    /// Count the failure, treat the poll as a miss and keep going until the
    /// deadline.
    #[default]
    RetryThrough,

    /// Return the first failure to the caller.
    FailFast,
}

/// Time budget and cadence for [`await_match`](crate::await_match).
#[serde_as]
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollPolicy {
    #[serde(rename = "timeoutSeconds", default = "PollPolicy::default_timeout")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,

    #[serde(rename = "intervalSeconds", default = "PollPolicy::default_poll_interval")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub poll_interval: Duration,

    #[serde(default)]
    pub fetch_errors: FetchErrorPolicy,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout: Self::default_timeout(),
            poll_interval: Self::default_poll_interval(),
            fetch_errors: FetchErrorPolicy::default(),
        }
    }
}

impl PollPolicy {
    /// # Errors
    ///
    /// Returns an error if either duration is zero.
    pub fn new(timeout: Duration, poll_interval: Duration) -> Result<Self, PolicyError> {
        let policy = Self { timeout, poll_interval, fetch_errors: FetchErrorPolicy::default() };
        policy.validate()?;
        Ok(policy)
    }

    #[must_use]
    pub const fn with_fetch_errors(mut self, fetch_errors: FetchErrorPolicy) -> Self {
        self.fetch_errors = fetch_errors;
        self
    }

    /// # Errors
    ///
    /// Returns an error if either duration is zero.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.timeout.is_zero() {
            return Err(PolicyError::ZeroTimeout);
        }
        if self.poll_interval.is_zero() {
            return Err(PolicyError::ZeroPollInterval);
        }
        Ok(())
    }

    /// Upper bound on the number of polls this policy can perform.
    #[must_use]
    pub fn max_polls(&self) -> u128 {
        let interval = self.poll_interval.as_nanos().max(1);
        self.timeout.as_nanos().div_ceil(interval)
    }

    #[inline]
    #[must_use]
    pub const fn default_timeout() -> Duration { Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS) }

    #[inline]
    #[must_use]
    pub const fn default_poll_interval() -> Duration {
        Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.timeout, Duration::from_secs(120));
        assert_eq!(policy.poll_interval, Duration::from_secs(2));
        assert_eq!(policy.fetch_errors, FetchErrorPolicy::RetryThrough);
        assert_eq!(policy.max_polls(), 60);
    }

    #[test]
    fn test_new_rejects_zero_durations() {
        assert_eq!(
            PollPolicy::new(Duration::ZERO, Duration::from_secs(1)),
            Err(PolicyError::ZeroTimeout)
        );
        assert_eq!(
            PollPolicy::new(Duration::from_secs(1), Duration::ZERO),
            Err(PolicyError::ZeroPollInterval)
        );
    }

    #[test]
    fn test_max_polls_rounds_up() {
        let policy = PollPolicy::new(Duration::from_secs(5), Duration::from_secs(2)).unwrap();
        assert_eq!(policy.max_polls(), 3);

        let policy = PollPolicy::new(Duration::from_secs(1), Duration::from_secs(5)).unwrap();
        assert_eq!(policy.max_polls(), 1);
    }

    #[test]
    fn test_deserialize_seconds() {
        let policy: PollPolicy =
            serde_yaml::from_str("timeoutSeconds: 30\nfetchErrors: failFast\n").unwrap();
        assert_eq!(policy.timeout, Duration::from_secs(30));
        assert_eq!(policy.poll_interval, Duration::from_secs(2));
        assert_eq!(policy.fetch_errors, FetchErrorPolicy::FailFast);
    }
}
