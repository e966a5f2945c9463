use std::time::Duration;

use tokio::time::Instant;

use crate::{Error, FetchErrorPolicy, PollPolicy};

/// Deadline used when `started + timeout` does not fit in an `Instant`,
/// matching the cap `tokio::time::sleep` applies.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Terminal outcome of [`await_match`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PollResult {
    Matched,
    TimedOut,
}

/// What [`await_match`] observed before it returned.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PollReport {
    pub result: PollResult,

    /// Number of times the log accessor was invoked.
    pub polls: u32,

    /// Number of accessor failures that were retried through.
    pub fetch_failures: u32,

    pub elapsed: Duration,
}

impl PollReport {
    #[inline]
    #[must_use]
    pub fn is_matched(&self) -> bool { self.result == PollResult::Matched }
}

/// Repeatedly fetches a log snapshot until it contains `pattern` or the
/// policy's time budget is exhausted.
///
/// Polls happen at `0`, `poll_interval`, `2 * poll_interval`, ... strictly
/// before the deadline. The match check runs right after each fetch, so no
/// poll follows a match. A fetch that is still pending at the deadline is
/// abandoned and the result is [`PollResult::TimedOut`].
///
/// # Errors
///
/// * [`Error::EmptyPattern`] if `pattern` is empty.
/// * [`Error::InvalidPolicy`] if the timeout or interval is zero.
/// * [`Error::FetchLogs`] on the first accessor failure when the policy is
///   [`FetchErrorPolicy::FailFast`].
pub async fn await_match<F, Fut, E>(
    policy: &PollPolicy,
    pattern: &str,
    mut fetch_logs: F,
) -> Result<PollReport, Error<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, E>>,
    E: std::error::Error + 'static,
{
    if pattern.is_empty() {
        return Err(Error::EmptyPattern);
    }
    policy.validate().map_err(|source| Error::InvalidPolicy { source })?;

    let PollPolicy { timeout, poll_interval, fetch_errors } = *policy;
    let started = Instant::now();
    let deadline = started.checked_add(timeout).unwrap_or_else(|| started + FAR_FUTURE);

    let mut polls = 0_u32;
    let mut fetch_failures = 0_u32;
    let finish = |result, polls, fetch_failures| PollReport {
        result,
        polls,
        fetch_failures,
        elapsed: started.elapsed(),
    };

    loop {
        polls = polls.saturating_add(1);
        match tokio::time::timeout_at(deadline, fetch_logs()).await {
            Ok(Ok(logs)) if logs.contains(pattern) => {
                tracing::debug!(poll = polls, "Found `{pattern}` in logs");
                return Ok(finish(PollResult::Matched, polls, fetch_failures));
            }
            Ok(Ok(_)) => {
                tracing::trace!(poll = polls, "`{pattern}` not found in logs yet");
            }
            Ok(Err(source)) => match fetch_errors {
                FetchErrorPolicy::FailFast => {
                    return Err(Error::FetchLogs { poll: polls, source });
                }
                FetchErrorPolicy::RetryThrough => {
                    fetch_failures = fetch_failures.saturating_add(1);
                    tracing::warn!(poll = polls, "Failed to fetch logs, error: {source}");
                }
            },
            Err(_elapsed) => {
                tracing::debug!(poll = polls, "Log fetch still pending at the deadline");
                return Ok(finish(PollResult::TimedOut, polls, fetch_failures));
            }
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(finish(PollResult::TimedOut, polls, fetch_failures));
        }
        tokio::time::sleep(poll_interval.min(deadline - now)).await;
        if Instant::now() >= deadline {
            return Ok(finish(PollResult::TimedOut, polls, fetch_failures));
        }
    }
}
