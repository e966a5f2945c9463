use snafu::Snafu;

/// Errors returned by [`await_match`](crate::await_match).
///
/// `E` is the error type of the caller-supplied log accessor.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error<E>
where
    E: std::error::Error + 'static,
{
    #[snafu(display("The log pattern to wait for must not be empty"))]
    EmptyPattern,

    #[snafu(display("{source}"))]
    InvalidPolicy { source: PolicyError },

    /// The accessor failed and the policy is
    /// [`FetchErrorPolicy::FailFast`](crate::FetchErrorPolicy::FailFast).
    #[snafu(display("Failed to fetch logs on poll {poll}, error: {source}"))]
    FetchLogs { poll: u32, source: E },
}

#[derive(Debug, Eq, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum PolicyError {
    #[snafu(display("Poll timeout must be greater than zero"))]
    ZeroTimeout,

    #[snafu(display("Poll interval must be greater than zero"))]
    ZeroPollInterval,
}

/// Returned by [`retry`](crate::retry) once every attempt has failed.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RetryError<E>
where
    E: std::error::Error + 'static,
{
    #[snafu(display("Gave up after {attempts} attempts, last error: {source}"))]
    Exhausted { attempts: u32, source: E },
}

impl<E> RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// The error returned by the final attempt.
    pub fn into_last_error(self) -> E {
        match self {
            Self::Exhausted { source, .. } => source,
        }
    }
}
