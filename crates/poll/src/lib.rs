//! Bounded waiting for external readiness.
//!
//! Two policies live here:
//!
//! * [`PollPolicy`] with [`await_match`]: fetch a log snapshot every
//!   `poll_interval` until it contains a pattern or `timeout` has passed.
//! * [`RetryPolicy`] with [`retry`]: re-run a one-shot operation a fixed number
//!   of times with a fixed delay until it succeeds.
//!
//! Both are deadline- or attempt-bounded and always terminate.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use vigil_poll::{PollPolicy, PollResult, await_match};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = PollPolicy::new(Duration::from_secs(10), Duration::from_secs(2))?;
//! let report = await_match(&policy, "ready", || async {
//!     Ok::<_, std::io::Error>(String::from("ready: listening on 8080"))
//! })
//! .await?;
//! assert_eq!(report.result, PollResult::Matched);
//! # Ok(())
//! # }
//! ```

mod awaiter;
pub mod error;
mod policy;
mod retry;

pub use self::{
    awaiter::{PollReport, PollResult, await_match},
    error::{Error, PolicyError, RetryError},
    policy::{FetchErrorPolicy, PollPolicy},
    retry::{RetryPolicy, retry},
};

/// Log polling gives up after two minutes by default.
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

pub const DEFAULT_RETRY_MAX_RETRIES: u32 = 15;

pub const DEFAULT_RETRY_DELAY_SECS: u64 = 1;
