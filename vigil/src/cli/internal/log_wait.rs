use vigil_poll::{PollPolicy, PollResult};

use crate::{cli::Error, log_source::PodLogSource, ui::WaitSpinner};

/// Polls the logs of `source` until `pattern` shows up.
///
/// # Errors
///
/// Returns `Error::LogPatternTimedOut` when the policy's budget runs out, and
/// `Error::AwaitLog` when the poller rejects its input or fails fast on a
/// fetch error.
pub async fn await_log_line(
    source: &PodLogSource,
    namespace: &str,
    pattern: &str,
    policy: &PollPolicy,
) -> Result<(), Error> {
    let target = source.target().to_string();
    tracing::info!(
        "Waiting up to {}s for '{pattern}' in logs of {target} in namespace {namespace}",
        policy.timeout.as_secs()
    );

    let spinner = WaitSpinner::start(format!("Waiting for '{pattern}' in logs of {target}"));
    let report = vigil_poll::await_match(policy, pattern, || source.fetch()).await;
    spinner.finish();
    let report = report?;

    if report.fetch_failures > 0 {
        tracing::debug!("{} of {} log fetches failed", report.fetch_failures, report.polls);
    }

    match report.result {
        PollResult::Matched => {
            tracing::info!(
                "Found '{pattern}' in logs of {target} after {} polls ({:.1}s)",
                report.polls,
                report.elapsed.as_secs_f64()
            );
            Ok(())
        }
        PollResult::TimedOut => Err(Error::LogPatternTimedOut {
            namespace: namespace.to_string(),
            target,
            pattern: pattern.to_string(),
            polls: report.polls,
            elapsed_secs: report.elapsed.as_secs(),
        }),
    }
}
