//! `vigil await-log`: block until a pod's logs contain a line.

use std::time::Duration;

use clap::Args;
use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use vigil_poll::{FetchErrorPolicy, PollPolicy};

use crate::{
    cli::{
        Error,
        internal::{PodTargetArgs, ResourceResolver, await_log_line},
    },
    config::Config,
    log_source::PodLogSource,
};

#[derive(Args, Clone)]
pub struct AwaitLogCommand {
    #[arg(help = "Text to wait for in the pod's logs")]
    pub pattern: String,

    #[arg(
        short,
        long,
        help = "Namespace of the pod. Defaults to the current Kubernetes context's namespace."
    )]
    pub namespace: Option<String>,

    #[command(flatten)]
    pub target: PodTargetArgs,

    #[arg(
        short = 't',
        long = "timeout-seconds",
        help = "The maximum time in seconds to wait. Defaults to `poll.timeoutSeconds` of the \
                configuration (120)."
    )]
    pub timeout_secs: Option<u64>,

    #[arg(
        short = 'i',
        long = "interval-seconds",
        help = "Seconds between two reads of the logs. Defaults to `poll.intervalSeconds` of the \
                configuration (2)."
    )]
    pub interval_secs: Option<u64>,

    #[arg(
        long = "fail-fast",
        help = "Stop at the first failure to read logs instead of retrying until the timeout"
    )]
    pub fail_fast: bool,
}

impl AwaitLogCommand {
    pub async fn run(self, kube_client: kube::Client, config: Config) -> Result<(), Error> {
        let Self { pattern, namespace, target, timeout_secs, interval_secs, fail_fast } = self;

        let namespace = ResourceResolver::from(&kube_client).resolve_namespace(namespace);
        let pod_target = target.resolve(None)?;
        let policy = poll_policy(config.poll, timeout_secs, interval_secs, fail_fast);

        let api = Api::<Pod>::namespaced(kube_client, &namespace);
        let source = PodLogSource::new(api, &namespace, pod_target, target.container);
        await_log_line(&source, &namespace, &pattern, &policy).await
    }
}

/// Applies command-line overrides on top of the configured policy.
pub fn poll_policy(
    mut policy: PollPolicy,
    timeout_secs: Option<u64>,
    interval_secs: Option<u64>,
    fail_fast: bool,
) -> PollPolicy {
    if let Some(secs) = timeout_secs {
        policy.timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = interval_secs {
        policy.poll_interval = Duration::from_secs(secs);
    }
    if fail_fast {
        policy.fetch_errors = FetchErrorPolicy::FailFast;
    }
    policy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let policy = poll_policy(PollPolicy::default(), Some(30), Some(5), true);
        assert_eq!(policy.timeout, Duration::from_secs(30));
        assert_eq!(policy.poll_interval, Duration::from_secs(5));
        assert_eq!(policy.fetch_errors, FetchErrorPolicy::FailFast);
    }

    #[test]
    fn test_no_overrides_keep_configured_policy() {
        let configured = PollPolicy::default();
        assert_eq!(poll_policy(configured, None, None, false), configured);
    }
}
