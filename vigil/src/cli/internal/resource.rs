use clap::Args;
use vigil_base::consts::k8s::labels;

use crate::{cli::Error, log_source::PodTarget};

/// Resolves the namespace a command works in, falling back to the namespace
/// of the current Kubernetes context.
pub struct ResourceResolver<'k> {
    kube_client: &'k kube::Client,
}

impl<'k> From<&'k kube::Client> for ResourceResolver<'k> {
    fn from(kube_client: &'k kube::Client) -> Self { Self { kube_client } }
}

impl ResourceResolver<'_> {
    pub fn resolve_namespace(&self, namespace: Option<String>) -> String {
        namespace
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.kube_client.default_namespace().to_string())
    }
}

/// Ways of naming the pod whose logs are read.
#[derive(Args, Clone, Debug, Default)]
pub struct PodTargetArgs {
    #[arg(
        short = 'p',
        long = "pod-name",
        conflicts_with_all = ["selector", "app"],
        help = "Name of the pod to read logs from"
    )]
    pub pod_name: Option<String>,

    #[arg(
        short = 'l',
        long = "selector",
        conflicts_with = "app",
        help = "Label selector of the pods to read logs from; the newest live pod is used"
    )]
    pub selector: Option<String>,

    #[arg(
        short = 'a',
        long = "app",
        help = "Shorthand for --selector app=<APP>, the label set on the application's pods"
    )]
    pub app: Option<String>,

    #[arg(short = 'c', long = "container", help = "Container to read logs from")]
    pub container: Option<String>,
}

impl PodTargetArgs {
    /// Picks the pod target from the first argument given, using
    /// `default_app` as the `app` label when none is.
    pub fn resolve(&self, default_app: Option<&str>) -> Result<PodTarget, Error> {
        let Self { pod_name, selector, app, .. } = self;
        let non_empty = |value: &Option<String>| value.clone().filter(|s| !s.is_empty());

        if let Some(pod_name) = non_empty(pod_name) {
            return Ok(PodTarget::Name(pod_name));
        }
        if let Some(selector) = non_empty(selector) {
            return Ok(PodTarget::Selector(selector));
        }
        non_empty(app)
            .or_else(|| default_app.map(ToString::to_string))
            .map(|app| PodTarget::Selector(format!("{}={app}", labels::APP)))
            .ok_or(Error::MissingPodTarget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pod_name: Option<&str>, selector: Option<&str>, app: Option<&str>) -> PodTargetArgs {
        PodTargetArgs {
            pod_name: pod_name.map(ToString::to_string),
            selector: selector.map(ToString::to_string),
            app: app.map(ToString::to_string),
            container: None,
        }
    }

    #[test]
    fn test_pod_name_wins() {
        let target = args(Some("web-0"), None, None).resolve(Some("web")).unwrap();
        assert_eq!(target, PodTarget::Name("web-0".to_string()));
    }

    #[test]
    fn test_selector() {
        let target = args(None, Some("tier=backend"), None).resolve(None).unwrap();
        assert_eq!(target, PodTarget::Selector("tier=backend".to_string()));
    }

    #[test]
    fn test_app_becomes_app_label() {
        let target = args(None, None, Some("discovery")).resolve(None).unwrap();
        assert_eq!(target, PodTarget::Selector("app=discovery".to_string()));
    }

    #[test]
    fn test_default_app() {
        let target = args(None, Some(""), None).resolve(Some("config-example")).unwrap();
        assert_eq!(target, PodTarget::Selector("app=config-example".to_string()));
    }

    #[test]
    fn test_missing_target() {
        let err = PodTargetArgs::default().resolve(None).unwrap_err();
        assert!(matches!(err, Error::MissingPodTarget));
    }
}
