use std::collections::HashSet;

use k8s_openapi::api::core::v1::Pod;
use kube::{
    Api,
    api::{ListParams, LogParams},
};

/// Extension trait for `kube::Api<Pod>`.
pub trait ApiPodExt {
    /// Returns the most recently created pod matching `label_selector` that is
    /// not being deleted and whose UID is not in `excluded`, or `None` when
    /// there is no such pod.
    async fn find_newest_pod(
        &self,
        label_selector: &str,
        excluded: &HashSet<String>,
    ) -> Result<Option<Pod>, kube::Error>;

    /// Returns the UIDs of the pods currently matching `label_selector`.
    async fn list_pod_uids(&self, label_selector: &str) -> Result<HashSet<String>, kube::Error>;

    /// Returns the complete log text of `pod_name`, equivalent to
    /// `kubectl logs <pod>`.
    async fn fetch_logs(
        &self,
        pod_name: &str,
        container: Option<&str>,
    ) -> Result<String, kube::Error>;
}

impl ApiPodExt for Api<Pod> {
    async fn find_newest_pod(
        &self,
        label_selector: &str,
        excluded: &HashSet<String>,
    ) -> Result<Option<Pod>, kube::Error> {
        let list_params = ListParams::default().labels(label_selector);
        let pods = self.list(&list_params).await?;
        Ok(newest_live_pod(pods.items, excluded))
    }

    async fn list_pod_uids(&self, label_selector: &str) -> Result<HashSet<String>, kube::Error> {
        let list_params = ListParams::default().labels(label_selector);
        let pods = self.list(&list_params).await?;
        Ok(pods.items.into_iter().filter_map(|pod| pod.metadata.uid).collect())
    }

    async fn fetch_logs(
        &self,
        pod_name: &str,
        container: Option<&str>,
    ) -> Result<String, kube::Error> {
        let log_params =
            LogParams { container: container.map(ToString::to_string), ..LogParams::default() };
        self.logs(pod_name, &log_params).await
    }
}

/// Picks the newest pod that has no deletion timestamp and is not listed in
/// `excluded` by UID.
///
/// During a rollout the pods of the previous replica set linger until they
/// terminate, and the new pod may not exist yet right after a patch. Passing
/// the UIDs seen before the patch as `excluded` keeps the old pods out.
pub fn newest_live_pod<I>(pods: I, excluded: &HashSet<String>) -> Option<Pod>
where
    I: IntoIterator<Item = Pod>,
{
    pods.into_iter()
        .filter(|pod| pod.metadata.deletion_timestamp.is_none())
        .filter(|pod| pod.metadata.uid.as_ref().is_none_or(|uid| !excluded.contains(uid)))
        .max_by_key(|pod| pod.metadata.creation_timestamp.as_ref().map(|time| time.0))
}
