//! Pod logs as the input of the log poller.
//!
//! A [`PodLogSource`] names its pod either directly or through a label
//! selector. Selectors are re-evaluated on every fetch so that a rollout
//! started just before waiting is followed to the newest pod. Pods known to
//! predate the rollout can be excluded by UID.

mod error;

use std::{collections::HashSet, fmt};

use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use snafu::{OptionExt, ResultExt};

pub use self::error::Error;
use crate::ext::ApiPodExt;

/// How the pod to read logs from is identified.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PodTarget {
    Name(String),
    Selector(String),
}

impl fmt::Display for PodTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "pod/{name}"),
            Self::Selector(selector) => write!(f, "pods matching '{selector}'"),
        }
    }
}

#[derive(Clone)]
pub struct PodLogSource {
    api: Api<Pod>,
    namespace: String,
    target: PodTarget,
    container: Option<String>,
    excluded_pods: HashSet<String>,
}

impl PodLogSource {
    pub fn new(
        api: Api<Pod>,
        namespace: impl Into<String>,
        target: PodTarget,
        container: Option<String>,
    ) -> Self {
        Self { api, namespace: namespace.into(), target, container, excluded_pods: HashSet::new() }
    }

    /// Never selects the pods with these UIDs. Only applies to
    /// [`PodTarget::Selector`].
    #[must_use]
    pub fn with_excluded_pods(mut self, uids: HashSet<String>) -> Self {
        self.excluded_pods = uids;
        self
    }

    pub const fn target(&self) -> &PodTarget { &self.target }

    pub async fn resolve_pod_name(&self) -> Result<String, Error> {
        let selector = match &self.target {
            PodTarget::Name(name) => return Ok(name.clone()),
            PodTarget::Selector(selector) => selector,
        };

        let pod = self.api.find_newest_pod(selector, &self.excluded_pods).await.with_context(|_| {
            error::ListPodsSnafu { namespace: self.namespace.clone(), selector: selector.clone() }
        })?;

        pod.and_then(|pod| pod.metadata.name).with_context(|| error::NoPodMatchesSnafu {
            namespace: self.namespace.clone(),
            selector: selector.clone(),
        })
    }

    /// Fetches the full log text of the target pod.
    pub async fn fetch(&self) -> Result<String, Error> {
        let pod_name = self.resolve_pod_name().await?;
        tracing::trace!("Reading logs of pod/{pod_name} in namespace {}", self.namespace);
        self.api.fetch_logs(&pod_name, self.container.as_deref()).await.with_context(|_| {
            error::ReadLogsSnafu { namespace: self.namespace.clone(), pod_name: pod_name.clone() }
        })
    }
}

#[cfg(test)]
mod tests {
    use http::{Request, Response};
    use kube::client::Body;
    use serde_json::json;
    use tower_test::mock::{self, Handle};

    use super::*;

    type ApiServer = Handle<Request<Body>, Response<Body>>;

    fn source(target: PodTarget) -> (PodLogSource, ApiServer) {
        let (service, server) = mock::pair::<Request<Body>, Response<Body>>();
        let client = kube::Client::new(service, "default");
        let api = Api::<Pod>::namespaced(client, "default");
        (PodLogSource::new(api, "default", target, None), server)
    }

    fn pod_json(name: &str, created: &str) -> serde_json::Value {
        json!({
            "metadata": {
                "name": name,
                "namespace": "default",
                "uid": format!("uid-{name}"),
                "creationTimestamp": created,
            }
        })
    }

    fn pod_list(items: Vec<serde_json::Value>) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "apiVersion": "v1",
            "kind": "PodList",
            "metadata": { "resourceVersion": "1" },
            "items": items,
        }))
        .unwrap()
    }

    /// Answers the next request and returns its path and query.
    async fn respond(server: &mut ApiServer, body: Vec<u8>) -> String {
        let (request, send) = server.next_request().await.expect("a request to the API server");
        let uri = request.uri().to_string();
        send.send_response(Response::builder().body(Body::from(body)).unwrap());
        uri
    }

    #[test]
    fn test_target_display() {
        assert_eq!(PodTarget::Name("web-0".to_string()).to_string(), "pod/web-0");
        assert_eq!(
            PodTarget::Selector("app=discovery".to_string()).to_string(),
            "pods matching 'app=discovery'"
        );
    }

    #[tokio::test]
    async fn test_named_pod_reads_logs_without_listing() {
        let (source, mut server) = source(PodTarget::Name("web-0".to_string()));
        let api_server = tokio::spawn(async move {
            let uri = respond(&mut server, b"Started Application\n".to_vec()).await;
            assert!(uri.starts_with("/api/v1/namespaces/default/pods/web-0/log"), "{uri}");
        });

        let logs = source.fetch().await.unwrap();

        assert_eq!(logs, "Started Application\n");
        api_server.await.unwrap();
    }

    #[tokio::test]
    async fn test_selector_reads_logs_of_newest_pod() {
        let (source, mut server) = source(PodTarget::Selector("app=web".to_string()));
        let api_server = tokio::spawn(async move {
            let list = pod_list(vec![
                pod_json("web-old", "2024-05-01T10:00:00Z"),
                pod_json("web-new", "2024-05-01T10:05:00Z"),
            ]);
            let uri = respond(&mut server, list).await;
            assert!(uri.starts_with("/api/v1/namespaces/default/pods?"), "{uri}");
            assert!(uri.contains("labelSelector=app%3Dweb"), "{uri}");

            let uri = respond(&mut server, b"booting".to_vec()).await;
            assert!(uri.starts_with("/api/v1/namespaces/default/pods/web-new/log"), "{uri}");
        });

        assert_eq!(source.fetch().await.unwrap(), "booting");
        api_server.await.unwrap();
    }

    #[tokio::test]
    async fn test_no_matching_pod_is_a_fetch_error() {
        let (source, mut server) = source(PodTarget::Selector("app=web".to_string()));
        let api_server = tokio::spawn(async move {
            let _uri = respond(&mut server, pod_list(Vec::new())).await;
        });

        let err = source.fetch().await.unwrap_err();

        assert!(matches!(err, Error::NoPodMatches { ref selector, .. } if selector == "app=web"));
        api_server.await.unwrap();
    }

    #[tokio::test]
    async fn test_excluded_pods_are_never_read() {
        let (source, mut server) = source(PodTarget::Selector("app=web".to_string()));
        let source = source.with_excluded_pods(HashSet::from(["uid-web-old".to_string()]));
        let api_server = tokio::spawn(async move {
            let list = pod_list(vec![pod_json("web-old", "2024-05-01T10:00:00Z")]);
            let _uri = respond(&mut server, list).await;
        });

        let err = source.fetch().await.unwrap_err();

        assert!(matches!(err, Error::NoPodMatches { .. }));
        api_server.await.unwrap();
    }
}
