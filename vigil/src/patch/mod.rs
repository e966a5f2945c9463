//! Strategic-merge patches for a single container of a deployment's pod
//! template.
//!
//! The rendered body has the shape
//!
//! ```json
//! {"spec": {"template": {"spec": {"containers": [
//!     {"name": "app", "image": "app:1.0", "env": [{"name": "K", "value": "V"}]}
//! ]}}}}
//! ```
//!
//! Containers and environment variables are merged by name on the server, so
//! other containers and unrelated variables are left alone.

mod error;

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::Deployment;
use kube::{
    Api,
    api::{Patch, PatchParams},
};
use serde_json::{Map, Value, json};
use snafu::ResultExt;

pub use self::error::Error;
use crate::config::EnvVar;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContainerPatch {
    container: String,
    image: Option<String>,
    env: Vec<EnvVar>,
    annotations: BTreeMap<String, String>,
}

impl ContainerPatch {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            image: None,
            env: Vec::new(),
            annotations: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    /// Adds environment variables. A variable that is already present keeps
    /// its position and takes the new value.
    #[must_use]
    pub fn with_env<I>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = EnvVar>,
    {
        for var in env {
            match self.env.iter_mut().find(|existing| existing.name == var.name) {
                Some(existing) => existing.value = var.value,
                None => self.env.push(var),
            }
        }
        self
    }

    /// Adds an annotation to the pod template. Changing an annotation also
    /// triggers a new rollout.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _unused = self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn container(&self) -> &str { &self.container }

    pub fn env(&self) -> &[EnvVar] { &self.env }

    pub fn is_empty(&self) -> bool { self.image.is_none() && self.env.is_empty() }

    pub fn to_json(&self) -> Value {
        let Self { container, image, env, annotations } = self;

        let mut container_patch = Map::new();
        let _unused = container_patch.insert("name".to_string(), json!(container));
        if let Some(image) = image {
            let _unused = container_patch.insert("image".to_string(), json!(image));
        }
        if !env.is_empty() {
            let env = env
                .iter()
                .map(|EnvVar { name, value }| json!({ "name": name, "value": value }))
                .collect::<Vec<_>>();
            let _unused = container_patch.insert("env".to_string(), Value::Array(env));
        }

        let mut template = Map::new();
        if !annotations.is_empty() {
            let _unused =
                template.insert("metadata".to_string(), json!({ "annotations": annotations }));
        }
        let _unused = template.insert(
            "spec".to_string(),
            json!({ "containers": [Value::Object(container_patch)] }),
        );

        json!({ "spec": { "template": Value::Object(template) } })
    }

    /// Applies the patch to `deployment` with a strategic merge.
    pub async fn apply(
        &self,
        api: &Api<Deployment>,
        namespace: &str,
        deployment: &str,
    ) -> Result<Deployment, Error> {
        if self.is_empty() {
            return error::EmptyPatchSnafu { container: self.container.clone() }.fail();
        }

        tracing::debug!("Patching deployment/{deployment} in namespace {namespace}");
        api.patch(deployment, &PatchParams::default(), &Patch::Strategic(self.to_json()))
            .await
            .with_context(|_| error::PatchDeploymentSnafu {
                namespace: namespace.to_string(),
                deployment: deployment.to_string(),
            })
    }
}
