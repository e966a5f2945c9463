//! `vigil patch`: set the image and environment of a deployment's container,
//! optionally waiting for the rolled out pod to log a line.

use std::collections::HashSet;

use clap::{ArgAction, Args};
use k8s_openapi::api::{apps::v1::Deployment, core::v1::Pod};
use kube::Api;
use snafu::{OptionExt, ResultExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use vigil_base::consts::k8s::annotations;

use crate::{
    cli::{
        Error,
        await_log::poll_policy,
        error,
        internal::{PodTargetArgs, ResourceResolver, await_log_line},
    },
    config::{Config, EnvVar},
    ext::ApiPodExt,
    log_source::{PodLogSource, PodTarget},
    patch::ContainerPatch,
};

#[derive(Args, Clone)]
pub struct PatchCommand {
    #[arg(help = "Name of the deployment to patch")]
    pub deployment: String,

    #[arg(
        short,
        long,
        help = "Namespace of the deployment. Defaults to the current Kubernetes context's \
                namespace."
    )]
    pub namespace: Option<String>,

    #[arg(
        short = 'c',
        long = "container",
        help = "Container to patch. Defaults to the only container of the deployment, or the \
                container named like the deployment."
    )]
    pub container: Option<String>,

    #[arg(long = "image", help = "New image for the container")]
    pub image: Option<String>,

    #[arg(
        short = 'P',
        long = "preset",
        action = ArgAction::Append,
        help = "Name of a configured preset whose environment variables are applied. Can be \
                specified multiple times; later presets override earlier ones."
    )]
    pub presets: Vec<String>,

    #[arg(
        short = 'e',
        long = "env",
        action = ArgAction::Append,
        help = "Environment variable to set, as NAME=VALUE. Can be specified multiple times; \
                overrides presets."
    )]
    pub env: Vec<EnvVar>,

    #[arg(long = "dry-run", help = "Print the patch instead of applying it")]
    pub dry_run: bool,

    #[arg(
        long = "await-log",
        help = "After patching, wait until the newest pod of the deployment logs this text"
    )]
    pub await_log: Option<String>,

    #[arg(
        short = 'l',
        long = "selector",
        help = "Label selector of the deployment's pods for --await-log. Defaults to \
                app=<DEPLOYMENT>."
    )]
    pub selector: Option<String>,

    #[arg(
        short = 't',
        long = "timeout-seconds",
        help = "The maximum time in seconds to wait for --await-log"
    )]
    pub timeout_secs: Option<u64>,
}

impl PatchCommand {
    pub async fn run(self, kube_client: kube::Client, config: Config) -> Result<(), Error> {
        let Self {
            deployment,
            namespace,
            container,
            image,
            presets,
            env,
            dry_run,
            await_log,
            selector,
            timeout_secs,
        } = self;

        let namespace = ResourceResolver::from(&kube_client).resolve_namespace(namespace);
        let preset_env = preset_env(&config, &presets)?;

        let deployments = Api::<Deployment>::namespaced(kube_client.clone(), &namespace);
        let container = match container.filter(|s| !s.is_empty()) {
            Some(container) => container,
            None if dry_run => deployment.clone(),
            None => {
                let current = deployments.get(&deployment).await.with_context(|_| {
                    error::GetDeploymentSnafu {
                        namespace: namespace.clone(),
                        deployment: deployment.clone(),
                    }
                })?;
                default_container(&deployment, &current)?
            }
        };

        let mut patch =
            ContainerPatch::new(container).with_image(image).with_env(preset_env).with_env(env);
        if !presets.is_empty() {
            patch = patch
                .with_annotation(annotations::APPLIED_PRESETS.as_str(), presets.join(","))
                .with_annotation(annotations::VERSION.as_str(), vigil_base::PROJECT_VERSION);
        }

        if dry_run {
            let rendered =
                serde_json::to_string_pretty(&patch.to_json()).context(error::SerializePatchSnafu)?;
            return write_stdout(&format!("{rendered}\n")).await;
        }

        let pods = Api::<Pod>::namespaced(kube_client, &namespace);
        let log_wait = match await_log {
            Some(pattern) => {
                let pod_target = PodTargetArgs { selector, ..PodTargetArgs::default() }
                    .resolve(Some(deployment.as_str()))?;
                // Pods running before the patch belong to the old template.
                let previous_pods = match &pod_target {
                    PodTarget::Selector(selector) => {
                        pods.list_pod_uids(selector).await.with_context(|_| {
                            error::ListPodsSnafu {
                                namespace: namespace.clone(),
                                selector: selector.clone(),
                            }
                        })?
                    }
                    PodTarget::Name(_) => HashSet::new(),
                };
                Some((pattern, pod_target, previous_pods))
            }
            None => None,
        };

        let _deployment = patch.apply(&deployments, &namespace, &deployment).await?;
        write_stdout(&format!(
            "deployment/{deployment} patched in namespace {namespace} (container {}, {} env)\n",
            patch.container(),
            patch.env().len()
        ))
        .await?;

        let Some((pattern, pod_target, previous_pods)) = log_wait else {
            return Ok(());
        };

        let policy = poll_policy(config.poll, timeout_secs, None, false);
        let source =
            PodLogSource::new(pods, &namespace, pod_target, Some(patch.container().to_string()))
                .with_excluded_pods(previous_pods);
        await_log_line(&source, &namespace, &pattern, &policy).await
    }
}

async fn write_stdout(text: &str) -> Result<(), Error> {
    write_output(&mut tokio::io::stdout(), text).await
}

async fn write_output<W>(out: &mut W, text: &str) -> Result<(), Error>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(text.as_bytes()).await.context(error::WriteStdoutSnafu)?;
    out.flush().await.context(error::WriteStdoutSnafu)
}

/// Environment variables of the named presets, in the given order.
fn preset_env(config: &Config, names: &[String]) -> Result<Vec<EnvVar>, Error> {
    names
        .iter()
        .map(|name| {
            config
                .find_preset_by_name(name)
                .map(|preset| preset.env.clone())
                .context(error::PresetNotFoundSnafu { preset_name: name.clone() })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|envs| envs.into_iter().flatten().collect())
}

fn default_container(deployment: &str, current: &Deployment) -> Result<String, Error> {
    let containers = current
        .spec
        .as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
        .map(|spec| spec.containers.iter().map(|c| c.name.clone()).collect::<Vec<_>>())
        .unwrap_or_default();

    if let [only] = containers.as_slice() {
        return Ok(only.clone());
    }
    if containers.iter().any(|name| name == deployment) {
        return Ok(deployment.to_string());
    }
    Err(Error::AmbiguousContainer { deployment: deployment.to_string(), containers })
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::{
        apps::v1::DeploymentSpec,
        core::v1::{Container, PodSpec, PodTemplateSpec},
    };

    use super::*;
    use crate::config::PatchPreset;

    fn deployment(containers: &[&str]) -> Deployment {
        Deployment {
            spec: Some(DeploymentSpec {
                template: PodTemplateSpec {
                    spec: Some(PodSpec {
                        containers: containers
                            .iter()
                            .map(|name| Container { name: (*name).to_string(), ..Container::default() })
                            .collect(),
                        ..PodSpec::default()
                    }),
                    ..PodTemplateSpec::default()
                },
                ..DeploymentSpec::default()
            }),
            ..Deployment::default()
        }
    }

    #[test]
    fn test_single_container_is_default() {
        let name = default_container("web", &deployment(&["server"])).unwrap();
        assert_eq!(name, "server");
    }

    #[test]
    fn test_container_named_like_deployment() {
        let name = default_container("web", &deployment(&["sidecar", "web"])).unwrap();
        assert_eq!(name, "web");
    }

    #[test]
    fn test_ambiguous_containers() {
        let err = default_container("web", &deployment(&["a", "b"])).unwrap_err();
        assert!(matches!(err, Error::AmbiguousContainer { ref containers, .. } if containers.len() == 2));
    }

    #[test]
    fn test_preset_env_concatenates_in_order() {
        let config = Config {
            presets: vec![
                PatchPreset {
                    name: "one".to_string(),
                    description: String::new(),
                    env: vec![EnvVar::new("A", "1")],
                },
                PatchPreset {
                    name: "two".to_string(),
                    description: String::new(),
                    env: vec![EnvVar::new("A", "2"), EnvVar::new("B", "2")],
                },
            ],
            ..Config::default()
        };

        let env = preset_env(&config, &["one".to_string(), "two".to_string()]).unwrap();
        let patch = ContainerPatch::new("app").with_env(env);
        assert_eq!(patch.env(), &[EnvVar::new("A", "2"), EnvVar::new("B", "2")]);
    }

    #[test]
    fn test_unknown_preset() {
        let err = preset_env(&Config::default(), &["missing".to_string()]).unwrap_err();
        assert!(matches!(err, Error::PresetNotFound { ref preset_name } if preset_name == "missing"));
    }

    #[tokio::test]
    async fn test_closed_output_is_an_error() {
        let (mut writer, reader) = tokio::io::duplex(64);
        drop(reader);

        let err = write_output(&mut writer, "deployment/web patched\n").await.unwrap_err();
        assert!(matches!(err, Error::WriteStdout { .. }));
    }

    #[tokio::test]
    async fn test_output_is_written() {
        let mut out = Vec::new();
        write_output(&mut out, "{}\n").await.unwrap();
        assert_eq!(out, b"{}\n");
    }
}
