use serde::{Deserialize, Serialize};

use crate::config::EnvVar;

const COMMONS_DISCOVERY: &str = "ORG_SPRINGFRAMEWORK_CLOUD_KUBERNETES_COMMONS_DISCOVERY";
const FABRIC8_DISCOVERY: &str = "ORG_SPRINGFRAMEWORK_CLOUD_KUBERNETES_FABRIC8_DISCOVERY";
const FABRIC8_DISCOVERY_REACTIVE: &str =
    "ORG_SPRINGFRAMEWORK_CLOUD_KUBERNETES_FABRIC8_DISCOVERY_REACTIVE";
const DISCOVERY_HEALTH: &str = "ORG_SPRINGFRAMEWORK_CLOUD_CLIENT_DISCOVERY_HEALTH";
const DISCOVERY_HEALTH_REACTIVE: &str = "ORG_SPRINGFRAMEWORK_CLOUD_CLIENT_DISCOVERY_HEALTH_REACTIVE";

const DISCOVERY_NAMESPACES: &str = "SPRING_CLOUD_KUBERNETES_DISCOVERY_NAMESPACES";
const DISCOVERY_FILTER: &str = "SPRING_CLOUD_KUBERNETES_DISCOVERY_FILTER";

/// A named set of environment variables that `vigil patch --preset` applies
/// to a deployment's container.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchPreset {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub env: Vec<EnvVar>,
}

impl PatchPreset {
    fn new<I>(name: &str, description: &str, env: I) -> Self
    where
        I: IntoIterator<Item = EnvVar>,
    {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            env: env.into_iter().collect(),
        }
    }

    /// Presets shipped in the default configuration. They toggle the
    /// discovery client of a Spring Cloud Kubernetes application between its
    /// blocking and reactive flavours and scope it to namespaces.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "discovery-external-name-services",
                "Include ExternalName services in discovery results",
                [
                    debug_logging(FABRIC8_DISCOVERY),
                    EnvVar::new("SPRING_CLOUD_KUBERNETES_DISCOVERY_INCLUDEEXTERNALNAMESERVICES", "TRUE"),
                ],
            ),
            Self::new(
                "discovery-blocking",
                "Blocking discovery client only, with health debug logging",
                [
                    debug_logging(COMMONS_DISCOVERY),
                    debug_logging(DISCOVERY_HEALTH),
                    debug_logging(FABRIC8_DISCOVERY),
                    EnvVar::new("SPRING_CLOUD_DISCOVERY_REACTIVE_ENABLED", "FALSE"),
                ],
            ),
            Self::new(
                "discovery-blocking-and-reactive",
                "Both discovery clients with debug logging",
                [
                    debug_logging(COMMONS_DISCOVERY),
                    debug_logging(DISCOVERY_HEALTH_REACTIVE),
                    debug_logging(FABRIC8_DISCOVERY_REACTIVE),
                    debug_logging(FABRIC8_DISCOVERY),
                    debug_logging(DISCOVERY_HEALTH),
                ],
            ),
            Self::new(
                "discovery-reactive",
                "Reactive discovery client only, with health debug logging",
                [
                    debug_logging(COMMONS_DISCOVERY),
                    debug_logging(DISCOVERY_HEALTH_REACTIVE),
                    debug_logging(FABRIC8_DISCOVERY_REACTIVE),
                    debug_logging(FABRIC8_DISCOVERY),
                    EnvVar::new("SPRING_CLOUD_DISCOVERY_BLOCKING_ENABLED", "FALSE"),
                ],
            ),
            Self::new(
                "namespaces-uat-filter",
                "Discover in a-uat and b-uat, keeping every namespace ending in uat",
                namespaces(&["a-uat", "b-uat"]).chain([
                    EnvVar::new(DISCOVERY_FILTER, "#root.metadata.namespace matches '^.*uat$'"),
                    debug_logging(FABRIC8_DISCOVERY),
                ]),
            ),
            Self::new(
                "namespace-a-uat-filter",
                "Discover in a-uat and b-uat, keeping only a-uat",
                namespaces(&["a-uat", "b-uat"]).chain([
                    EnvVar::new(DISCOVERY_FILTER, "#root.metadata.namespace matches 'a-uat$'"),
                    debug_logging(FABRIC8_DISCOVERY),
                ]),
            ),
            Self::new("namespace-left", "Discover in namespace-left only", namespaces(&[
                "namespace-left",
            ])),
        ]
    }
}

fn debug_logging(logger: &str) -> EnvVar { EnvVar::new(format!("LOGGING_LEVEL_{logger}"), "DEBUG") }

fn namespaces<'a>(namespaces: &'a [&'a str]) -> impl Iterator<Item = EnvVar> + 'a {
    namespaces
        .iter()
        .enumerate()
        .map(|(index, namespace)| EnvVar::new(format!("{DISCOVERY_NAMESPACES}_{index}"), *namespace))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_default_preset_names_are_unique() {
        let presets = PatchPreset::defaults();
        let names = presets.iter().map(|preset| preset.name.as_str()).collect::<HashSet<_>>();
        assert_eq!(names.len(), presets.len());
        assert_eq!(presets.len(), 7);
    }

    #[test]
    fn test_namespace_indices() {
        let preset = PatchPreset::defaults()
            .into_iter()
            .find(|preset| preset.name == "namespaces-uat-filter")
            .unwrap();
        assert_eq!(preset.env[0], EnvVar::new("SPRING_CLOUD_KUBERNETES_DISCOVERY_NAMESPACES_0", "a-uat"));
        assert_eq!(preset.env[1], EnvVar::new("SPRING_CLOUD_KUBERNETES_DISCOVERY_NAMESPACES_1", "b-uat"));
        assert_eq!(preset.env[2].value, "#root.metadata.namespace matches '^.*uat$'");
    }

    #[test]
    fn test_debug_logging_name() {
        assert_eq!(
            debug_logging(FABRIC8_DISCOVERY).name,
            "LOGGING_LEVEL_ORG_SPRINGFRAMEWORK_CLOUD_KUBERNETES_FABRIC8_DISCOVERY"
        );
    }
}
