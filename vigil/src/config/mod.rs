mod env_var;
mod error;
mod preset;

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use vigil_base::consts::DEFAULT_PROBE_REQUEST_TIMEOUT_SECS;
use vigil_poll::{PollPolicy, RetryPolicy};

pub use self::{
    env_var::EnvVar,
    error::Error,
    preset::PatchPreset,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Budget and cadence for waiting on a log line.
    #[serde(default)]
    pub poll: PollPolicy,

    /// Fixed-delay retry for one-shot requests against a starting workload.
    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default = "PatchPreset::defaults")]
    pub presets: Vec<PatchPreset>,

    #[serde(default)]
    pub log: vigil_cli::config::LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll: PollPolicy::default(),
            retry: RetryPolicy::default(),
            probe: ProbeConfig::default(),
            presets: PatchPreset::defaults(),
            log: vigil_cli::config::LogConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeConfig {
    /// Upper bound on a single HTTP request, retries not included.
    #[serde(default = "ProbeConfig::default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self { request_timeout_seconds: Self::default_request_timeout_seconds() }
    }
}

impl ProbeConfig {
    #[inline]
    #[must_use]
    pub const fn default_request_timeout_seconds() -> u64 { DEFAULT_PROBE_REQUEST_TIMEOUT_SECS }
}

impl Config {
    pub fn search_config_file_path() -> PathBuf {
        let paths = vec![Self::default_path()]
            .into_iter()
            .chain(vigil_base::fallback_project_config_directories().into_iter().map(|mut path| {
                path.push(vigil_base::CLI_CONFIG_NAME);
                path
            }))
            .collect::<Vec<_>>();
        for path in paths {
            let Ok(exists) = path.try_exists() else {
                continue;
            };
            if exists {
                return path;
            }
        }
        Self::default_path()
    }

    #[inline]
    pub fn default_path() -> PathBuf {
        [vigil_base::PROJECT_CONFIG_DIR.to_path_buf(), PathBuf::from(vigil_base::CLI_CONFIG_NAME)]
            .into_iter()
            .collect()
    }

    /// Loads the configuration at `path`, falling back to the defaults when
    /// the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path
            .as_ref()
            .try_resolve()
            .map(|path| path.to_path_buf())
            .with_context(|_| error::ResolveFilePathSnafu { file_path: path.as_ref().to_path_buf() })?;

        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(Error::OpenConfig { filename: path, source }),
        };

        Self::from_yaml_slice(&data, path)
    }

    fn from_yaml_slice(data: &[u8], path: PathBuf) -> Result<Self, Error> {
        let mut config: Self =
            serde_yaml::from_slice(data).context(error::ParseConfigSnafu { filename: path.clone() })?;

        let mut names = HashSet::new();
        if let Some(preset) = config.presets.iter().find(|preset| !names.insert(preset.name.as_str()))
        {
            return Err(Error::DuplicatePreset { filename: path, name: preset.name.clone() });
        }

        config.log.file_path = match config.log.file_path.map(|path| {
            path.try_resolve()
                .map(|path| path.to_path_buf())
                .with_context(|_| error::ResolveFilePathSnafu { file_path: path.clone() })
        }) {
            Some(Ok(path)) => Some(path),
            Some(Err(err)) => return Err(err),
            None => None,
        };

        Ok(config)
    }

    /// The default configuration rendered as YAML.
    pub fn template_basic() -> Result<String, Error> {
        serde_yaml::to_string(&Self::default()).context(error::SerializeConfigSnafu)
    }

    pub fn find_preset_by_name(&self, name: &str) -> Option<&PatchPreset> {
        self.presets.iter().find(|preset| preset.name == name)
    }
}
