//! The `vigil` command-line interface.
//!
//! Vigil waits for Kubernetes workloads to become ready: it polls pod logs
//! for a line, patches deployments and probes HTTP endpoints, each with a
//! bounded time or attempt budget.
//!
//! # Examples
//!
//! ```bash
//! # Wait until the newest pod labelled app=discovery logs "Started"
//! vigil await-log "Started" --app discovery
//!
//! # Enable a preset on a deployment and wait for the new pod to come up
//! vigil patch discovery --preset discovery-blocking --await-log "Started"
//!
//! # Retry a GET until the endpoint answers 2xx with the expected body
//! vigil probe http://localhost:8080/meet --expect "Hello"
//! ```

mod await_log;
pub mod error;
mod internal;
mod patch;
mod preset;
mod probe;

use std::{io::Write, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use snafu::ResultExt;
use tokio::runtime::Runtime;
use vigil_base::CLI_PROGRAM_NAME;

pub use self::error::Error;
use self::{
    await_log::AwaitLogCommand, patch::PatchCommand, preset::PresetCommands, probe::ProbeCommand,
};
use crate::{config::Config, shadow};

/// `Cli` is the entry point of the Vigil command-line interface.
///
/// It parses the command-line arguments, loads the configuration and
/// dispatches to the selected subcommand.
#[derive(Parser)]
#[command(
    name = CLI_PROGRAM_NAME,
    author,
    version,
    long_version = shadow::CLAP_LONG_VERSION,
    about = "Vigil CLI: wait for Kubernetes workloads to become ready.",
    long_about = "Vigil waits for Kubernetes workloads to become ready. It polls pod logs for \
                  a line with a bounded time budget, patches the environment of deployments \
                  and probes HTTP endpoints with a fixed-delay retry.",
    color = clap::ColorChoice::Auto
)]
pub struct Cli {
    /// The subcommand to execute.
    #[clap(subcommand)]
    commands: Option<Commands>,

    /// Path to the configuration file.
    ///
    /// Defaults to `~/.config/vigil/config.yaml` or the path in the
    /// `VIGIL_CONFIG_FILE_PATH` environment variable. A missing file means
    /// the default configuration.
    #[clap(
        long = "config",
        short = 'c',
        env = "VIGIL_CONFIG_FILE_PATH",
        help = "Specify a configuration file. Defaults to ~/.config/vigil/config.yaml or \
                VIGIL_CONFIG_FILE_PATH env var."
    )]
    config_file: Option<PathBuf>,

    /// Overrides `log.level` of the configuration file.
    #[clap(
        long = "log-level",
        env = "VIGIL_LOG_LEVEL",
        help = "Set the logging level (e.g., info, debug, trace)."
    )]
    log_level: Option<tracing::Level>,
}

/// The subcommands of `vigil`.
#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Prints the client version and, unless `--client` is given, the version
    /// of the Kubernetes API server.
    #[command(about = "Display client and server version information")]
    Version {
        /// Only print the client version; no cluster access is needed.
        #[clap(long = "client", help = "If true, shows client version only (no server required).")]
        client: bool,
    },

    /// Writes a completion script for `shell` to stdout.
    #[command(about = "Generate shell completion script for the specified shell (bash, zsh, fish)")]
    Completions {
        /// The shell to generate completions for.
        shell: clap_complete::Shell,
    },

    /// Writes the default configuration, presets included, as YAML to stdout.
    #[command(about = "Output the default configuration in YAML format")]
    DefaultConfig,

    /// Polls the logs of a pod until they contain a pattern.
    ///
    /// Succeeds on the first poll whose logs contain the pattern and fails
    /// with `Error::LogPatternTimedOut` once the time budget is spent.
    #[command(
        aliases = ["a", "await"],
        about = "Wait until the logs of a pod contain a line, or fail after a timeout"
    )]
    AwaitLog(AwaitLogCommand),

    /// Applies a strategic-merge patch to one container of a deployment and
    /// optionally waits for a pod of the new rollout to log a pattern.
    #[command(
        alias = "p",
        about = "Patch the image and environment of a deployment's container"
    )]
    Patch(PatchCommand),

    /// Inspects the patch presets of the configuration.
    #[command(about = "Manage deployment patch presets")]
    Preset {
        /// The preset subcommand to execute.
        #[command(subcommand)]
        commands: PresetCommands,
    },

    /// Sends `GET` requests to a URL with a fixed-delay retry until it answers
    /// with a success status (and the expected body, if one is given).
    #[command(about = "Send GET requests to a URL until it answers successfully")]
    Probe(ProbeCommand),
}

impl Default for Cli {
    fn default() -> Self { Self::parse() }
}

impl Cli {
    /// Loads the configuration file and applies the `--log-level` override.
    fn load_config(&self) -> Result<Config, Error> {
        let mut config =
            Config::load(self.config_file.clone().unwrap_or_else(Config::search_config_file_path))?;

        if let Some(log_level) = self.log_level {
            config.log.level = log_level;
        }

        Ok(config)
    }

    /// Runs the parsed command and returns the process exit code.
    ///
    /// Commands that print static information (`version --client`,
    /// `completions`, `default-config`) run without loading the
    /// configuration. `preset` and `probe` need no Kubernetes client.
    ///
    /// # Returns
    ///
    /// `0` on success, `-1` when no subcommand was given (the help text is
    /// printed to stderr).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded, the tokio
    /// runtime or the Kubernetes client cannot be created, or the command
    /// fails.
    pub fn run(self) -> Result<i32, Error> {
        let client_version = Self::command().get_version().unwrap_or_default().to_string();
        match self.commands {
            Some(Commands::Version { client }) if client => {
                std::io::stdout()
                    .write_all(Self::command().render_long_version().as_bytes())
                    .context(error::WriteStdoutSnafu)?;
                std::io::stdout()
                    .write_all(format!("Client Version: {client_version}\n").as_bytes())
                    .context(error::WriteStdoutSnafu)?;

                return Ok(0);
            }
            Some(Commands::Completions { shell }) => {
                let mut app = Self::command();
                let bin_name = app.get_name().to_string();
                clap_complete::generate(shell, &mut app, bin_name, &mut std::io::stdout());
                return Ok(0);
            }
            Some(Commands::DefaultConfig) => {
                std::io::stdout()
                    .write_all(Config::template_basic()?.as_bytes())
                    .context(error::WriteStdoutSnafu)?;
                return Ok(0);
            }
            None => {
                let help = Self::command().render_long_help().ansi().to_string();
                std::io::stderr().write_all(help.as_bytes()).context(error::WriteStdoutSnafu)?;
                return Ok(-1);
            }
            _ => {}
        }

        let config = self.load_config()?;
        config.log.registry();

        let fut = async move {
            match self.commands {
                Some(Commands::Preset { commands }) => return commands.run(config).await.map(|()| 0),
                Some(Commands::Probe(cmd)) => return cmd.run(config).await.map(|()| 0),
                _ => {}
            }

            let kube_client = kube::Client::try_default().await.context(error::KubeConfigSnafu)?;
            match self.commands {
                Some(Commands::Version { .. }) => {
                    let server_version = kube_client.apiserver_version().await.map_or_else(
                        |_| "unknown".to_string(),
                        |info| format!("{}.{}", info.major, info.minor),
                    );
                    let info = format!(
                        "Client Version: {client_version}\nServer Version: {server_version}\n",
                    );
                    std::io::stdout()
                        .write_all(Self::command().render_long_version().as_bytes())
                        .context(error::WriteStdoutSnafu)?;
                    std::io::stdout()
                        .write_all(info.as_bytes())
                        .context(error::WriteStdoutSnafu)?;
                }
                Some(Commands::AwaitLog(cmd)) => cmd.run(kube_client, config).await?,
                Some(Commands::Patch(cmd)) => cmd.run(kube_client, config).await?,
                _ => {}
            }

            Ok(0)
        };

        Runtime::new().context(error::InitializeTokioRuntimeSnafu)?.block_on(fut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() { Cli::command().debug_assert(); }

    #[test]
    fn test_parse_await_log() {
        let cli = Cli::try_parse_from([
            "vigil",
            "await-log",
            "ready: listening on 8080",
            "--app",
            "discovery",
            "-t",
            "10",
            "--fail-fast",
        ])
        .unwrap();

        let Some(Commands::AwaitLog(cmd)) = cli.commands else {
            panic!("expected await-log");
        };
        assert_eq!(cmd.pattern, "ready: listening on 8080");
        assert_eq!(cmd.target.app.as_deref(), Some("discovery"));
        assert_eq!(cmd.timeout_secs, Some(10));
        assert!(cmd.fail_fast);
    }

    #[test]
    fn test_pod_name_conflicts_with_selector() {
        let result =
            Cli::try_parse_from(["vigil", "await-log", "ready", "-p", "web-0", "-l", "app=web"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_patch_env() {
        let cli = Cli::try_parse_from([
            "vigil",
            "patch",
            "discovery",
            "--preset",
            "discovery-blocking",
            "-e",
            "SPRING_CLOUD_KUBERNETES_DISCOVERY_FILTER=#root.metadata.namespace matches 'a-uat$'",
            "--dry-run",
        ])
        .unwrap();

        let Some(Commands::Patch(cmd)) = cli.commands else {
            panic!("expected patch");
        };
        assert_eq!(cmd.presets, vec!["discovery-blocking".to_string()]);
        assert_eq!(cmd.env[0].value, "#root.metadata.namespace matches 'a-uat$'");
        assert!(cmd.dry_run);
    }

    #[test]
    fn test_invalid_env_is_rejected() {
        let result = Cli::try_parse_from(["vigil", "patch", "discovery", "-e", "NOVALUE"]);
        assert!(result.is_err());
    }
}
