//! Logging configuration shared by the Vigil binaries.
//!
//! `LogConfig` decides where `tracing` events go (stdout, stderr, journald or
//! a file), how verbose they are and how they are formatted. Command output is
//! written to stdout, so diagnostics default to stderr.
use std::{fs::OpenOptions, path::PathBuf};

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use tracing_subscriber::{
    Layer, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
};

/// Where and how log messages are emitted.
///
/// Each sink is independent: any combination of stdout, stderr, journald and
/// a file can be enabled. Events below `level` are dropped before reaching
/// any sink.
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    /// Append logs to this file when set. Written without ANSI colors; the
    /// sink is skipped if the file cannot be opened.
    #[serde(default = "LogConfig::default_file_path")]
    pub file_path: Option<PathBuf>,

    /// Whether logs are sent to `journald`. Skipped when no journald socket
    /// is available.
    #[serde(default = "LogConfig::default_emit_journald")]
    pub emit_journald: bool,

    /// Whether logs are written to standard output. Off by default since
    /// command output goes there.
    #[serde(default = "LogConfig::default_emit_stdout")]
    pub emit_stdout: bool,

    /// Whether logs are written to standard error.
    #[serde(default = "LogConfig::default_emit_stderr")]
    pub emit_stderr: bool,

    /// Layout of formatted log lines.
    #[serde(default)]
    pub format: LogFormat,

    /// The minimum level to be recorded, e.g. `info` or `debug`.
    #[serde(default = "LogConfig::default_log_level")]
    #[serde_as(as = "DisplayFromStr")]
    pub level: tracing::Level,
}

impl Default for LogConfig {
    /// `INFO` and above to stderr in the compact format; no journald, stdout
    /// or file output.
    fn default() -> Self {
        Self {
            file_path: Self::default_file_path(),
            emit_journald: Self::default_emit_journald(),
            emit_stdout: Self::default_emit_stdout(),
            emit_stderr: Self::default_emit_stderr(),
            format: LogFormat::default(),
            level: Self::default_log_level(),
        }
    }
}

impl LogConfig {
    #[inline]
    #[must_use]
    pub const fn default_log_level() -> tracing::Level { tracing::Level::INFO }

    #[inline]
    #[must_use]
    pub const fn default_file_path() -> Option<PathBuf> { None }

    #[inline]
    #[must_use]
    pub const fn default_emit_journald() -> bool { false }

    #[inline]
    #[must_use]
    pub const fn default_emit_stdout() -> bool { false }

    #[inline]
    #[must_use]
    pub const fn default_emit_stderr() -> bool { true }

    /// Installs the global `tracing` subscriber described by this config.
    ///
    /// # Panics
    ///
    /// Panics if a global subscriber has already been installed.
    pub fn registry(&self) {
        let Self { emit_journald, file_path, emit_stdout, emit_stderr, format, level } = self;

        let filter_layer = tracing_subscriber::filter::LevelFilter::from_level(*level);

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(emit_journald.then(|| LogDriver::Journald.layer(*format)))
            .with(file_path.clone().map(|path| LogDriver::File(path).layer(*format)))
            .with(emit_stdout.then(|| LogDriver::Stdout.layer(*format)))
            .with(emit_stderr.then(|| LogDriver::Stderr.layer(*format)))
            .init();
    }
}

/// Layout of formatted log lines.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LogFormat {
    /// Multi-line, human friendly output with thread information.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
}

#[derive(Clone, Debug)]
enum LogDriver {
    Stdout,
    Stderr,
    Journald,
    File(PathBuf),
}

impl LogDriver {
    /// Builds the layer for this driver, or `None` when the sink cannot be
    /// opened (unwritable file, no journald socket).
    #[allow(clippy::type_repetition_in_bounds)]
    fn layer<S>(self, format: LogFormat) -> Option<Box<dyn Layer<S> + Send + Sync + 'static>>
    where
        S: tracing::Subscriber,
        for<'a> S: LookupSpan<'a>,
    {
        if let Self::Journald = self {
            return Some(Box::new(tracing_journald::layer().ok()?));
        }

        match format {
            LogFormat::Pretty => {
                let fmt = tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_thread_ids(true)
                    .with_thread_names(true);
                match self {
                    Self::Stdout => Some(Box::new(fmt.with_writer(std::io::stdout))),
                    Self::Stderr => Some(Box::new(fmt.with_writer(std::io::stderr))),
                    Self::File(path) => {
                        let file = OpenOptions::new().create(true).append(true).open(path).ok()?;
                        Some(Box::new(fmt.with_ansi(false).with_writer(file)))
                    }
                    Self::Journald => None,
                }
            }
            LogFormat::Compact => {
                let fmt = tracing_subscriber::fmt::layer().compact().with_target(false);
                match self {
                    Self::Stdout => Some(Box::new(fmt.with_writer(std::io::stdout))),
                    Self::Stderr => Some(Box::new(fmt.with_writer(std::io::stderr))),
                    Self::File(path) => {
                        let file = OpenOptions::new().create(true).append(true).open(path).ok()?;
                        Some(Box::new(fmt.with_ansi(false).with_writer(file)))
                    }
                    Self::Journald => None,
                }
            }
        }
    }
}
