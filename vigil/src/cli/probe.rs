//! `vigil probe`: wait for an HTTP endpoint to answer.

use std::time::Duration;

use clap::Args;
use snafu::ResultExt;
use tokio::io::AsyncWriteExt;
use vigil_poll::RetryPolicy;

use crate::{
    cli::{Error, error},
    config::Config,
    probe::HttpProbe,
};

#[derive(Args, Clone)]
pub struct ProbeCommand {
    #[arg(help = "URL to send GET requests to")]
    pub url: String,

    #[arg(
        short = 'e',
        long = "expect",
        help = "Only accept responses whose body contains this text"
    )]
    pub expect: Option<String>,

    #[arg(
        short = 'r',
        long = "max-retries",
        help = "Retries after the first attempt. Defaults to `retry.maxRetries` of the \
                configuration (15)."
    )]
    pub max_retries: Option<u32>,

    #[arg(
        short = 'd',
        long = "delay-seconds",
        help = "Seconds between attempts. Defaults to `retry.delaySeconds` of the configuration \
                (1)."
    )]
    pub delay_secs: Option<u64>,

    #[arg(short = 'q', long = "quiet", help = "Do not print the response body")]
    pub quiet: bool,
}

impl ProbeCommand {
    pub async fn run(self, config: Config) -> Result<(), Error> {
        let Self { url, expect, max_retries, delay_secs, quiet } = self;

        let retry = RetryPolicy::fixed_delay(
            max_retries.unwrap_or(config.retry.max_retries),
            delay_secs.map_or(config.retry.delay, Duration::from_secs),
        );
        let request_timeout = Duration::from_secs(config.probe.request_timeout_seconds);

        tracing::info!("Probing {url} (up to {} attempts)", retry.max_attempts());
        let response =
            HttpProbe::new(request_timeout, retry)?.expect_body_contains(expect).get(&url).await?;
        tracing::info!("{url} answered with status {}", response.status);

        if quiet {
            return Ok(());
        }
        let mut stdout = tokio::io::stdout();
        stdout.write_all(response.body.as_bytes()).await.context(error::WriteStdoutSnafu)?;
        if !response.body.ends_with('\n') {
            stdout.write_u8(b'\n').await.context(error::WriteStdoutSnafu)?;
        }
        stdout.flush().await.context(error::WriteStdoutSnafu)
    }
}
