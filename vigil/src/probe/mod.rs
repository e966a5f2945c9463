//! HTTP readiness probe.
//!
//! Every request is retried with a fixed delay while the endpoint is
//! unreachable, answers with a non-success status or, when an expected
//! substring is configured, answers with a body that does not contain it.

mod error;

use std::time::Duration;

use snafu::ResultExt;
use vigil_poll::{RetryError, RetryPolicy};

pub use self::error::Error;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Clone, Debug)]
pub struct HttpProbe {
    client: reqwest::Client,
    retry: RetryPolicy,
    expect: Option<String>,
}

impl HttpProbe {
    pub fn new(request_timeout: Duration, retry: RetryPolicy) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context(error::BuildHttpClientSnafu)?;
        Ok(Self { client, retry, expect: None })
    }

    /// Require the response body to contain `expected`.
    #[must_use]
    pub fn expect_body_contains(mut self, expected: Option<String>) -> Self {
        self.expect = expected.filter(|expected| !expected.is_empty());
        self
    }

    /// Sends `GET url` until it succeeds or the retry policy is exhausted.
    pub async fn get(&self, url: &str) -> Result<ProbeResponse, Error> {
        if reqwest::Url::parse(url).is_err() {
            return error::InvalidUrlSnafu { url }.fail();
        }

        vigil_poll::retry(&self.retry, || self.get_once(url)).await.map_err(
            |RetryError::Exhausted { attempts, source }| Error::Exhausted {
                url: url.to_string(),
                attempts,
                source: Box::new(source),
            },
        )
    }

    async fn get_once(&self, url: &str) -> Result<ProbeResponse, Error> {
        let response =
            self.client.get(url).send().await.with_context(|_| error::SendRequestSnafu { url })?;

        let status = response.status();
        if !status.is_success() {
            return error::UnexpectedStatusSnafu { url, status }.fail();
        }

        let body = response.text().await.with_context(|_| error::ReadBodySnafu { url })?;
        if let Some(expected) = &self.expect
            && !body.contains(expected.as_str())
        {
            return error::BodyMismatchSnafu { url, expected: expected.clone() }.fail();
        }

        Ok(ProbeResponse { status: status.as_u16(), body })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    /// Serves `responses` in order, one per connection, repeating the last.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/health", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        let _handle = tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else { break };
                let index = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = responses[index.min(responses.len() - 1)];

                let mut buf = [0_u8; 1024];
                let _read = stream.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status} X\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _write = stream.write_all(response.as_bytes()).await;
                let _shutdown = stream.shutdown().await;
            }
        });

        (url, hits)
    }

    fn probe(max_retries: u32) -> HttpProbe {
        HttpProbe::new(
            Duration::from_secs(5),
            RetryPolicy::fixed_delay(max_retries, Duration::from_millis(10)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let (url, hits) = serve(vec![(503, "starting"), (503, "starting"), (200, "success")]).await;

        let response = probe(5).get(&url).await.unwrap();

        assert_eq!(response, ProbeResponse { status: 200, body: "success".to_string() });
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_body_must_contain_expected() {
        let (url, hits) = serve(vec![(200, "Hello, '', Goodbye, ''"), (
            200,
            "Hello, 'hi', Goodbye, 'bye'",
        )])
        .await;

        let response =
            probe(5).expect_body_contains(Some("Goodbye, 'bye'".to_string())).get(&url).await.unwrap();

        assert_eq!(response.body, "Hello, 'hi', Goodbye, 'bye'");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_with_last_error() {
        let (url, hits) = serve(vec![(500, "boom")]).await;

        let err = probe(2).get(&url).await.unwrap_err();

        match err {
            Error::Exhausted { attempts, source, .. } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*source, Error::UnexpectedStatus { status, .. } if status == 500));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_retried() {
        let err = probe(15).get("not a url").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }
}
