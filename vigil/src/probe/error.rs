use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to build HTTP client, error: {source}"))]
    BuildHttpClient { source: reqwest::Error },

    #[snafu(display("Invalid URL '{url}'"))]
    InvalidUrl { url: String },

    #[snafu(display("Failed to send request to {url}, error: {source}"))]
    SendRequest { url: String, source: reqwest::Error },

    #[snafu(display("Request to {url} returned {status}"))]
    UnexpectedStatus { url: String, status: reqwest::StatusCode },

    #[snafu(display("Failed to read response body from {url}, error: {source}"))]
    ReadBody { url: String, source: reqwest::Error },

    #[snafu(display("Response body from {url} does not contain '{expected}'"))]
    BodyMismatch { url: String, expected: String },

    #[snafu(display("Gave up on {url} after {attempts} attempts, last error: {source}"))]
    Exhausted {
        url: String,
        attempts: u32,
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
    },
}
