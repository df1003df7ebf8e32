use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::Config;

/// Contract the workers consume: download a URL and return its body.
///
/// Implementations must be safe to call from any worker thread. A non-2xx
/// response is an error, never an empty-body success.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP client for worker threads.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client with the crawler defaults: browser-like user agent,
    /// fixed total timeout, redirects followed, certificate errors ignored.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(Config::FETCH_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(Config::USER_AGENT)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| FetchError::ClientBuildError(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpClient {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        response
            .text()
            .map_err(|e| FetchError::BodyError(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    NetworkError(String),

    #[error("connection refused")]
    ConnectionRefused,

    #[error("DNS resolution failed")]
    DnsError,

    #[error("request timeout")]
    Timeout,

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("failed to read response body: {0}")]
    BodyError(String),

    #[error("failed to build HTTP client: {0}")]
    ClientBuildError(String),
}

impl FetchError {
    fn from_reqwest_error(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return FetchError::Timeout;
        }

        let message = error.to_string().to_lowercase();

        if error.is_connect() {
            if message.contains("connection refused") {
                return FetchError::ConnectionRefused;
            }
            if message.contains("dns") || message.contains("no such host") {
                return FetchError::DnsError;
            }
        }

        FetchError::NetworkError(error.to_string())
    }
}
