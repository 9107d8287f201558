//! Single-hop fetcher shared by every HTTP stage of the chain.
//!
//! Phones and call managers on internal networks present self-signed
//! certificates, so the client accepts any certificate. There is no retry:
//! a failed fetch ends the run.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::user_agent;

use super::DirectoryError;

/// Default TCP connect timeout for directory fetches.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default whole-request timeout for directory fetches.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Client policy for directory fetches.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            user_agent: user_agent::default_user_agent(),
        }
    }
}

/// One GET, returning the complete response body.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches `url` and returns its body.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] on an unusable URL, a connection failure or
    /// timeout, a non-success status, or a body that cannot be fully read.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DirectoryError>;
}

/// [`Fetch`] implementation over a reqwest client that skips certificate checks.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds the fetcher from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Configuration`] when client construction fails.
    pub fn new(settings: &FetchSettings) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.read_timeout)
            .user_agent(settings.user_agent.clone())
            .danger_accept_invalid_certs(true)
            .gzip(true)
            .build()
            .map_err(|error| {
                DirectoryError::configuration(
                    &format!("HTTP client construction failed: {error}"),
                    "Check the TLS backend and proxy environment variables",
                )
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DirectoryError> {
        let parsed = Url::parse(url).map_err(|_| DirectoryError::invalid_url(url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DirectoryError::invalid_url(url));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|error| DirectoryError::network(url, error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::http_status(url, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|error| DirectoryError::transfer(url, &error.to_string()))?;
        debug!(status = status.as_u16(), bytes = body.len(), "Fetched document");
        Ok(body.to_vec())
    }
}
