//! Page fetching.
//!
//! The dispatcher only needs `fetch(url) -> body or error`, so fetching sits
//! behind the [`Fetcher`] trait. [`HttpFetcher`] is the reqwest implementation
//! used by the CLI.

use crate::error::ExtractorError;
use crate::types::ExtractConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

/// Something that turns a URL into a page body.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` once. No retries.
    async fn fetch(&self, url: &str) -> Result<String, ExtractorError>;
}

/// HTTP GET fetcher backed by a single shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpFetcher {
    /// HTTP client reused by every unit of the run
    http_client: reqwest::Client,
    /// Per-request timeout, if any
    timeout: Option<Duration>,
}

impl HttpFetcher {
    /// Create a fetcher with default settings (insecure TLS, no timeout).
    pub fn new() -> Result<Self, ExtractorError> {
        Self::with_config(&ExtractConfig::default())
    }

    /// Create a fetcher honoring `insecure` and `timeout` from `config`.
    pub fn with_config(config: &ExtractConfig) -> Result<Self, ExtractorError> {
        let mut builder = reqwest::Client::builder();

        if config.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder.build().map_err(|e| {
            ExtractorError::internal(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            http_client,
            timeout: config.timeout,
        })
    }

    fn map_request_error(&self, url: &str, err: reqwest::Error) -> ExtractorError {
        match self.timeout {
            Some(duration) if err.is_timeout() => ExtractorError::timeout(url, duration),
            _ if err.is_connect() => {
                ExtractorError::network_with_source(url, "Connection failed", err.to_string())
            }
            _ => ExtractorError::network_with_source(url, "Request failed", err.to_string()),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ExtractorError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_request_error(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ExtractorError::http_status(url, status.as_u16()));
        }

        response.text().await.map_err(|e| match self.timeout {
            Some(duration) if e.is_timeout() => ExtractorError::timeout(url, duration),
            _ => ExtractorError::body_read(url, e.to_string()),
        })
    }
}
