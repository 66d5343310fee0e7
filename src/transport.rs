//! HTTP transport capability used by every pipeline stage.
//!
//! The pipeline only needs "GET this URL, give me the body". [`Transport`]
//! captures that so tests can substitute a stub, while [`HttpTransport`] is
//! the reqwest-backed implementation carrying the identifying headers.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::config::ServiceConfig;
use crate::error::ScrapingError;

/// Fetches a URL and returns the response body.
///
/// Uses `async_trait` so the scraper can hold an `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET request for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapingError::Transport`] for network failures and
    /// non-success statuses.
    async fn get(&self, url: &Url) -> Result<String, ScrapingError>;
}

/// reqwest-backed transport with the configured User-Agent and gzip support.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a client from the service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapingError::Transport`] when client construction fails.
    pub fn new(config: &ServiceConfig) -> Result<Self, ScrapingError> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .gzip(true);
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.read_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            ScrapingError::transport(&config.api_base_url, format!("HTTP client construction failed: {e}"))
        })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip_all, fields(url = %url))]
    async fn get(&self, url: &Url) -> Result<String, ScrapingError> {
        debug!("sending request");
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(error = %e, "request failed");
            ScrapingError::transport(url.as_str(), e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "non-success response");
            return Err(ScrapingError::transport(
                url.as_str(),
                format!("HTTP {}", status.as_u16()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| ScrapingError::transport(url.as_str(), format!("failed to read body: {e}")))
    }
}
