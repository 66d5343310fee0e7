//! Service configuration passed into the scraper pipeline.
//!
//! Holds the expected wiki origin, the base URL API requests are sent to,
//! and the identifying headers every request carries.

use std::time::Duration;

use url::Url;

/// Origin every input URL must match.
pub const DEFAULT_ORIGIN: &str = "https://liquipedia.net";

/// Contact URL included in the User-Agent (Liquipedia API terms require one).
const PROJECT_UA_URL: &str = "https://github.com/fierce/liquipedia-fetch";

/// Default User-Agent identifying the tool to the wiki.
#[must_use]
pub fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("liquipedia-fetch/{version} (spoiler-free-vod-tool; +{PROJECT_UA_URL})")
}

/// Explicit configuration for one [`Scraper`](crate::Scraper).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Origin input URLs are validated against. See [`ServiceConfig::expected_origin`].
    pub origin: String,
    /// Base URL API requests are issued against. Usually equal to `origin`.
    pub api_base_url: String,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// Optional connect timeout. `None` waits indefinitely.
    pub connect_timeout: Option<Duration>,
    /// Optional whole-request timeout. `None` waits indefinitely.
    pub read_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            api_base_url: DEFAULT_ORIGIN.to_string(),
            user_agent: default_user_agent(),
            connect_timeout: None,
            read_timeout: None,
        }
    }
}

impl ServiceConfig {
    /// Config for a custom origin; API requests go to the same origin.
    #[must_use]
    pub fn with_origin(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            api_base_url: origin.clone(),
            origin,
            ..Self::default()
        }
    }

    /// Overrides the API base URL (for testing with wiremock).
    #[must_use]
    pub fn api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self
    }

    /// Overrides the User-Agent header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets connect and read timeouts.
    #[must_use]
    pub fn timeouts(mut self, connect: Option<Duration>, read: Option<Duration>) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    /// The configured origin in serialized `scheme://host[:port]` form.
    ///
    /// Scheme and host are lowercased and default ports dropped, the same way
    /// input URLs are serialized. A value that is not a URL only loses its
    /// trailing slashes and will then match nothing.
    #[must_use]
    pub fn expected_origin(&self) -> String {
        match Url::parse(&self.origin) {
            Ok(url) if url.origin().is_tuple() => url.origin().ascii_serialization(),
            _ => self.origin.trim_end_matches('/').to_string(),
        }
    }
}
