//! Error types for page resolution and content fetching.
//!
//! Every failure in the pipeline maps to [`ScrapingError`], following the
//! What/Why/Fix pattern used across the project.

use thiserror::Error;

/// Errors that can occur while resolving a wiki URL into page content.
#[derive(Debug, Clone, Error)]
pub enum ScrapingError {
    /// Input could not be parsed as an absolute URL
    #[error("invalid URL '{url}': {reason}\n  Suggestion: Pass a full page URL such as https://liquipedia.net/dota2/Team_Liquid")]
    InvalidUrl {
        /// The rejected input
        url: String,
        /// Parser error message
        reason: String,
    },

    /// URL does not belong to the configured wiki service
    #[error("origin mismatch for '{url}': expected '{expected}', got '{actual}'\n  Suggestion: Only {expected} pages are supported")]
    OriginMismatch {
        /// The rejected URL
        url: String,
        /// Configured service origin
        expected: String,
        /// Origin found in the URL
        actual: String,
    },

    /// Lookup returned an empty page collection
    #[error("page not found for title '{title}'\n  Suggestion: Check the page title in the URL")]
    PageNotFound {
        /// Title that was looked up
        title: String,
    },

    /// Lookup returned more than one page for the title
    #[error("ambiguous match: found {count} pages with the name '{title}', expected only 1\n  Suggestion: Use the exact page title")]
    AmbiguousMatch {
        /// Title that was looked up
        title: String,
        /// Number of pages returned
        count: usize,
    },

    /// Title is known to the wiki but has no backing page
    #[error("no content for page '{url}'\n  Suggestion: The page may not exist yet; check the URL on the wiki")]
    NoContent {
        /// The page URL
        url: String,
    },

    /// Rendered markup was absent or empty
    #[error("could not parse rendered content from '{url}'\n  Suggestion: The page may be empty or a redirect; open it on the wiki to check")]
    RenderedContent {
        /// The page URL
        url: String,
    },

    /// Raw wikitext was absent or empty
    #[error("could not parse raw content from '{url}'\n  Suggestion: The page may have no saved revision; open its history on the wiki to check")]
    RawContent {
        /// The page URL
        url: String,
    },

    /// Wiki API answered with an error envelope
    #[error("wiki API error '{code}': {info}\n  Suggestion: Check that the API base URL points at a MediaWiki api.php root")]
    Api {
        /// MediaWiki error code
        code: String,
        /// MediaWiki error description
        info: String,
    },

    /// Network failure, non-success status or undecodable body
    #[error("request to '{url}' failed: {reason}\n  Suggestion: Check your network connection and try again")]
    Transport {
        /// Request URL
        url: String,
        /// What went wrong
        reason: String,
    },

    /// Cache store read or write failed
    #[error("cache error for key '{key}': {reason}\n  Suggestion: Check that the cache directory is writable, or run with --no-cache")]
    Cache {
        /// Cache key involved
        key: String,
        /// What went wrong
        reason: String,
    },
}

impl ScrapingError {
    /// Creates an `InvalidUrl` error.
    #[must_use]
    pub fn invalid_url(url: &str, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Transport` error.
    #[must_use]
    pub fn transport(url: &str, reason: impl ToString) -> Self {
        Self::Transport {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Cache` error.
    #[must_use]
    pub fn cache(key: &str, reason: impl ToString) -> Self {
        Self::Cache {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Short, stable reason label for this failure.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid url",
            Self::OriginMismatch { .. } => "origin mismatch",
            Self::PageNotFound { .. } => "page not found",
            Self::AmbiguousMatch { .. } => "ambiguous match",
            Self::NoContent { .. } => "no content",
            Self::RenderedContent { .. } => "could not parse rendered content",
            Self::RawContent { .. } => "could not parse raw content",
            Self::Api { .. } => "api error",
            Self::Transport { .. } => "transport failure",
            Self::Cache { .. } => "cache failure",
        }
    }
}
