//! Interpretation and validation of wiki page URLs.
//!
//! A page URL has the shape `<origin>/<game>/<Page_Title...>`. The first path
//! segment names the game wiki, the rest is the page title.

use std::borrow::Cow;

use tracing::debug;
use url::Url;

use crate::error::ScrapingError;

/// Immutable value derived from an input URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRef {
    /// The full input URL, kept for error messages.
    pub url: String,
    /// Serialized origin of the URL (`scheme://host[:port]`).
    pub origin: String,
    /// First path segment, e.g. `dota2`.
    pub game_namespace: String,
    /// Path remainder after `/<game_namespace>/`, percent-decoded.
    pub page_title: String,
}

impl TargetRef {
    /// Parses `input`, checks it against `expected_origin` and splits its path.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapingError::InvalidUrl`] if `input` is not an absolute URL
    /// and [`ScrapingError::OriginMismatch`] if its origin differs from
    /// `expected_origin`.
    pub fn parse(input: &str, expected_origin: &str) -> Result<Self, ScrapingError> {
        let url = Url::parse(input.trim()).map_err(|e| ScrapingError::invalid_url(input, e))?;
        validate_origin(&url, expected_origin)?;

        let (game_namespace, page_title) = interpret(&url);
        debug!(%game_namespace, %page_title, "interpreted page URL");

        Ok(Self {
            url: url.to_string(),
            origin: url.origin().ascii_serialization(),
            game_namespace,
            page_title,
        })
    }
}

/// Fails unless the URL's origin equals `expected` exactly.
///
/// # Errors
///
/// Returns [`ScrapingError::OriginMismatch`] on any difference.
pub fn validate_origin(url: &Url, expected: &str) -> Result<(), ScrapingError> {
    let actual = url.origin().ascii_serialization();
    if actual == expected {
        Ok(())
    } else {
        Err(ScrapingError::OriginMismatch {
            url: url.to_string(),
            expected: expected.to_string(),
            actual,
        })
    }
}

/// Splits a URL path into `(game_namespace, page_title)`.
///
/// Never fails: a malformed path yields empty strings, which later surface
/// as lookup failures.
#[must_use]
pub fn interpret(url: &Url) -> (String, String) {
    let path = url.path();
    let game_namespace = path.split('/').nth(1).unwrap_or_default().to_string();

    let prefix = format!("/{game_namespace}/");
    let raw_title = path.strip_prefix(prefix.as_str()).unwrap_or_default();
    let page_title = urlencoding::decode(raw_title)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw_title.to_string());

    (game_namespace, page_title)
}
