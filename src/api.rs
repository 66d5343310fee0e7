//! MediaWiki API request construction and response envelopes.
//!
//! Three endpoints are used, all under `<base>/<game>/api.php`:
//! - title lookup (`action=query&titles=`)
//! - rendered page (`action=parse&pageid=`)
//! - raw revision content (`action=query&prop=revisions&rvslots=*`)

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;
use url::Url;

use crate::error::ScrapingError;

// ==================== Request URLs ====================

fn api_endpoint(base_url: &str, game_namespace: &str) -> Result<Url, ScrapingError> {
    let raw = format!("{}/{game_namespace}/api.php", base_url.trim_end_matches('/'));
    Url::parse(&raw).map_err(|e| ScrapingError::invalid_url(&raw, e))
}

/// `GET <base>/<game>/api.php?action=query&format=json&titles=<title>`
///
/// # Errors
///
/// Returns [`ScrapingError::InvalidUrl`] if `base_url` is not a valid URL.
pub fn lookup_url(base_url: &str, game_namespace: &str, page_title: &str) -> Result<Url, ScrapingError> {
    let mut url = api_endpoint(base_url, game_namespace)?;
    url.query_pairs_mut()
        .append_pair("action", "query")
        .append_pair("format", "json")
        .append_pair("titles", page_title);
    Ok(url)
}

/// `GET <base>/<game>/api.php?action=parse&format=json&pageid=<id>`
///
/// # Errors
///
/// Returns [`ScrapingError::InvalidUrl`] if `base_url` is not a valid URL.
pub fn render_url(base_url: &str, game_namespace: &str, page_id: &str) -> Result<Url, ScrapingError> {
    let mut url = api_endpoint(base_url, game_namespace)?;
    url.query_pairs_mut()
        .append_pair("action", "parse")
        .append_pair("format", "json")
        .append_pair("pageid", page_id);
    Ok(url)
}

/// `GET <base>/<game>/api.php?action=query&prop=revisions&rvslots=*&titles=<title>&format=json&rvprop=content`
///
/// # Errors
///
/// Returns [`ScrapingError::InvalidUrl`] if `base_url` is not a valid URL.
pub fn revisions_url(base_url: &str, game_namespace: &str, page_title: &str) -> Result<Url, ScrapingError> {
    let mut url = api_endpoint(base_url, game_namespace)?;
    url.query_pairs_mut()
        .append_pair("action", "query")
        .append_pair("prop", "revisions")
        .append_pair("rvslots", "*")
        .append_pair("titles", page_title)
        .append_pair("format", "json")
        .append_pair("rvprop", "content");
    Ok(url)
}

// ==================== Response Types ====================

/// MediaWiki error envelope: `{"error": {"code": ..., "info": ...}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}

/// Response of `action=query`.
#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse {
    pub query: Option<QueryBody>,
}

/// `query` object; `pages` maps page id to page entry.
#[derive(Debug, Deserialize)]
pub(crate) struct QueryBody {
    #[serde(default)]
    pub pages: BTreeMap<String, PageEntry>,
}

/// A single page stub. Revisions are only present for `prop=revisions`.
#[derive(Debug, Deserialize)]
pub(crate) struct PageEntry {
    #[serde(default)]
    pub revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Revision {
    pub slots: Option<Slots>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Slots {
    pub main: Option<StarContent>,
}

/// Legacy (formatversion=1) content wrapper keyed by `*`.
#[derive(Debug, Deserialize)]
pub(crate) struct StarContent {
    #[serde(rename = "*")]
    pub content: Option<String>,
}

/// Response of `action=parse`.
#[derive(Debug, Deserialize)]
pub(crate) struct ParseResponse {
    pub parse: Option<ParseBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ParseBody {
    pub text: Option<StarContent>,
}

/// Decodes a JSON body, surfacing MediaWiki error envelopes as
/// [`ScrapingError::Api`].
pub(crate) fn decode<T: DeserializeOwned>(url: &Url, body: &str) -> Result<T, ScrapingError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "response body is not JSON");
        ScrapingError::transport(url.as_str(), format!("invalid JSON response: {e}"))
    })?;

    if let Some(error) = value.get("error") {
        let error: ApiErrorBody = serde_json::from_value(error.clone())
            .map_err(|e| ScrapingError::transport(url.as_str(), format!("malformed error envelope: {e}")))?;
        return Err(ScrapingError::Api {
            code: error.code,
            info: error.info,
        });
    }

    serde_json::from_value(value)
        .map_err(|e| ScrapingError::transport(url.as_str(), format!("unexpected response format: {e}")))
}
