//! Page resolution: turns a game namespace and page title into the wiki's
//! stable page identifier.

use std::fmt;

use tracing::debug;

use crate::api::{self, QueryResponse};
use crate::error::ScrapingError;
use crate::target::TargetRef;
use crate::transport::Transport;

/// Identifier the wiki uses for titles it recognizes but has no page for.
pub const MISSING_PAGE_ID: &str = "-1";

/// Stable page identifier returned by the lookup request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageId(String);

impl PageId {
    /// Wraps a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Looks up the page identifier for `target`.
///
/// # Errors
///
/// - [`ScrapingError::PageNotFound`] when the page collection is empty
/// - [`ScrapingError::AmbiguousMatch`] when it has more than one entry
/// - [`ScrapingError::NoContent`] when the single entry is the missing-page sentinel
/// - transport and decoding failures from the lookup request
#[tracing::instrument(skip_all, fields(game = %target.game_namespace, title = %target.page_title))]
pub async fn resolve_page_id(
    transport: &dyn Transport,
    api_base_url: &str,
    target: &TargetRef,
) -> Result<PageId, ScrapingError> {
    let url = api::lookup_url(api_base_url, &target.game_namespace, &target.page_title)?;
    debug!(api_url = %url, "looking up page id");

    let body = transport.get(&url).await?;
    let response: QueryResponse = api::decode(&url, &body)?;
    let ids: Vec<String> = response
        .query
        .map(|query| query.pages.into_keys().collect())
        .unwrap_or_default();

    select_page_id(ids, target)
}

/// Applies the existence and uniqueness rules to the returned ids.
fn select_page_id(mut ids: Vec<String>, target: &TargetRef) -> Result<PageId, ScrapingError> {
    match ids.len() {
        0 => Err(ScrapingError::PageNotFound {
            title: target.page_title.clone(),
        }),
        1 => {
            let id = ids.remove(0);
            if id == MISSING_PAGE_ID {
                return Err(ScrapingError::NoContent {
                    url: target.url.clone(),
                });
            }
            debug!(page_id = %id, "resolved page id");
            Ok(PageId(id))
        }
        count => Err(ScrapingError::AmbiguousMatch {
            title: target.page_title.clone(),
            count,
        }),
    }
}
