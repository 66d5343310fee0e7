//! Content fetchers for a resolved page: rendered HTML and raw wikitext.
//!
//! Both are read-only and independent once the page id is known.

use tracing::debug;

use crate::api::{self, ParseResponse, QueryResponse};
use crate::error::ScrapingError;
use crate::resolver::PageId;
use crate::target::TargetRef;
use crate::transport::Transport;

/// Fetches the server-rendered markup for `page_id` (`parse.text["*"]`).
///
/// The string is returned unchanged.
///
/// # Errors
///
/// Returns [`ScrapingError::RenderedContent`] when the markup is absent or
/// empty, plus any transport or decoding failure.
#[tracing::instrument(skip_all, fields(game = %target.game_namespace, page_id = %page_id))]
pub async fn fetch_rendered(
    transport: &dyn Transport,
    api_base_url: &str,
    target: &TargetRef,
    page_id: &PageId,
) -> Result<String, ScrapingError> {
    let url = api::render_url(api_base_url, &target.game_namespace, page_id.as_str())?;
    debug!(api_url = %url, "fetching rendered markup");

    let body = transport.get(&url).await?;
    let response: ParseResponse = api::decode(&url, &body)?;
    response
        .parse
        .and_then(|parse| parse.text)
        .and_then(|text| text.content)
        .filter(|markup| !markup.is_empty())
        .ok_or_else(|| ScrapingError::RenderedContent {
            url: target.url.clone(),
        })
}

/// Fetches the raw wikitext of the page's latest revision
/// (`query.pages[<id>].revisions[0].slots.main["*"]`).
///
/// # Errors
///
/// Returns [`ScrapingError::RawContent`] when the text is absent or empty,
/// plus any transport or decoding failure.
#[tracing::instrument(skip_all, fields(game = %target.game_namespace, page_id = %page_id))]
pub async fn fetch_raw(
    transport: &dyn Transport,
    api_base_url: &str,
    target: &TargetRef,
    page_id: &PageId,
) -> Result<String, ScrapingError> {
    let url = api::revisions_url(api_base_url, &target.game_namespace, &target.page_title)?;
    debug!(api_url = %url, "fetching raw wikitext");

    let body = transport.get(&url).await?;
    let response: QueryResponse = api::decode(&url, &body)?;
    response
        .query
        .and_then(|mut query| query.pages.remove(page_id.as_str()))
        .and_then(|page| page.revisions.into_iter().next())
        .and_then(|revision| revision.slots)
        .and_then(|slots| slots.main)
        .and_then(|main| main.content)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ScrapingError::RawContent {
            url: target.url.clone(),
        })
}
