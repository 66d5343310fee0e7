//! URL-to-content pipeline.
//!
//! One resolution runs strictly in order:
//!
//! 1. interpret and validate the URL ([`TargetRef`])
//! 2. resolve the page id ([`resolve_page_id`])
//! 3. check the cache for both artifacts
//! 4. on a miss, fetch rendered and raw content concurrently, then persist both
//!
//! Any failure aborts the resolution; no partial bundle is returned and
//! nothing is retried.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::cache::{self, CacheKeys, CacheStore, CachedPage};
use crate::config::ServiceConfig;
use crate::content::{fetch_raw, fetch_rendered};
use crate::error::ScrapingError;
use crate::resolver::{PageId, resolve_page_id};
use crate::target::TargetRef;
use crate::transport::{HttpTransport, Transport};

/// Final output of a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBundle {
    /// Server-rendered HTML of the page.
    pub rendered_markup: String,
    /// Wiki-syntax source of the page.
    pub raw_markup: String,
    /// Game wiki the page belongs to.
    pub game_namespace: String,
    /// Resolved page identifier.
    pub page_id: String,
}

/// Where the bundle's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// Both artifacts were read from the cache.
    Cache,
    /// Both artifacts were fetched from the wiki API.
    Network,
}

/// Per-resolution state threaded through the stages.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    /// Interpreted input URL.
    pub target: TargetRef,
    /// Identifier resolved by the lookup stage.
    pub page_id: PageId,
}

/// Resolves wiki page URLs into [`ContentBundle`]s.
///
/// # Example
///
/// ```no_run
/// use liquipedia_core::{Scraper, ServiceConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let scraper = Scraper::new(ServiceConfig::default())?;
/// let bundle = scraper.scrape("https://liquipedia.net/dota2/Team_Liquid").await?;
/// println!("{} bytes of wikitext", bundle.raw_markup.len());
/// # Ok(())
/// # }
/// ```
pub struct Scraper {
    config: ServiceConfig,
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn CacheStore>>,
}

impl Scraper {
    /// Creates a scraper using the reqwest transport and no cache.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapingError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: ServiceConfig) -> Result<Self, ScrapingError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a scraper with a caller-supplied transport.
    #[must_use]
    pub fn with_transport(config: ServiceConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            cache: None,
        }
    }

    /// Enables the cache gate backed by `store`.
    #[must_use]
    pub fn with_cache(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(store);
        self
    }

    /// Configuration this scraper was built with.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Resolves `url` into its rendered and raw content.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScrapingError`] raised by any stage.
    pub async fn scrape(&self, url: &str) -> Result<ContentBundle, ScrapingError> {
        self.scrape_with_source(url).await.map(|(bundle, _)| bundle)
    }

    /// Like [`Scraper::scrape`], also reporting whether the cache served it.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScrapingError`] raised by any stage.
    #[tracing::instrument(skip(self), fields(origin = %self.config.origin))]
    pub async fn scrape_with_source(&self, url: &str) -> Result<(ContentBundle, ContentSource), ScrapingError> {
        let ctx = self.resolve(url).await?;

        let (page, source) = match &self.cache {
            Some(store) => self.cached_content(store.as_ref(), &ctx).await?,
            None => (self.fetch_content(&ctx).await?, ContentSource::Network),
        };

        info!(
            game = %ctx.target.game_namespace,
            page_id = %ctx.page_id,
            ?source,
            rendered_bytes = page.rendered.len(),
            raw_bytes = page.raw.len(),
            "Resolved page content"
        );

        Ok((
            ContentBundle {
                rendered_markup: page.rendered,
                raw_markup: page.raw,
                game_namespace: ctx.target.game_namespace,
                page_id: ctx.page_id.to_string(),
            },
            source,
        ))
    }

    /// Validates the URL and resolves its page id.
    ///
    /// # Errors
    ///
    /// Returns validation and lookup failures.
    pub async fn resolve(&self, url: &str) -> Result<ResolutionContext, ScrapingError> {
        let target = TargetRef::parse(url, &self.config.expected_origin())?;
        let page_id = resolve_page_id(self.transport.as_ref(), &self.config.api_base_url, &target).await?;
        Ok(ResolutionContext { target, page_id })
    }

    async fn cached_content(
        &self,
        store: &dyn CacheStore,
        ctx: &ResolutionContext,
    ) -> Result<(CachedPage, ContentSource), ScrapingError> {
        let keys = CacheKeys::for_page(&ctx.page_id)?;
        if let Some(page) = cache::load(store, &keys).await? {
            return Ok((page, ContentSource::Cache));
        }

        let page = self.fetch_content(ctx).await?;
        cache::save(store, &keys, &page).await?;
        Ok((page, ContentSource::Network))
    }

    async fn fetch_content(&self, ctx: &ResolutionContext) -> Result<CachedPage, ScrapingError> {
        let transport = self.transport.as_ref();
        let base = self.config.api_base_url.as_str();
        debug!(page_id = %ctx.page_id, "fetching page content");

        let (rendered, raw) = tokio::try_join!(
            fetch_rendered(transport, base, &ctx.target, &ctx.page_id),
            fetch_raw(transport, base, &ctx.target, &ctx.page_id),
        )?;
        Ok(CachedPage { rendered, raw })
    }
}

impl std::fmt::Debug for Scraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scraper")
            .field("config", &self.config)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use url::Url;

    use super::*;
    use crate::cache::MemoryCacheStore;

    /// Stub transport answering by `action`/`prop` and recording every call.
    #[derive(Default)]
    struct StubTransport {
        responses: HashMap<&'static str, serde_json::Value>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl StubTransport {
        fn liquipedia() -> Self {
            let mut responses = HashMap::new();
            responses.insert(
                "lookup",
                serde_json::json!({"query": {"pages": {"500": {"pageid": 500, "ns": 0, "title": "Team Liquid"}}}}),
            );
            responses.insert(
                "rendered",
                serde_json::json!({"parse": {"pageid": 500, "text": {"*": "<html>stub</html>"}}}),
            );
            responses.insert(
                "raw",
                serde_json::json!({"query": {"pages": {"500": {"revisions": [{"slots": {"main": {"*": "{{Infobox}}"}}}]}}}}),
            );
            Self {
                responses,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self, kind: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| **c == kind).count()
        }

        fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn get(&self, url: &Url) -> Result<String, ScrapingError> {
            let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
            let kind = match (query.get("action").map(String::as_str), query.get("prop")) {
                (Some("parse"), _) => "rendered",
                (Some("query"), Some(_)) => "raw",
                _ => "lookup",
            };
            self.calls.lock().unwrap().push(kind);
            self.responses
                .get(kind)
                .map(ToString::to_string)
                .ok_or_else(|| ScrapingError::transport(url.as_str(), "HTTP 500"))
        }
    }

    const PAGE_URL: &str = "https://liquipedia.net/dota2/Team_Liquid";

    #[tokio::test]
    async fn test_scrape_returns_bundle() {
        let transport = Arc::new(StubTransport::liquipedia());
        let scraper = Scraper::with_transport(ServiceConfig::default(), transport.clone());

        let bundle = scraper.scrape(PAGE_URL).await.unwrap();

        assert_eq!(
            bundle,
            ContentBundle {
                rendered_markup: "<html>stub</html>".to_string(),
                raw_markup: "{{Infobox}}".to_string(),
                game_namespace: "dota2".to_string(),
                page_id: "500".to_string(),
            }
        );
        assert_eq!(transport.calls("lookup"), 1);
        assert_eq!(transport.calls("rendered"), 1);
        assert_eq!(transport.calls("raw"), 1);
    }

    #[tokio::test]
    async fn test_origin_mismatch_issues_no_requests() {
        let transport = Arc::new(StubTransport::liquipedia());
        let scraper = Scraper::with_transport(ServiceConfig::default(), transport.clone());

        let err = scraper.scrape("https://fandom.com/dota2/Team_Liquid").await.unwrap_err();

        assert_eq!(err.reason(), "origin mismatch");
        assert_eq!(transport.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_skips_content_fetch() {
        let mut transport = StubTransport::liquipedia();
        transport
            .responses
            .insert("lookup", serde_json::json!({"query": {"pages": {"-1": {"missing": ""}}}}));
        let transport = Arc::new(transport);
        let scraper = Scraper::with_transport(ServiceConfig::default(), transport.clone());

        let err = scraper.scrape(PAGE_URL).await.unwrap_err();

        assert!(matches!(err, ScrapingError::NoContent { .. }));
        assert_eq!(transport.calls("rendered") + transport.calls("raw"), 0);
    }

    #[tokio::test]
    async fn test_cache_miss_then_hit() {
        let transport = Arc::new(StubTransport::liquipedia());
        let store = Arc::new(MemoryCacheStore::new());
        let scraper =
            Scraper::with_transport(ServiceConfig::default(), transport.clone()).with_cache(store.clone());

        let (first, source) = scraper.scrape_with_source(PAGE_URL).await.unwrap();
        assert_eq!(source, ContentSource::Network);
        assert_eq!(store.len(), 2);

        let (second, source) = scraper.scrape_with_source(PAGE_URL).await.unwrap();
        assert_eq!(source, ContentSource::Cache);
        assert_eq!(first, second);
        assert_eq!(transport.calls("lookup"), 2);
        assert_eq!(transport.calls("rendered"), 1);
        assert_eq!(transport.calls("raw"), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_returns_cached_bytes_verbatim() {
        let transport = Arc::new(StubTransport::liquipedia());
        let store = Arc::new(MemoryCacheStore::new());
        store.write("500-html", b"R").await.unwrap();
        store.write("500-wikitext", b"W").await.unwrap();
        let scraper =
            Scraper::with_transport(ServiceConfig::default(), transport.clone()).with_cache(store);

        let bundle = scraper.scrape(PAGE_URL).await.unwrap();

        assert_eq!(bundle.rendered_markup, "R");
        assert_eq!(bundle.raw_markup, "W");
        assert_eq!(transport.calls("rendered") + transport.calls("raw"), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_writes_nothing() {
        let mut transport = StubTransport::liquipedia();
        transport
            .responses
            .insert("raw", serde_json::json!({"query": {"pages": {"500": {}}}}));
        let store = Arc::new(MemoryCacheStore::new());
        let scraper =
            Scraper::with_transport(ServiceConfig::default(), Arc::new(transport)).with_cache(store.clone());

        let err = scraper.scrape(PAGE_URL).await.unwrap_err();

        assert_eq!(err.reason(), "could not parse raw content");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_origin_case_is_normalized_on_both_sides() {
        let config = ServiceConfig::with_origin("https://Liquipedia.net");
        let scraper = Scraper::with_transport(config, Arc::new(StubTransport::liquipedia()));
        assert_eq!(scraper.config().origin, "https://Liquipedia.net");

        let bundle = scraper.scrape("https://LIQUIPEDIA.NET/dota2/Team_Liquid").await.unwrap();
        assert_eq!(bundle.game_namespace, "dota2");
        let bundle = scraper.scrape(PAGE_URL).await.unwrap();
        assert_eq!(bundle.page_id, "500");
    }

    #[tokio::test]
    async fn test_resolve_returns_context() {
        let scraper = Scraper::with_transport(ServiceConfig::default(), Arc::new(StubTransport::liquipedia()));
        let ctx = scraper.resolve(PAGE_URL).await.unwrap();
        assert_eq!(ctx.target.page_title, "Team_Liquid");
        assert_eq!(ctx.page_id, PageId::new("500"));
    }
}
