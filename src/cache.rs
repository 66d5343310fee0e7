//! Local cache of fetched page content, keyed by page id.
//!
//! The cache is a small key-value capability ([`CacheStore`]) so the pipeline
//! can run against the filesystem ([`FsCacheStore`]), memory
//! ([`MemoryCacheStore`]) or any other backend. Entries are written once after
//! a successful fetch and never updated or evicted here.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::ScrapingError;
use crate::resolver::PageId;

/// Suffix of the rendered-markup entry key.
const RENDERED_SUFFIX: &str = "html";
/// Suffix of the raw-wikitext entry key.
const RAW_SUFFIX: &str = "wikitext";
/// File extension used by [`FsCacheStore`].
const FILE_EXTENSION: &str = "text";

/// Key-value store holding cached page artifacts.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns true when an entry exists for `key`.
    async fn exists(&self, key: &str) -> Result<bool, ScrapingError>;

    /// Reads the entry for `key`, `None` when absent.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ScrapingError>;

    /// Writes (or overwrites) the entry for `key`.
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), ScrapingError>;
}

/// The two cache keys for a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    /// `<pageId>-html`
    pub rendered: String,
    /// `<pageId>-wikitext`
    pub raw: String,
}

impl CacheKeys {
    /// Builds the keys for `page_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapingError::Cache`] if the id could escape the store
    /// (path separators or `..`).
    pub fn for_page(page_id: &PageId) -> Result<Self, ScrapingError> {
        let id = page_id.as_str();
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return Err(ScrapingError::cache(id, "page id is not usable as a cache key"));
        }
        Ok(Self {
            rendered: format!("{id}-{RENDERED_SUFFIX}"),
            raw: format!("{id}-{RAW_SUFFIX}"),
        })
    }
}

/// Cached artifacts for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    /// Rendered markup.
    pub rendered: String,
    /// Raw wikitext.
    pub raw: String,
}

/// Returns both artifacts when both entries exist, `None` otherwise.
///
/// # Errors
///
/// Propagates store failures and rejects non-UTF-8 entries.
pub async fn load(store: &dyn CacheStore, keys: &CacheKeys) -> Result<Option<CachedPage>, ScrapingError> {
    if !(store.exists(&keys.rendered).await? && store.exists(&keys.raw).await?) {
        debug!(key = %keys.rendered, "cache miss");
        return Ok(None);
    }

    let Some(rendered) = read_string(store, &keys.rendered).await? else {
        return Ok(None);
    };
    let Some(raw) = read_string(store, &keys.raw).await? else {
        return Ok(None);
    };
    debug!(key = %keys.rendered, "cache hit");
    Ok(Some(CachedPage { rendered, raw }))
}

/// Persists both artifacts. Any write failure is returned to the caller.
///
/// # Errors
///
/// Propagates store write failures.
pub async fn save(store: &dyn CacheStore, keys: &CacheKeys, page: &CachedPage) -> Result<(), ScrapingError> {
    store.write(&keys.rendered, page.rendered.as_bytes()).await?;
    store.write(&keys.raw, page.raw.as_bytes()).await?;
    debug!(key = %keys.rendered, "cached page content");
    Ok(())
}

async fn read_string(store: &dyn CacheStore, key: &str) -> Result<Option<String>, ScrapingError> {
    match store.read(key).await? {
        Some(bytes) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| ScrapingError::cache(key, format!("cached entry is not UTF-8: {e}"))),
        None => Ok(None),
    }
}

// ==================== Filesystem store ====================

/// Stores each entry as `<dir>/<key>.text`.
#[derive(Debug, Clone)]
pub struct FsCacheStore {
    dir: PathBuf,
}

impl FsCacheStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{FILE_EXTENSION}"))
    }
}

#[async_trait]
impl CacheStore for FsCacheStore {
    async fn exists(&self, key: &str) -> Result<bool, ScrapingError> {
        tokio::fs::try_exists(self.entry_path(key))
            .await
            .map_err(|e| ScrapingError::cache(key, e))
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ScrapingError> {
        let path = self.entry_path(key);
        trace!(path = %path.display(), "reading cache entry");
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ScrapingError::cache(key, e)),
        }
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), ScrapingError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ScrapingError::cache(key, format!("cannot create '{}': {e}", self.dir.display())))?;
        let path = self.entry_path(key);
        trace!(path = %path.display(), bytes = bytes.len(), "writing cache entry");
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ScrapingError::cache(key, e))
    }
}

// ==================== In-memory store ====================

/// Process-local store, mostly useful in tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCacheStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned(key: &str) -> ScrapingError {
        ScrapingError::cache(key, "memory cache lock poisoned")
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn exists(&self, key: &str) -> Result<bool, ScrapingError> {
        let entries = self.entries.lock().map_err(|_| Self::poisoned(key))?;
        Ok(entries.contains_key(key))
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ScrapingError> {
        let entries = self.entries.lock().map_err(|_| Self::poisoned(key))?;
        Ok(entries.get(key).cloned())
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), ScrapingError> {
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned(key))?;
        entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
