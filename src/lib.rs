//! Liquipedia Core Library
//!
//! Resolves a human-facing Liquipedia page URL into the data needed to
//! extract esports match and event information: the page id, its rendered
//! HTML and its raw wikitext.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`target`] - URL interpretation and origin validation
//! - [`resolver`] - Title to page id lookup
//! - [`content`] - Rendered and raw content fetchers
//! - [`cache`] - Key-value cache capability and stores
//! - [`scraper`] - The pipeline tying the stages together
//! - [`transport`] - HTTP capability and reqwest implementation
//! - [`api`] - MediaWiki request URLs and response envelopes

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod resolver;
pub mod scraper;
pub mod target;
pub mod transport;

// Re-export commonly used types
pub use cache::{CacheStore, FsCacheStore, MemoryCacheStore};
pub use config::{DEFAULT_ORIGIN, ServiceConfig};
pub use error::ScrapingError;
pub use resolver::PageId;
pub use scraper::{ContentBundle, ContentSource, ResolutionContext, Scraper};
pub use target::TargetRef;
pub use transport::{HttpTransport, Transport};
