//! Reference page fetching and excerpt extraction.
//!
//! This crate provides:
//! - [`ReferenceScraper`]: fetches a reference URL with a bounded timeout and
//!   SSRF protection
//! - [`extract`]: turns an HTML page into a bounded plain-text excerpt
//!
//! Scraping is best-effort: every failure yields an empty excerpt.

pub mod extract;
pub mod fetch;

use async_trait::async_trait;

pub use extract::{extract_excerpt, truncate_chars};
pub use fetch::{ReferenceScraper, ScrapeOptions};

/// Produces a plain-text excerpt for a reference URL. Never fails.
#[async_trait]
pub trait ReferenceFetch: Send + Sync {
    /// Bounded excerpt of the page at `url`, or an empty string.
    async fn scrape(&self, url: &str) -> String;
}
