//! Reference discovery through a web search provider.
//!
//! For each article title we ask a SerpApi-compatible provider for a handful
//! of organic results, drop links on non-article platforms (video, social),
//! and keep the first [`REFERENCE_COUNT`] survivors in ranked order.
//!
//! Discovery is best-effort: provider and network failures are logged and
//! degrade to an empty list. Callers decide what "too few links" means.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use articleflow_shared::{ArticleflowError, Result, SearchConfig};

/// Number of references each article is enriched with.
pub const REFERENCE_COUNT: usize = 2;

/// User-Agent string for discovery requests.
const USER_AGENT: &str = concat!("articleflow/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Search seam
// ---------------------------------------------------------------------------

/// Finds candidate reference URLs for a title. Never fails.
#[async_trait]
pub trait ReferenceSearch: Send + Sync {
    /// Up to [`REFERENCE_COUNT`] usable links, best first. Empty on any failure.
    async fn find_references(&self, title: &str) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// Discovery options
// ---------------------------------------------------------------------------

/// Configuration for the search provider client.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Provider endpoint (e.g. `https://serpapi.com/search.json`).
    pub endpoint: String,
    /// `engine` query parameter.
    pub engine: String,
    /// Raw results requested per query.
    pub result_count: u32,
    /// Domains whose links are never used (subdomains included).
    pub denylist: Vec<String>,
    /// Timeout for the provider request in seconds.
    pub timeout_secs: u64,
}

impl From<&SearchConfig> for DiscoveryOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            engine: config.engine.clone(),
            result_count: config.result_count,
            denylist: config.denylist.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Provider wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    link: Option<String>,
}

// ---------------------------------------------------------------------------
// SerpDiscovery
// ---------------------------------------------------------------------------

/// SerpApi-backed [`ReferenceSearch`].
pub struct SerpDiscovery {
    client: Client,
    api_key: String,
    options: DiscoveryOptions,
}

impl SerpDiscovery {
    /// Create a client for the given provider key.
    pub fn new(api_key: impl Into<String>, options: DiscoveryOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| {
                ArticleflowError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            options,
        })
    }

    /// Raw organic result links for `query`, in provider order.
    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let result_count = self.options.result_count.to_string();
        let response = self
            .client
            .get(&self.options.endpoint)
            .query(&[
                ("engine", self.options.engine.as_str()),
                ("q", query),
                ("num", result_count.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                // The request URL carries the api key; keep it out of error text.
                ArticleflowError::Network(format!("search provider: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArticleflowError::Network(format!(
                "search provider: HTTP {status}"
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| {
                ArticleflowError::parse(format!("search provider response: {}", e.without_url()))
            })?;

        if let Some(error) = body.error {
            return Err(ArticleflowError::Network(format!("search provider: {error}")));
        }

        Ok(body
            .organic_results
            .into_iter()
            .filter_map(|r| r.link)
            .collect())
    }
}

#[async_trait]
impl ReferenceSearch for SerpDiscovery {
    #[instrument(skip(self), fields(engine = %self.options.engine))]
    async fn find_references(&self, title: &str) -> Vec<String> {
        if title.trim().is_empty() {
            warn!("empty title, nothing to search for");
            return Vec::new();
        }

        let raw = match self.search(title).await {
            Ok(links) => links,
            Err(e) => {
                warn!(error = %e, "search failed, treating as no results");
                return Vec::new();
            }
        };

        let selected = select_references(&raw, &self.options.denylist);
        info!(raw = raw.len(), selected = selected.len(), "references discovered");
        selected
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Keep the first [`REFERENCE_COUNT`] links whose host is not denylisted.
pub fn select_references(links: &[String], denylist: &[String]) -> Vec<String> {
    links
        .iter()
        .filter(|link| {
            let denied = is_denied(link, denylist);
            if denied {
                debug!(%link, "skipping non-article link");
            }
            !denied
        })
        .take(REFERENCE_COUNT)
        .cloned()
        .collect()
}

/// A link is denied when it is not http(s), has no host, or its host is a
/// denylisted domain or one of its subdomains.
fn is_denied(link: &str, denylist: &[String]) -> bool {
    let Ok(url) = Url::parse(link) else {
        return true;
    };
    if url.scheme() != "http" && url.scheme() != "https" {
        return true;
    }
    let Some(host) = url.host_str() else {
        return true;
    };
    let host = host.to_ascii_lowercase();

    denylist.iter().any(|domain| {
        let domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();
        !domain.is_empty()
            && (host == domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.')))
    })
}
