//! HTTP fetching for reference pages.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::redirect::Policy;
use tracing::{debug, info, instrument, warn};
use url::Url;

use articleflow_shared::{ArticleflowError, PipelineConfig, Result};

use crate::ReferenceFetch;
use crate::extract::extract_excerpt;

/// User-Agent string for reference requests.
const USER_AGENT: &str = concat!("articleflow/", env!("CARGO_PKG_VERSION"));

/// Maximum response size we are willing to parse (10 MB).
const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: usize = 5;

// ---------------------------------------------------------------------------
// ScrapeOptions
// ---------------------------------------------------------------------------

/// Limits applied to every reference fetch.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Excerpt cap in characters.
    pub max_chars: usize,
    /// Fragments of this many characters or fewer are dropped.
    pub min_fragment_chars: usize,
    /// Skip the SSRF check on the requested URL (mock servers on localhost).
    /// Redirect targets are always checked.
    pub allow_private_hosts: bool,
}

impl From<&PipelineConfig> for ScrapeOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            timeout_secs: config.scrape_timeout_secs,
            max_chars: config.excerpt_max_chars,
            min_fragment_chars: config.min_fragment_chars,
            allow_private_hosts: false,
        }
    }
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

// ---------------------------------------------------------------------------
// ReferenceScraper
// ---------------------------------------------------------------------------

/// Fetches reference pages and reduces them to excerpts.
pub struct ReferenceScraper {
    client: Client,
    options: ScrapeOptions,
}

impl ReferenceScraper {
    /// Create a new scraper with the given limits.
    pub fn new(options: ScrapeOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(redirect_policy())
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| {
                ArticleflowError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, options })
    }

    /// Fetch the raw HTML of `url`.
    async fn fetch_html(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url)
            .map_err(|e| ArticleflowError::validation(format!("{url}: invalid URL: {e}")))?;

        if !self.options.allow_private_hosts && is_ssrf_target(&parsed) {
            return Err(ArticleflowError::validation(format!(
                "{url}: blocked by SSRF protection"
            )));
        }

        debug!(%url, "fetching reference");
        let response = self
            .client
            .get(parsed.as_str())
            .send()
            .await
            .map_err(|e| ArticleflowError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArticleflowError::Network(format!("{url}: HTTP {status}")));
        }

        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_SIZE {
                return Err(ArticleflowError::validation(format!(
                    "{url}: response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
                )));
            }
        }

        response
            .text()
            .await
            .map_err(|e| ArticleflowError::Network(format!("{url}: body read failed: {e}")))
    }
}

#[async_trait]
impl ReferenceFetch for ReferenceScraper {
    #[instrument(skip(self))]
    async fn scrape(&self, url: &str) -> String {
        match self.fetch_html(url).await {
            Ok(html) => {
                let excerpt = extract_excerpt(
                    &html,
                    self.options.min_fragment_chars,
                    self.options.max_chars,
                );
                info!(chars = excerpt.chars().count(), "reference scraped");
                excerpt
            }
            Err(e) => {
                warn!(error = %e, "reference scrape failed, using empty excerpt");
                String::new()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SSRF protection
// ---------------------------------------------------------------------------

/// Follow at most [`MAX_REDIRECTS`] hops, refusing any hop to a private host.
fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if is_ssrf_target(attempt.url()) {
            warn!(target_url = %attempt.url(), "redirect blocked by SSRF protection");
            attempt.error("redirect blocked by SSRF protection")
        } else {
            attempt.follow()
        }
    })
}

/// Check if a URL targets a potentially dangerous resource.
fn is_ssrf_target(url: &Url) -> bool {
    // Block non-HTTP schemes
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    match url.host() {
        Some(url::Host::Ipv4(v4)) => is_private_ip(&IpAddr::V4(v4)),
        Some(url::Host::Ipv6(v6)) => is_private_ip(&IpAddr::V6(v6)),
        Some(url::Host::Domain(host)) => {
            host == "localhost" || host.ends_with(".local") || host.ends_with(".internal")
        }
        None => true,
    }
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10 (Carrier-grade NAT)
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64)
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}
