//! REST article store.
//!
//! Talks to the articles resource exposed by the CRUD backend:
//! `GET {base}` returns every article, `PUT {base}/{id}` applies a partial
//! JSON body and responds with the updated record.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use articleflow_shared::{Article, ArticleId, ArticleUpdate, ArticleflowError, Result};

use crate::ArticleStore;

/// User-Agent string for store requests.
const USER_AGENT: &str = concat!("articleflow/", env!("CARGO_PKG_VERSION"));

/// Article store backed by the CRUD REST API.
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    /// Build a store for the resource at `base_url` (e.g. `http://host/api/articles`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ArticleflowError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn article_url(&self, id: ArticleId) -> String {
        format!("{}/{id}", self.base_url)
    }
}

#[async_trait]
impl ArticleStore for HttpStore {
    async fn list(&self) -> Result<Vec<Article>> {
        debug!(url = %self.base_url, "listing articles");
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| ArticleflowError::Network(format!("{}: {e}", self.base_url)))?;

        decode(response, &self.base_url).await
    }

    async fn update(&self, id: ArticleId, update: &ArticleUpdate) -> Result<Article> {
        let url = self.article_url(id);
        debug!(%url, stage = ?update.stage, "updating article");
        let response = self
            .client
            .put(&url)
            .json(update)
            .send()
            .await
            .map_err(|e| ArticleflowError::Network(format!("{url}: {e}")))?;

        decode(response, &url).await
    }
}

/// Check the status and decode a JSON body.
async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response, url: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        return Err(ArticleflowError::Storage(format!(
            "{url}: HTTP {status}: {snippet}"
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| ArticleflowError::Network(format!("{url}: failed to read body: {e}")))?;

    serde_json::from_str(&body)
        .map_err(|e| ArticleflowError::parse(format!("{url}: invalid article payload: {e}")))
}
