//! Article store backends.
//!
//! The pipeline only ever talks to an [`ArticleStore`]: list every article,
//! and apply a partial update to one article as a single durable write.
//!
//! Two backends ship with the crate:
//! - [`LibsqlStore`]: local libSQL database file (read-write or read-only)
//! - [`HttpStore`]: the articles REST resource (`GET` list, `PUT` by id)

mod http;
mod local;
mod migrations;

use async_trait::async_trait;

use articleflow_shared::{Article, ArticleId, ArticleUpdate, Result};

pub use http::HttpStore;
pub use local::LibsqlStore;

/// Durable article storage as seen by the pipeline.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// All articles, in the store's listing order.
    async fn list(&self) -> Result<Vec<Article>>;

    /// Apply `update` to article `id` in one write and return the stored record.
    ///
    /// The returned article reflects the update immediately.
    async fn update(&self, id: ArticleId, update: &ArticleUpdate) -> Result<Article>;
}
