//! Turso Embedded / libSQL article store (offline mode).
//!
//! **Access rules:**
//! - `articleflow run` / `import`: read-write via [`LibsqlStore::open`]
//! - `articleflow status`: read-only via [`LibsqlStore::open_readonly`]

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database, params};

use articleflow_shared::{Article, ArticleId, ArticleUpdate, ArticleflowError, Result, Stage};

use crate::ArticleStore;
use crate::migrations;

const ARTICLE_COLUMNS: &str = "id, title, original_content, original_url, citation_links, \
     ref1_content, ref2_content, updated_content, is_updated, processing_stage";

/// Article store wrapping a local libSQL database.
pub struct LibsqlStore {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl LibsqlStore {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ArticleflowError::io(parent, e))?;
            }
        }

        let db = libsql::Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let store = Self {
            db,
            conn,
            readonly: false,
        };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Open an existing database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        let db = libsql::Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        ArticleflowError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(ArticleflowError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    /// Insert a new `pending` article. Returns the assigned id.
    pub async fn insert_article(
        &self,
        title: &str,
        original_content: &str,
        original_url: Option<&str>,
    ) -> Result<ArticleId> {
        self.check_writable()?;
        if title.trim().is_empty() {
            return Err(ArticleflowError::validation("article title must not be empty"));
        }
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO articles (title, original_content, original_url, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![title, original_content, original_url, now.as_str(), now.as_str()],
            )
            .await?;
        Ok(ArticleId(self.conn.last_insert_rowid()))
    }

    /// Get an article by id.
    pub async fn get_article(&self, id: ArticleId) -> Result<Option<Article>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1"),
                params![id.0],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_article(&row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ArticleStore for LibsqlStore {
    async fn list(&self) -> Result<Vec<Article>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY id"),
                params![],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(row_to_article(&row)?);
        }
        Ok(results)
    }

    /// Single `UPDATE` statement: absent fields keep their stored value.
    /// `updated_content` is only written when the update carries it, so an
    /// explicit clear stores NULL.
    async fn update(&self, id: ArticleId, update: &ArticleUpdate) -> Result<Article> {
        self.check_writable()?;

        let links_json = update
            .citation_links
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ArticleflowError::Storage(format!("encode citation_links: {e}")))?;
        let now = Utc::now().to_rfc3339();

        let affected = self
            .conn
            .execute(
                "UPDATE articles SET
                   citation_links   = COALESCE(?1, citation_links),
                   ref1_content     = COALESCE(?2, ref1_content),
                   ref2_content     = COALESCE(?3, ref2_content),
                   updated_content  = CASE WHEN ?9 = 1 THEN ?4 ELSE updated_content END,
                   is_updated       = COALESCE(?5, is_updated),
                   processing_stage = COALESCE(?6, processing_stage),
                   updated_at       = ?7
                 WHERE id = ?8",
                params![
                    links_json.as_deref(),
                    update.first_excerpt.as_deref(),
                    update.second_excerpt.as_deref(),
                    update.updated_content.as_ref().and_then(|c| c.as_deref()),
                    update.is_updated.map(i64::from),
                    update.stage.map(|s| s.as_str()),
                    now.as_str(),
                    id.0,
                    i64::from(update.updated_content.is_some()),
                ],
            )
            .await?;

        if affected == 0 {
            return Err(ArticleflowError::Storage(format!("article {id} not found")));
        }

        self.get_article(id)
            .await?
            .ok_or_else(|| ArticleflowError::Storage(format!("article {id} vanished after update")))
    }
}

/// Convert a database row (in [`ARTICLE_COLUMNS`] order) to an [`Article`].
fn row_to_article(row: &libsql::Row) -> Result<Article> {
    let links_json: String = row.get(4)?;
    let citation_links: Vec<String> = serde_json::from_str(&links_json)
        .map_err(|e| ArticleflowError::Storage(format!("invalid citation_links: {e}")))?;
    let stage: String = row.get(9)?;

    Ok(Article {
        id: ArticleId(row.get::<i64>(0)?),
        title: row.get::<String>(1)?,
        original_content: row.get::<String>(2)?,
        original_url: row.get::<String>(3).ok(),
        citation_links,
        first_excerpt: row.get::<String>(5).ok(),
        second_excerpt: row.get::<String>(6).ok(),
        updated_content: row.get::<String>(7).ok(),
        is_updated: row.get::<i64>(8).unwrap_or(0) != 0,
        stage: stage.parse::<Stage>()?,
    })
}
