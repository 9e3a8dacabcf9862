//! SQL migration definitions for the local article database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: articles with processing stage",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Work items
CREATE TABLE IF NOT EXISTS articles (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    title            TEXT NOT NULL,
    original_content TEXT NOT NULL,
    original_url     TEXT,
    citation_links   TEXT NOT NULL DEFAULT '[]',
    ref1_content     TEXT,
    ref2_content     TEXT,
    updated_content  TEXT,
    is_updated       INTEGER NOT NULL DEFAULT 0,
    processing_stage TEXT NOT NULL DEFAULT 'pending'
        CHECK (processing_stage IN ('pending', 'searched', 'scraped', 'completed')),
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_stage ON articles(processing_stage);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
