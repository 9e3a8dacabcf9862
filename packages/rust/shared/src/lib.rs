//! Shared types, error model, and configuration for articleflow.
//!
//! This crate is the foundation depended on by all other articleflow crates.
//! It provides:
//! - [`ArticleflowError`]: the unified error type
//! - Domain types ([`Article`], [`ArticleId`], [`Stage`], [`ArticleUpdate`])
//! - Configuration ([`AppConfig`], [`Credentials`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, Credentials, PipelineConfig, RewriteConfig, SearchConfig, StoreConfig, StoreKind,
    config_dir, config_file_path, init_config, init_config_at, load_config, load_config_from,
    resolve_credentials,
};
pub use error::{ArticleflowError, Result};
pub use types::{Article, ArticleId, ArticleUpdate, Stage};
