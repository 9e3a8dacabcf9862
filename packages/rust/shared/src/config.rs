//! Application configuration for articleflow.
//!
//! User config lives at `~/.articleflow/articleflow.toml`.
//! CLI flags override config file values, which override defaults.
//! Provider credentials are never stored in the file, only the names of the
//! environment variables that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArticleflowError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "articleflow.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".articleflow";

// ---------------------------------------------------------------------------
// Config structs (matching articleflow.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where articles are read from and written to.
    #[serde(default)]
    pub store: StoreConfig,

    /// Search provider used for reference discovery.
    #[serde(default)]
    pub search: SearchConfig,

    /// Text-generation provider used for rewriting.
    #[serde(default)]
    pub rewrite: RewriteConfig,

    /// Pipeline limits and behavior.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Article store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// REST backend (`GET {api_url}`, `PUT {api_url}/{id}`).
    #[default]
    Http,
    /// Local libSQL database file.
    Libsql,
}

/// `[store]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,

    /// Base URL of the articles REST resource.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Database path for the libSQL backend.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Request timeout for the REST backend.
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            api_url: default_api_url(),
            db_path: default_db_path(),
            timeout_secs: default_store_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "http://127.0.0.1:8000/api/articles".into()
}
fn default_db_path() -> String {
    "var/articleflow.db".into()
}
fn default_store_timeout() -> u64 {
    30
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Name of the env var holding the search API key.
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    /// SerpApi-compatible endpoint.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Search engine parameter sent to the provider.
    #[serde(default = "default_engine")]
    pub engine: String,

    /// Number of raw results requested per query.
    #[serde(default = "default_result_count")]
    pub result_count: u32,

    /// Domains never used as references (subdomains included).
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,

    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_key_env(),
            endpoint: default_search_endpoint(),
            engine: default_engine(),
            result_count: default_result_count(),
            denylist: default_denylist(),
            timeout_secs: default_search_timeout(),
        }
    }
}

fn default_search_key_env() -> String {
    "SERP_API_KEY".into()
}
fn default_search_endpoint() -> String {
    "https://serpapi.com/search.json".into()
}
fn default_engine() -> String {
    "google".into()
}
fn default_result_count() -> u32 {
    5
}
fn default_denylist() -> Vec<String> {
    [
        "youtube.com",
        "youtu.be",
        "reddit.com",
        "linkedin.com",
        "facebook.com",
        "twitter.com",
        "x.com",
        "instagram.com",
        "tiktok.com",
        "pinterest.com",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_search_timeout() -> u64 {
    20
}

/// `[rewrite]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Name of the env var holding the generation API key.
    #[serde(default = "default_rewrite_key_env")]
    pub api_key_env: String,

    /// OpenAI-compatible chat completions endpoint.
    #[serde(default = "default_rewrite_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Cap on generated tokens per request.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_rewrite_timeout")]
    pub timeout_secs: u64,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_rewrite_key_env(),
            endpoint: default_rewrite_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_rewrite_timeout(),
        }
    }
}

fn default_rewrite_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn default_rewrite_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".into()
}
fn default_model() -> String {
    "llama-3.1-8b-instant".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_output_tokens() -> u32 {
    1200
}
fn default_rewrite_timeout() -> u64 {
    120
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Re-run every stage, including for completed articles.
    #[serde(default)]
    pub force_reprocess: bool,

    /// Generation budget in estimated tokens per rolling minute.
    #[serde(default = "default_tokens_per_minute")]
    pub tokens_per_minute: u64,

    /// Extra wait added after the budget window ends.
    #[serde(default = "default_safety_margin_ms")]
    pub safety_margin_ms: u64,

    /// Fixed token overhead added to every rewrite estimate.
    #[serde(default = "default_prompt_overhead")]
    pub prompt_overhead_tokens: u64,

    /// Maximum characters kept per reference excerpt.
    #[serde(default = "default_excerpt_max_chars")]
    pub excerpt_max_chars: usize,

    /// Text fragments at or below this length are dropped as boilerplate.
    #[serde(default = "default_min_fragment_chars")]
    pub min_fragment_chars: usize,

    /// Timeout for fetching a reference page.
    #[serde(default = "default_scrape_timeout")]
    pub scrape_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            force_reprocess: false,
            tokens_per_minute: default_tokens_per_minute(),
            safety_margin_ms: default_safety_margin_ms(),
            prompt_overhead_tokens: default_prompt_overhead(),
            excerpt_max_chars: default_excerpt_max_chars(),
            min_fragment_chars: default_min_fragment_chars(),
            scrape_timeout_secs: default_scrape_timeout(),
        }
    }
}

fn default_tokens_per_minute() -> u64 {
    6000
}
fn default_safety_margin_ms() -> u64 {
    200
}
fn default_prompt_overhead() -> u64 {
    1200
}
fn default_excerpt_max_chars() -> usize {
    2500
}
fn default_min_fragment_chars() -> usize {
    40
}
fn default_scrape_timeout() -> u64 {
    40
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Provider API keys resolved from the environment at startup.
#[derive(Clone)]
pub struct Credentials {
    pub search_api_key: String,
    pub rewrite_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("search_api_key", &"<redacted>")
            .field("rewrite_api_key", &"<redacted>")
            .finish()
    }
}

/// Read both provider keys from the env vars named in `config`.
///
/// Missing or empty keys are fatal: nothing may be processed without them.
pub fn resolve_credentials(config: &AppConfig) -> Result<Credentials> {
    let search_api_key = read_key(&config.search.api_key_env)?;
    let rewrite_api_key = read_key(&config.rewrite.api_key_env)?;
    Ok(Credentials {
        search_api_key,
        rewrite_api_key,
    })
}

fn read_key(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(ArticleflowError::config(format!(
            "API key not found. Set the {var_name} environment variable."
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.articleflow/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ArticleflowError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.articleflow/articleflow.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ArticleflowError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ArticleflowError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let path = config_file_path()?;
    init_config_at(&path)?;
    Ok(path)
}

/// Write a default config file at `path`, creating parent directories.
pub fn init_config_at(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| ArticleflowError::io(dir, e))?;
        }
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ArticleflowError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ArticleflowError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("SERP_API_KEY"));
        assert!(toml_str.contains("GROQ_API_KEY"));
        assert!(toml_str.contains("tokens_per_minute"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.pipeline.tokens_per_minute, 6000);
        assert_eq!(parsed.pipeline.excerpt_max_chars, 2500);
        assert_eq!(parsed.search.result_count, 5);
        assert_eq!(parsed.store.kind, StoreKind::Http);
        assert!(!parsed.pipeline.force_reprocess);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[store]
kind = "libsql"
db_path = "/tmp/articles.db"

[pipeline]
force_reprocess = true
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.store.kind, StoreKind::Libsql);
        assert_eq!(config.store.db_path, "/tmp/articles.db");
        assert!(config.pipeline.force_reprocess);
        assert_eq!(config.pipeline.safety_margin_ms, 200);
        assert_eq!(config.rewrite.model, "llama-3.1-8b-instant");
        assert!(config.search.denylist.iter().any(|d| d == "youtube.com"));
    }

    #[test]
    fn missing_credentials_are_fatal() {
        let mut config = AppConfig::default();
        // Unique env var names to avoid interfering with other tests
        config.search.api_key_env = "AF_TEST_NONEXISTENT_SEARCH_KEY_12345".into();
        config.rewrite.api_key_env = "AF_TEST_NONEXISTENT_REWRITE_KEY_12345".into();
        let result = resolve_credentials(&config);
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("API key not found"));
        assert!(message.contains("AF_TEST_NONEXISTENT_SEARCH_KEY_12345"));
    }

    #[test]
    fn init_config_at_writes_loadable_defaults() {
        let dir = std::env::temp_dir().join(format!("articleflow-config-{}", std::process::id()));
        let path = dir.join("nested").join(CONFIG_FILE_NAME);

        init_config_at(&path).expect("init config");
        let config = load_config_from(&path).expect("load config");
        assert_eq!(config.pipeline.tokens_per_minute, 6000);
        assert_eq!(config.rewrite.api_key_env, "GROQ_API_KEY");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let creds = Credentials {
            search_api_key: "serp-secret".into(),
            rewrite_api_key: "groq-secret".into(),
        };
        let printed = format!("{creds:?}");
        assert!(!printed.contains("secret"));
    }
}
