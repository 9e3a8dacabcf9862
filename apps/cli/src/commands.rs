//! CLI command definitions, routing, and tracing setup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use articleflow_core::{
    ChatRewriter, ItemOutcome, ItemReport, Pipeline, ProgressReporter, RateBudget, RewriteOptions,
    RunSummary,
};
use articleflow_crawler::{ReferenceScraper, ScrapeOptions};
use articleflow_discovery::{DiscoveryOptions, SerpDiscovery};
use articleflow_shared::{
    AppConfig, Article, Stage, StoreKind, config_file_path, init_config_at, load_config,
    load_config_from, resolve_credentials,
};
use articleflow_storage::{ArticleStore, HttpStore, LibsqlStore};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// articleflow: enrich stored articles with discovered references.
#[derive(Parser)]
#[command(
    name = "articleflow",
    version,
    about = "Enrich stored articles with discovered references and a budgeted rewrite.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.articleflow/articleflow.toml.
    #[arg(long, global = true, env = "ARTICLEFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Article store backend, overriding the config file.
    #[arg(long, global = true)]
    pub store: Option<StoreArg>,

    /// libSQL database path, overriding the config file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Store backend selectable on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum StoreArg {
    Http,
    Libsql,
}

impl From<StoreArg> for StoreKind {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Http => StoreKind::Http,
            StoreArg::Libsql => StoreKind::Libsql,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Process every article: search, scrape, rewrite. Resumes where the last run stopped.
    Run {
        /// Re-run every stage, including for completed articles.
        #[arg(long)]
        force: bool,
    },

    /// Show article counts per processing stage.
    Status,

    /// Import pending articles from a JSON file into the libSQL store.
    Import {
        /// JSON array of `{ "title", "content", "url"? }` objects.
        file: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "articleflow=info",
        1 => "articleflow=debug",
        _ => "articleflow=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Run { force } => cmd_run(resolve_config(&cli)?, *force).await,
        Command::Status => cmd_status(&resolve_config(&cli)?).await,
        Command::Import { file } => cmd_import(&resolve_config(&cli)?, file).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(cli.config.as_deref()),
            ConfigAction::Show => cmd_config_show(&resolve_config(&cli)?),
        },
    }
}

/// Load the config file and apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if let Some(store) = cli.store {
        config.store.kind = store.into();
    }
    if let Some(db) = &cli.db {
        config.store.db_path = db.to_string_lossy().into_owned();
        if cli.store.is_none() {
            config.store.kind = StoreKind::Libsql;
        }
    }
    Ok(config)
}

/// Open the configured article store.
async fn open_store(config: &AppConfig, readonly: bool) -> Result<Box<dyn ArticleStore>> {
    let store: Box<dyn ArticleStore> = match config.store.kind {
        StoreKind::Http => Box::new(HttpStore::new(
            config.store.api_url.as_str(),
            Duration::from_secs(config.store.timeout_secs),
        )?),
        StoreKind::Libsql => Box::new(open_local(config, readonly).await?),
    };
    Ok(store)
}

async fn open_local(config: &AppConfig, readonly: bool) -> Result<LibsqlStore> {
    let path = Path::new(&config.store.db_path);
    if readonly {
        if !path.exists() {
            return Err(eyre!(
                "no database at '{}'. Import articles first with `articleflow import`.",
                path.display()
            ));
        }
        Ok(LibsqlStore::open_readonly(path).await?)
    } else {
        Ok(LibsqlStore::open(path).await?)
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(config: AppConfig, force: bool) -> Result<()> {
    // Missing keys must stop the run before any article is touched.
    let credentials = resolve_credentials(&config)?;

    let store = open_store(&config, false).await?;
    let budget = Arc::new(RateBudget::from_config(&config.pipeline));
    let discovery = SerpDiscovery::new(
        credentials.search_api_key,
        DiscoveryOptions::from(&config.search),
    )?;
    let scraper = ReferenceScraper::new(ScrapeOptions::from(&config.pipeline))?;
    let rewriter = ChatRewriter::new(
        credentials.rewrite_api_key,
        RewriteOptions::new(&config.rewrite, &config.pipeline),
        budget,
    )?;

    let force = force || config.pipeline.force_reprocess;
    info!(
        store = ?config.store.kind,
        force,
        tokens_per_minute = config.pipeline.tokens_per_minute,
        "starting run"
    );

    let reporter = CliProgress::new();
    let summary = Pipeline::new(store.as_ref(), &discovery, &scraper, &rewriter)
        .force_reprocess(force)
        .run(&reporter)
        .await?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("  Run {} finished", summary.run_id);
    println!("  Articles:     {}", summary.items.len());
    println!("  Completed:    {}", summary.completed());
    println!("  Skipped:      {}", summary.skipped());
    println!("  Too few refs: {}", summary.insufficient());
    println!("  Interrupted:  {}", summary.interrupted());
    println!("  Time:         {:.1}s", summary.elapsed.as_secs_f64());

    let interrupted: Vec<_> = summary
        .items
        .iter()
        .filter_map(|item| match &item.outcome {
            ItemOutcome::Interrupted { error } => Some((item, error)),
            _ => None,
        })
        .collect();
    if !interrupted.is_empty() {
        println!();
        println!("  Will resume on next run:");
        for (item, error) in interrupted {
            println!("    #{} {} (at {}): {error}", item.id, item.title, item.reached);
        }
    }
    println!();
}

async fn cmd_status(config: &AppConfig) -> Result<()> {
    let store = open_store(config, true).await?;
    let articles = store.list().await?;

    let mut counts: BTreeMap<Stage, usize> = Stage::ALL.iter().map(|s| (*s, 0)).collect();
    for article in &articles {
        *counts.entry(article.stage).or_default() += 1;
    }

    println!();
    for (stage, count) in &counts {
        println!("  {:<10} {count}", stage.as_str());
    }
    println!("  {:<10} {}", "total", articles.len());
    println!();

    for article in articles.iter().filter(|a| !a.stage.is_terminal()) {
        println!(
            "  #{:<5} {:<10} {}",
            article.id.0,
            article.stage.as_str(),
            article.title
        );
    }

    Ok(())
}

/// One article in an import file.
#[derive(Debug, Deserialize)]
struct ImportRecord {
    title: String,
    #[serde(alias = "original_content")]
    content: String,
    #[serde(default, alias = "original_url")]
    url: Option<String>,
}

async fn cmd_import(config: &AppConfig, file: &Path) -> Result<()> {
    if config.store.kind != StoreKind::Libsql {
        return Err(eyre!(
            "import writes to the local database; use --store libsql or set [store] kind = \"libsql\""
        ));
    }

    let content = std::fs::read_to_string(file)
        .map_err(|e| eyre!("cannot read '{}': {e}", file.display()))?;
    let records: Vec<ImportRecord> = serde_json::from_str(&content)
        .map_err(|e| eyre!("'{}' is not a JSON array of articles: {e}", file.display()))?;

    let store = open_local(config, false).await?;
    let mut imported = 0;
    for record in &records {
        let id = store
            .insert_article(&record.title, &record.content, record.url.as_deref())
            .await?;
        info!(%id, title = %record.title, "article imported");
        imported += 1;
    }

    println!("Imported {imported} article(s) into {}", config.store.db_path);
    Ok(())
}

fn cmd_config_init(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };
    init_config_at(&path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn run_started(&self, total: usize) {
        self.spinner.set_message(format!("Loaded {total} article(s)"));
    }

    fn item_started(&self, article: &Article, current: usize, total: usize) {
        self.spinner.set_message(format!(
            "[{current}/{total}] {} ({})",
            article.title, article.stage
        ));
    }

    fn stage_persisted(&self, article: &Article) {
        self.spinner
            .set_message(format!("{} -> {}", article.title, article.stage));
    }

    fn item_finished(&self, report: &ItemReport) {
        self.spinner.println(format!(
            "  {:<24} #{} {}",
            report.outcome.label(),
            report.id,
            report.title
        ));
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}
