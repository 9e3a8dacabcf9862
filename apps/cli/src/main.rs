//! articleflow CLI: resumable article enrichment.
//!
//! Finds reference articles for every stored article, scrapes them, and
//! rewrites the original under a per-minute generation budget.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
