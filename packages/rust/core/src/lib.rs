//! Core pipeline orchestration for articleflow.
//!
//! This crate ties the article store, reference discovery, reference
//! scraping and budgeted rewriting together into one resumable run
//! ([`Pipeline`]).

pub mod budget;
pub mod pipeline;
pub mod references;
pub mod rewrite;

pub use budget::{BudgetSnapshot, RateBudget, estimate_units};
pub use pipeline::{ItemOutcome, ItemReport, Pipeline, ProgressReporter, RunSummary, SilentProgress};
pub use references::append_references;
pub use rewrite::{ChatRewriter, RewriteOptions, TextRewriter};
