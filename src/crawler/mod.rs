//! Crawler module for refreshing the article feed
//!
//! This module contains the core crawl pipeline, including:
//! - Detail fetch fan-out paced by the client's rate limiter
//! - Completeness filtering of fetched detail
//! - Bounded-concurrency writes with first-error cancellation
//! - Retention sweeping
//! - Sequential per-project orchestration

mod coordinator;
mod diagnostics;
mod fetcher;
mod filter;
mod sweeper;
mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{Clock, CrawlReport, Crawler, ProjectReport};
pub use diagnostics::{DiagnosticSink, LogSink};
pub use fetcher::{fetch_details, DetailStream, FetchedArticle};
pub use filter::is_complete;
pub use sweeper::{retention_cutoff, sweep};
pub use writer::{write_articles, WriteOutcome};

use crate::config::Config;
use crate::FeedError;
use tokio_util::sync::CancellationToken;

/// Runs one crawl pass over every configured project
///
/// This is the main entry point for a crawl. It will:
/// 1. Open the database and build the HTTP client
/// 2. Crawl each configured project in order
/// 3. Stop at the first project that fails
///
/// # Arguments
///
/// * `config` - The loaded configuration
/// * `cancel` - Stops the pass when cancelled
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Every project completed
/// * `Err(FeedError)` - Setup failed or a project failed
pub async fn crawl(config: &Config, cancel: &CancellationToken) -> Result<CrawlReport, FeedError> {
    let crawler = Crawler::from_config(config)?;
    crawler.crawl_once(cancel).await
}
