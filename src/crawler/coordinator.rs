//! Crawler coordinator - main crawl orchestration logic
//!
//! A crawl pass walks the configured projects one at a time. For each project
//! it:
//! - Fetches yesterday's top-viewed ranking
//! - Drops denylisted entries
//! - Fans out detail fetches and writes the complete results
//! - Sweeps rows that fell out of the retention window
//!
//! The first project that fails ends the pass; later projects are not tried.

use crate::config::{Config, CrawlerConfig, DenylistConfig};
use crate::crawler::diagnostics::{DiagnosticSink, LogSink};
use crate::crawler::fetcher::fetch_details;
use crate::crawler::sweeper::sweep;
use crate::crawler::writer::write_articles;
use crate::project::{ensure_project, Denylist, RankingFilter};
use crate::storage::{open_storage, ArticleStore};
use crate::wiki::{ArticleSource, WikiClient};
use crate::FeedError;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Source of the current time for ranking days and retention cutoffs
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Counts from one project's pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectReport {
    pub project: String,

    /// Entries in the ranking
    pub ranked: usize,

    /// Ranking entries removed by the denylist
    pub denied: usize,

    /// Details fetched successfully
    pub fetched: usize,

    /// Details that could not be fetched
    pub fetch_failures: usize,

    /// Fetched details missing a summary or media
    pub incomplete: usize,

    /// Rows upserted
    pub written: usize,

    /// Rows removed by the retention sweep
    pub swept: u64,

    pub elapsed: Duration,
}

/// Reports for every project of a completed pass, in crawl order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub projects: Vec<ProjectReport>,
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Total rows upserted across all projects
    pub fn total_written(&self) -> usize {
        self.projects.iter().map(|p| p.written).sum()
    }
}

/// Runs crawl passes against a source and a store
pub struct Crawler {
    settings: CrawlerConfig,
    source: Arc<dyn ArticleSource>,
    store: Arc<dyn ArticleStore>,
    filter: Arc<dyn RankingFilter>,
    sink: Arc<dyn DiagnosticSink>,
    clock: Clock,
}

impl Crawler {
    /// Creates a crawler with the default denylist, log diagnostics and the
    /// system clock
    pub fn new(
        settings: CrawlerConfig,
        source: Arc<dyn ArticleSource>,
        store: Arc<dyn ArticleStore>,
    ) -> Self {
        Self {
            settings,
            source,
            store,
            filter: Arc::new(Denylist::new(&DenylistConfig::default())),
            sink: Arc::new(LogSink),
            clock: Arc::new(Utc::now),
        }
    }

    /// Builds the HTTP client, opens the database and loads the denylist
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to crawl
    /// * `Err(FeedError)` - The client could not be built or the database
    ///   could not be opened
    pub fn from_config(config: &Config) -> Result<Self, FeedError> {
        let client = WikiClient::new(&config.user_agent, config.api.clone(), &config.crawler)?;
        let storage = open_storage(Path::new(&config.output.database_path))?;

        Ok(Self::new(config.crawler.clone(), Arc::new(client), Arc::new(storage))
            .with_filter(Arc::new(Denylist::new(&config.denylist))))
    }

    pub fn with_filter(mut self, filter: Arc<dyn RankingFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Store the crawler writes to
    pub fn store(&self) -> Arc<dyn ArticleStore> {
        Arc::clone(&self.store)
    }

    /// Crawls every configured project in order
    ///
    /// # Arguments
    ///
    /// * `cancel` - External stop signal; every project's pass token is a
    ///   child of it
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Every project completed
    /// * `Err(FeedError)` - The first project failure; later projects were
    ///   not attempted
    pub async fn crawl_once(&self, cancel: &CancellationToken) -> Result<CrawlReport, FeedError> {
        let started = Instant::now();
        let mut report = CrawlReport::default();

        for project in &self.settings.projects {
            match self.crawl_project(project, cancel).await {
                Ok(project_report) => report.projects.push(project_report),
                Err(e) => {
                    tracing::error!("crawl of {} failed: {}", project, e);
                    return Err(e);
                }
            }
        }

        report.elapsed = started.elapsed();
        tracing::info!(
            "crawled {} projects in {:.2?}",
            report.projects.len(),
            report.elapsed
        );
        Ok(report)
    }

    /// Runs one full pass for a single project
    ///
    /// The retention sweep only runs after every admitted write succeeded.
    pub async fn crawl_project(
        &self,
        project: &str,
        cancel: &CancellationToken,
    ) -> Result<ProjectReport, FeedError> {
        ensure_project(project)?;

        let started = Instant::now();
        let pass = cancel.child_token();
        let day = ((self.clock)() - chrono::Duration::days(1)).date_naive();
        tracing::info!("crawling {} for {}", project, day);

        let ranking = tokio::select! {
            biased;
            _ = pass.cancelled() => return Err(FeedError::Cancelled),
            ranking = self.source.fetch_ranking(project, day) => ranking?,
        };

        let ranked = ranking.len();
        let ranking = self.filter.retain(ranking);
        let denied = ranked - ranking.len();
        tracing::debug!(
            "{}: {} ranked articles, {} denylisted",
            project,
            ranked,
            denied
        );

        let write_concurrency = self.settings.write_concurrency as usize;
        let mut details = fetch_details(
            Arc::clone(&self.source),
            project,
            ranking,
            Arc::clone(&self.sink),
            pass.clone(),
            write_concurrency,
        );
        let outcome = write_articles(
            Arc::clone(&self.store),
            project,
            &mut details,
            write_concurrency,
            pass.clone(),
        )
        .await?;
        let fetch_failures = details.failures();
        drop(details);

        if pass.is_cancelled() {
            return Err(FeedError::Cancelled);
        }

        let swept = sweep(
            self.store.as_ref(),
            project,
            (self.clock)(),
            self.settings.retention_window(),
        )
        .await?;

        let report = ProjectReport {
            project: project.to_string(),
            ranked,
            denied,
            fetched: outcome.fetched,
            fetch_failures,
            incomplete: outcome.incomplete,
            written: outcome.written,
            swept,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            "finished {}: wrote {} of {} ranked articles in {:.2?}",
            project,
            report.written,
            report.ranked,
            report.elapsed
        );
        Ok(report)
    }
}
