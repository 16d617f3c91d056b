//! In-process fakes for exercising the pipeline without a network or disk

use crate::crawler::diagnostics::DiagnosticSink;
use crate::storage::{ArticleStore, SqliteStorage, StorageError, StorageResult, StoredArticle};
use crate::wiki::{ArticleSource, ItemDetail, MediaRef, RankedItem};
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn ranked(article: &str, views: u64) -> RankedItem {
    RankedItem {
        article: article.to_string(),
        views,
        rank: 1,
    }
}

pub(crate) fn complete_detail(article: &str) -> ItemDetail {
    complete_detail_at(article, Utc::now())
}

pub(crate) fn complete_detail_at(article: &str, retrieved_at: DateTime<Utc>) -> ItemDetail {
    ItemDetail {
        article: article.to_string(),
        title: article.replace('_', " "),
        extract: format!("{} is an article.", article),
        page_url: format!("https://en.wikipedia.org/wiki/{}", article),
        media: vec![MediaRef {
            original_url: format!("https://img/{}.png", article),
            thumbnail_url: format!("https://img/{}_t.png", article),
        }],
        retrieved_at,
    }
}

pub(crate) fn incomplete_detail(article: &str) -> ItemDetail {
    ItemDetail {
        extract: String::new(),
        ..complete_detail(article)
    }
}

/// Scripted ranking and detail responses
#[derive(Default)]
pub(crate) struct MockSource {
    ranking: HashMap<String, Vec<RankedItem>>,
    default_ranking: Option<Vec<RankedItem>>,
    failing_rankings: HashSet<String>,
    details: HashMap<String, ItemDetail>,
    failing_details: HashSet<String>,
    detail_delay: Option<Duration>,
    ranking_calls: Mutex<Vec<(String, NaiveDate)>>,
    detail_calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranking returned for every project without its own ranking
    pub fn with_ranking(mut self, ranking: Vec<RankedItem>) -> Self {
        self.default_ranking = Some(ranking);
        self
    }

    pub fn with_project_ranking(mut self, project: &str, ranking: Vec<RankedItem>) -> Self {
        self.ranking.insert(project.to_string(), ranking);
        self
    }

    pub fn with_failing_ranking(mut self, project: &str) -> Self {
        self.failing_rankings.insert(project.to_string());
        self
    }

    pub fn with_detail(mut self, detail: ItemDetail) -> Self {
        self.details.insert(detail.article.clone(), detail);
        self
    }

    pub fn with_failing_detail(mut self, article: &str) -> Self {
        self.failing_details.insert(article.to_string());
        self
    }

    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = Some(delay);
        self
    }

    pub fn ranking_calls(&self) -> Vec<(String, NaiveDate)> {
        self.ranking_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

fn status_error(url: String, status: u16) -> FetchError {
    FetchError::Status {
        url,
        status,
        body: "mock failure".to_string(),
    }
}

#[async_trait]
impl ArticleSource for MockSource {
    async fn fetch_ranking(&self, project: &str, day: NaiveDate) -> FetchResult<Vec<RankedItem>> {
        if let Ok(mut calls) = self.ranking_calls.lock() {
            calls.push((project.to_string(), day));
        }
        if self.failing_rankings.contains(project) {
            return Err(status_error(format!("mock://ranking/{}", project), 500));
        }
        self.ranking
            .get(project)
            .or(self.default_ranking.as_ref())
            .cloned()
            .ok_or_else(|| FetchError::NoRanking {
                project: project.to_string(),
            })
    }

    async fn fetch_detail(&self, project: &str, article: &str) -> FetchResult<ItemDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.detail_delay {
            tokio::time::sleep(delay).await;
        }
        let url = format!("mock://{}/{}", project, article);
        if self.failing_details.contains(article) {
            return Err(status_error(url, 500));
        }
        self.details
            .get(article)
            .cloned()
            .ok_or_else(|| status_error(url, 404))
    }
}

/// In-memory SQLite store with call accounting and injectable failures
pub(crate) struct MockStore {
    inner: SqliteStorage,
    upsert_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delete_calls: AtomicUsize,
    fail_on_upsert: Option<usize>,
    fail_delete: bool,
    write_delay: Duration,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStorage::new_in_memory().expect("in-memory database"),
            upsert_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            fail_on_upsert: None,
            fail_delete: false,
            write_delay: Duration::ZERO,
        }
    }

    /// Fails the `n`th upsert call (1-based) immediately
    pub fn failing_upsert(mut self, n: usize) -> Self {
        self.fail_on_upsert = Some(n);
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleStore for MockStore {
    async fn upsert_article(&self, article: StoredArticle) -> StorageResult<()> {
        let call = self.upsert_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let result = if self.fail_on_upsert == Some(call) {
            Err(StorageError::Task(format!("injected failure on write {}", call)))
        } else {
            if !self.write_delay.is_zero() {
                tokio::time::sleep(self.write_delay).await;
            }
            self.inner.upsert_article(article).await
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn delete_old_articles(
        &self,
        project: &str,
        retrieved_before: DateTime<Utc>,
    ) -> StorageResult<u64> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete {
            return Err(StorageError::Task("injected delete failure".to_string()));
        }
        self.inner
            .delete_old_articles(project, retrieved_before)
            .await
    }

    async fn get_articles(
        &self,
        project: &str,
        offset: u32,
        limit: u32,
    ) -> StorageResult<Vec<StoredArticle>> {
        self.inner.get_articles(project, offset, limit).await
    }

    async fn count_articles(&self, project: &str) -> StorageResult<u64> {
        self.inner.count_articles(project).await
    }
}

/// Collects reported fetch failures
#[derive(Default)]
pub(crate) struct RecordingSink {
    reports: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn reports(&self) -> Vec<(String, String)> {
        self.reports
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, project: &str, article: &str, _error: &FetchError) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push((project.to_string(), article.to_string()));
        }
    }
}
