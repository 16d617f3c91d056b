//! Detail fetch fan-out
//!
//! One task is spawned per ranked article. Tasks are not limited in number;
//! the pace of their requests is set by the client's shared rate limiter.
//! Results arrive on a bounded channel in completion order, and the channel
//! closes once the last task has finished.

use crate::crawler::diagnostics::DiagnosticSink;
use crate::wiki::{ArticleSource, ItemDetail, RankedItem};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// A ranked article together with its fetched detail
#[derive(Debug, Clone)]
pub struct FetchedArticle {
    pub ranked: RankedItem,
    pub detail: ItemDetail,
}

/// Unordered stream of successfully fetched articles
///
/// Dropping the stream aborts any fetch still running.
pub struct DetailStream {
    rx: mpsc::Receiver<FetchedArticle>,
    failures: Arc<AtomicUsize>,
    _tasks: JoinSet<()>,
}

impl DetailStream {
    /// Waits for the next completed fetch; `None` once every task has finished
    pub async fn next(&mut self) -> Option<FetchedArticle> {
        self.rx.recv().await
    }

    /// Consumes and discards everything still in flight
    pub async fn drain(&mut self) -> usize {
        let mut discarded = 0;
        while self.rx.recv().await.is_some() {
            discarded += 1;
        }
        discarded
    }

    /// Number of fetches that failed so far
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}

/// Starts one detail fetch per ranked article
///
/// A failed fetch is handed to `sink` and the article is left out of the
/// stream. Once `cancel` fires no new request is started and running fetches
/// stop at their next suspension point.
///
/// # Arguments
///
/// * `source` - Where details are fetched from
/// * `project` - Project the articles belong to
/// * `ranked` - Articles to fetch
/// * `sink` - Receives per-article failures
/// * `cancel` - Stops the fan-out
/// * `buffer` - Completed fetches held before senders wait for the consumer
pub fn fetch_details(
    source: Arc<dyn ArticleSource>,
    project: &str,
    ranked: Vec<RankedItem>,
    sink: Arc<dyn DiagnosticSink>,
    cancel: CancellationToken,
    buffer: usize,
) -> DetailStream {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let failures = Arc::new(AtomicUsize::new(0));
    let project: Arc<str> = Arc::from(project);
    let mut tasks = JoinSet::new();

    for ranked in ranked {
        if cancel.is_cancelled() {
            break;
        }

        let source = Arc::clone(&source);
        let sink = Arc::clone(&sink);
        let failures = Arc::clone(&failures);
        let project = Arc::clone(&project);
        let cancel = cancel.clone();
        let tx = tx.clone();

        tasks.spawn(async move {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                result = source.fetch_detail(&project, &ranked.article) => result,
            };

            match result {
                Ok(detail) => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {}
                        _ = tx.send(FetchedArticle { ranked, detail }) => {}
                    }
                }
                Err(e) => {
                    failures.fetch_add(1, Ordering::Relaxed);
                    sink.report(&project, &ranked.article, &e);
                }
            }
        });
    }

    DetailStream {
        rx,
        failures,
        _tasks: tasks,
    }
}
