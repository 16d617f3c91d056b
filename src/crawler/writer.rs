//! Bounded-concurrency article writes
//!
//! Fetched articles are filtered and upserted with at most
//! `write_concurrency` upserts in flight. The first failed upsert is kept,
//! the pass token is cancelled so that nothing new is admitted, and the
//! writes already running are allowed to settle before the error is returned.

use crate::crawler::fetcher::DetailStream;
use crate::crawler::filter::is_complete;
use crate::storage::{ArticleStore, StoredArticle};
use crate::FeedError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Counts from one write phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Articles received from the fetch stage
    pub fetched: usize,

    /// Articles dropped for missing summary or media
    pub incomplete: usize,

    /// Articles successfully upserted
    pub written: usize,
}

/// Holds the first error of a write phase; later errors are discarded
#[derive(Default)]
struct FirstError {
    slot: Mutex<Option<FeedError>>,
}

impl FirstError {
    fn set(&self, error: FeedError) {
        let mut slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        if slot.is_none() {
            *slot = Some(error);
        } else {
            tracing::debug!("superseded write error: {}", error);
        }
    }

    fn take(&self) -> Option<FeedError> {
        self.slot.lock().unwrap_or_else(|p| p.into_inner()).take()
    }
}

/// Filters fetched articles and upserts the complete ones
///
/// # Arguments
///
/// * `store` - Destination of the upserts
/// * `project` - Project the articles belong to
/// * `details` - Fetched articles, in any order; drained on cancellation
/// * `write_concurrency` - Size of the admission gate
/// * `cancel` - Pass token; raised here on the first failed upsert
///
/// # Returns
///
/// * `Ok(WriteOutcome)` - Every admitted upsert succeeded
/// * `Err(FeedError)` - The first upsert failure, or `Cancelled` if the pass
///   was cancelled from outside
pub async fn write_articles(
    store: Arc<dyn ArticleStore>,
    project: &str,
    details: &mut DetailStream,
    write_concurrency: usize,
    cancel: CancellationToken,
) -> Result<WriteOutcome, FeedError> {
    let gate = Arc::new(Semaphore::new(write_concurrency.max(1)));
    let first_error = Arc::new(FirstError::default());
    let written = Arc::new(AtomicUsize::new(0));
    let mut writes = JoinSet::new();
    let mut outcome = WriteOutcome::default();

    loop {
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = details.next() => match next {
                Some(fetched) => fetched,
                None => break,
            },
        };
        outcome.fetched += 1;

        if !is_complete(&fetched.detail) {
            tracing::debug!(
                "skipping incomplete article {}:{}",
                project,
                fetched.ranked.article
            );
            outcome.incomplete += 1;
            continue;
        }

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = Arc::clone(&gate).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let article = StoredArticle::from_detail(project, &fetched.ranked, fetched.detail);
        let store = Arc::clone(&store);
        let first_error = Arc::clone(&first_error);
        let written = Arc::clone(&written);
        let cancel = cancel.clone();

        writes.spawn(async move {
            // Released only after the error slot and token are updated.
            let _permit = permit;
            if cancel.is_cancelled() {
                first_error.set(FeedError::Cancelled);
                return;
            }
            match store.upsert_article(article).await {
                Ok(()) => {
                    written.fetch_add(1, Ordering::SeqCst);
                }
                Err(e) => {
                    first_error.set(FeedError::Storage(e));
                    cancel.cancel();
                }
            }
        });
    }

    if cancel.is_cancelled() {
        let discarded = details.drain().await;
        if discarded > 0 {
            tracing::debug!("discarded {} fetched articles after cancellation", discarded);
        }
    }

    while let Some(joined) = writes.join_next().await {
        if let Err(e) = joined {
            first_error.set(FeedError::Task(e.to_string()));
            cancel.cancel();
        }
    }

    if let Some(error) = first_error.take() {
        return Err(error);
    }
    if cancel.is_cancelled() {
        return Err(FeedError::Cancelled);
    }

    outcome.written = written.load(Ordering::SeqCst);
    Ok(outcome)
}
