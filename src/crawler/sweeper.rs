//! Retention sweep
//!
//! After a project's writes complete, rows retrieved before the start of the
//! day that lies `retention` before now are deleted. Truncating to the day
//! keeps a whole day's worth of rows together.

use crate::storage::ArticleStore;
use crate::FeedError;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use std::time::Duration;

/// Start of the UTC day containing `now - window`
///
/// Windows too large to subtract clamp to the earliest representable time,
/// which makes the sweep a no-op.
pub fn retention_cutoff(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(window)
        .ok()
        .and_then(|window| now.checked_sub_signed(window))
        .map(|earliest| Utc.from_utc_datetime(&earliest.date_naive().and_time(NaiveTime::MIN)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Deletes the project's rows retrieved strictly before the retention cutoff
///
/// # Returns
///
/// * `Ok(u64)` - Number of rows removed
/// * `Err(FeedError)` - The store rejected the delete
pub async fn sweep(
    store: &dyn ArticleStore,
    project: &str,
    now: DateTime<Utc>,
    window: Duration,
) -> Result<u64, FeedError> {
    let cutoff = retention_cutoff(now, window);
    let removed = store.delete_old_articles(project, cutoff).await?;
    if removed > 0 {
        tracing::info!(
            "removed {} {} articles retrieved before {}",
            removed,
            project,
            cutoff.to_rfc3339()
        );
    }
    Ok(removed)
}
