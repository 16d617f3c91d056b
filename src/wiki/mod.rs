//! Wikimedia API access
//!
//! This module contains:
//! - The `ArticleSource` trait the crawl pipeline fetches through
//! - `WikiClient`, its rate-limited HTTP implementation
//! - The ranking and detail types passed down the pipeline

mod client;
mod types;

pub use client::{build_http_client, build_rate_limiter, WikiClient};
pub use types::{ItemDetail, MediaRef, RankedItem};

use crate::FetchResult;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of rankings and article detail
///
/// Implementations must be safe to call from many tasks at once; the crawler
/// issues one `fetch_detail` per ranked article concurrently.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetches the top-viewed articles of `project` on `day`
    ///
    /// A failure here means no usable ranking exists for the pass.
    async fn fetch_ranking(&self, project: &str, day: NaiveDate) -> FetchResult<Vec<RankedItem>>;

    /// Fetches summary and media for one article
    async fn fetch_detail(&self, project: &str, article: &str) -> FetchResult<ItemDetail>;
}
