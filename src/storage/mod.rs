//! Storage module for persisting the article feed
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Idempotent article upserts keyed by project and article
//! - Age-based deletion scoped to one project
//! - Paged reads for serving the feed

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{ArticleStore, StorageError, StorageResult};

use crate::wiki::{ItemDetail, RankedItem};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// One feed row
///
/// Serialized as the JSON article object of the read API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredArticle {
    pub project: String,
    pub article: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub article_url: String,
    pub daily_views: u64,

    /// When the detail was fetched
    ///
    /// The store keeps microsecond precision, so a row read back may differ
    /// from the value written by its sub-microsecond part. Ordering between
    /// passes is unaffected.
    pub retrieved_at: DateTime<Utc>,
}

impl StoredArticle {
    /// Builds the row for a ranked article and its fetched detail
    ///
    /// The image and thumbnail come from the first media entry; both are empty
    /// if the detail has no media.
    pub fn from_detail(project: &str, ranked: &RankedItem, detail: ItemDetail) -> Self {
        let (image_url, thumbnail_url) = detail
            .lead_image()
            .map(|m| (m.original_url.clone(), m.thumbnail_url.clone()))
            .unwrap_or_default();

        Self {
            project: project.to_string(),
            article: detail.article,
            title: detail.title,
            abstract_text: detail.extract,
            image_url,
            thumbnail_url,
            article_url: detail.page_url,
            daily_views: ranked.views,
            retrieved_at: detail.retrieved_at,
        }
    }
}
