//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::StoredArticle;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage connection lock poisoned")]
    Poisoned,

    #[error("Storage task failed: {0}")]
    Task(String),

    #[error("Invalid timestamp in database: {0}")]
    Timestamp(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistent store of feed articles
///
/// Rows are keyed by `(project, article)`. Implementations must accept
/// concurrent upserts, including concurrent upserts of the same key.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Inserts the article or overwrites the row with the same key
    ///
    /// Applying the same upsert twice leaves the same single row.
    async fn upsert_article(&self, article: StoredArticle) -> StorageResult<()>;

    /// Deletes the project's rows retrieved strictly before `retrieved_before`
    ///
    /// # Returns
    ///
    /// The number of rows deleted
    async fn delete_old_articles(
        &self,
        project: &str,
        retrieved_before: DateTime<Utc>,
    ) -> StorageResult<u64>;

    /// Gets a page of the project's articles, most viewed first
    async fn get_articles(
        &self,
        project: &str,
        offset: u32,
        limit: u32,
    ) -> StorageResult<Vec<StoredArticle>>;

    /// Counts the project's articles
    async fn count_articles(&self, project: &str) -> StorageResult<u64>;
}
