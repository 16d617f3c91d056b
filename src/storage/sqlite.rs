//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the `ArticleStore`
//! trait. The connection sits behind a mutex and every statement runs on the
//! blocking thread pool, so concurrent upserts serialize on the connection.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ArticleStore, StorageError, StorageResult};
use crate::storage::StoredArticle;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// SQLite storage backend
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StorageError::Poisoned)?;
            f(&*guard)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }
}

/// Formats a timestamp so that lexical order equals time order
///
/// Sub-microsecond digits are dropped.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Timestamp(format!("{}: {}", s, e)))
}

fn views_to_sql(views: u64) -> i64 {
    i64::try_from(views).unwrap_or(i64::MAX)
}

/// Column order shared by the read queries
const ARTICLE_COLUMNS: &str = "project, article, title, thumbnail_url, image_url, abstract,
     article_url, daily_views, retrieved";

fn read_article(row: &Row<'_>) -> rusqlite::Result<(StoredArticle, String)> {
    let views: i64 = row.get(7)?;
    let retrieved: String = row.get(8)?;
    let article = StoredArticle {
        project: row.get(0)?,
        article: row.get(1)?,
        title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        thumbnail_url: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        image_url: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        abstract_text: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        article_url: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        daily_views: views.max(0) as u64,
        retrieved_at: DateTime::<Utc>::MIN_UTC,
    };
    Ok((article, retrieved))
}

#[async_trait]
impl ArticleStore for SqliteStorage {
    async fn upsert_article(&self, article: StoredArticle) -> StorageResult<()> {
        self.with_conn(move |conn| {
            // Older detail never overwrites newer detail for the same key.
            conn.execute(
                "INSERT INTO articles
                    (project, article, title, thumbnail_url, image_url, abstract,
                     article_url, daily_views, retrieved)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(project, article) DO UPDATE SET
                    title = excluded.title,
                    thumbnail_url = excluded.thumbnail_url,
                    image_url = excluded.image_url,
                    abstract = excluded.abstract,
                    article_url = excluded.article_url,
                    daily_views = excluded.daily_views,
                    retrieved = excluded.retrieved
                 WHERE excluded.retrieved >= articles.retrieved",
                params![
                    article.project,
                    article.article,
                    article.title,
                    article.thumbnail_url,
                    article.image_url,
                    article.abstract_text,
                    article.article_url,
                    views_to_sql(article.daily_views),
                    format_timestamp(article.retrieved_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete_old_articles(
        &self,
        project: &str,
        retrieved_before: DateTime<Utc>,
    ) -> StorageResult<u64> {
        let project = project.to_string();
        self.with_conn(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM articles WHERE project = ?1 AND retrieved < ?2",
                params![project, format_timestamp(retrieved_before)],
            )?;
            Ok(deleted as u64)
        })
        .await
    }

    async fn get_articles(
        &self,
        project: &str,
        offset: u32,
        limit: u32,
    ) -> StorageResult<Vec<StoredArticle>> {
        let project = project.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM articles WHERE project = ?1
                 ORDER BY daily_views DESC, article ASC
                 LIMIT ?2 OFFSET ?3",
                ARTICLE_COLUMNS
            ))?;

            let rows = stmt.query_map(params![project, limit, offset], read_article)?;

            let mut articles = Vec::new();
            for row in rows {
                let (mut article, retrieved) = row?;
                article.retrieved_at = parse_timestamp(&retrieved)?;
                articles.push(article);
            }
            Ok(articles)
        })
        .await
    }

    async fn count_articles(&self, project: &str) -> StorageResult<u64> {
        let project = project.to_string();
        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM articles WHERE project = ?1",
                params![project],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }
}
