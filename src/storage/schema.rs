//! Database schema definitions
//!
//! This module contains the SQL schema for the Wikifeed database.

/// SQL schema for the database
///
/// `retrieved` holds RFC 3339 UTC timestamps with a fixed number of fractional
/// digits, so string order matches time order.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS articles (
    project TEXT NOT NULL,
    article TEXT NOT NULL,
    title TEXT,
    thumbnail_url TEXT,
    image_url TEXT,
    abstract TEXT,
    article_url TEXT,
    daily_views INTEGER NOT NULL,
    retrieved TEXT NOT NULL,
    PRIMARY KEY (project, article)
);

CREATE INDEX IF NOT EXISTS idx_articles_project_views ON articles(project, daily_views DESC);
CREATE INDEX IF NOT EXISTS idx_articles_project_retrieved ON articles(project, retrieved);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
