//! Wikifeed: a trending-article feed refresher
//!
//! This crate keeps a store of the most viewed Wikipedia articles per project
//! up to date. Each crawl pass fetches the daily top list, retrieves summary and
//! media detail for every ranked article, drops incomplete detail, upserts the
//! rest and finally prunes rows that have aged out of the retention window.
//! The stored feed is read back through [`server`] or the CLI.

pub mod config;
pub mod crawler;
pub mod output;
pub mod project;
pub mod server;
pub mod storage;
pub mod wiki;

use thiserror::Error;

/// Main error type for Wikifeed operations
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Project {0:?} is not a known project")]
    UnknownProject(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Task failed: {0}")]
    Task(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transient errors from the ranking and detail endpoints
///
/// A failed detail fetch only skips that article; a failed ranking fetch
/// fails the pass for its project. Neither is retried within a pass.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Unexpected status code {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("No ranking found for project {project}")]
    NoRanking { project: String },

    #[error("Invalid request URL: {0}")]
    Url(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Unknown project in config: {0}")]
    UnknownProject(String),
}

/// Result type alias for Wikifeed operations
pub type Result<T> = std::result::Result<T, FeedError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, Crawler, ProjectReport};
pub use project::{is_project, Denylist, RankingFilter, PROJECTS};
pub use storage::{ArticleStore, SqliteStorage, StoredArticle};
pub use wiki::{ArticleSource, ItemDetail, MediaRef, RankedItem, WikiClient};
