//! Output module for presenting the feed and crawl results
//!
//! This module handles:
//! - Printing crawl reports and stored row counts
//! - Listing feed rows on the terminal
//! - Exporting a project's feed as markdown

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_feed, write_markdown_feed};
pub use stats::{format_report, load_statistics, print_report, print_statistics, FeedStatistics};

use crate::storage::StoredArticle;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Formats feed rows as a numbered listing, starting at `offset + 1`
pub fn format_articles(articles: &[StoredArticle], offset: u32) -> String {
    let mut out = String::new();
    for (i, article) in articles.iter().enumerate() {
        out.push_str(&format!(
            "{:>4}. {} ({} views)\n      {}\n",
            offset as usize + i + 1,
            article.title,
            article.daily_views,
            article.article_url
        ));
        if !article.thumbnail_url.is_empty() {
            out.push_str(&format!("      image: {}\n", article.thumbnail_url));
        }
    }
    out
}

/// Prints feed rows to stdout
pub fn print_articles(articles: &[StoredArticle], offset: u32) {
    if articles.is_empty() {
        println!("No articles.");
    } else {
        print!("{}", format_articles(articles, offset));
    }
}
