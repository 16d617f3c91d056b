//! Markdown feed export
//!
//! Renders a project's stored feed as a markdown document: one section per
//! article, most viewed first, with its thumbnail, view count and summary.

use crate::output::OutputResult;
use crate::storage::StoredArticle;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the feed for `project` to `output_path`
///
/// # Arguments
///
/// * `project` - Project the articles belong to
/// * `articles` - Feed rows in display order
/// * `generated_at` - Time stamped into the document header
/// * `output_path` - Destination file; replaced if it exists
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the feed
/// * `Err(OutputError)` - Failed to write the file
pub fn write_markdown_feed(
    project: &str,
    articles: &[StoredArticle],
    generated_at: DateTime<Utc>,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_feed(project, articles, generated_at);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats feed rows as markdown
pub fn format_markdown_feed(
    project: &str,
    articles: &[StoredArticle],
    generated_at: DateTime<Utc>,
) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Trending on {}.wikipedia.org\n\n", project));
    md.push_str(&format!(
        "_Generated {} from {} articles._\n\n",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        articles.len()
    ));

    if articles.is_empty() {
        md.push_str("No articles have been collected for this project yet.\n");
        return md;
    }

    for (position, article) in articles.iter().enumerate() {
        md.push_str(&format!(
            "## {}. [{}]({})\n\n",
            position + 1,
            escape_brackets(&article.title),
            article.article_url
        ));
        if !article.thumbnail_url.is_empty() {
            md.push_str(&format!(
                "[![{}]({})]({})\n\n",
                escape_brackets(&article.title),
                article.thumbnail_url,
                article.image_url
            ));
        }
        md.push_str(&format!(
            "- **Daily views**: {}\n- **Retrieved**: {}\n\n",
            article.daily_views,
            article.retrieved_at.format("%Y-%m-%d %H:%M UTC")
        ));
        md.push_str(article.abstract_text.trim());
        md.push_str("\n\n");
    }

    md
}

fn escape_brackets(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}
