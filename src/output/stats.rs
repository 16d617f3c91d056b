//! Crawl report and feed statistics
//!
//! This module renders the per-project counts of a crawl pass and the stored
//! row counts for each configured project.

use crate::crawler::CrawlReport;
use crate::storage::ArticleStore;
use crate::FeedError;

/// Stored row count per project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedStatistics {
    pub articles_by_project: Vec<(String, u64)>,
}

impl FeedStatistics {
    pub fn total_articles(&self) -> u64 {
        self.articles_by_project.iter().map(|(_, n)| n).sum()
    }
}

/// Counts stored rows for each project, in the given order
pub async fn load_statistics(
    store: &dyn ArticleStore,
    projects: &[String],
) -> Result<FeedStatistics, FeedError> {
    let mut articles_by_project = Vec::with_capacity(projects.len());
    for project in projects {
        let count = store.count_articles(project).await?;
        articles_by_project.push((project.clone(), count));
    }
    Ok(FeedStatistics {
        articles_by_project,
    })
}

/// Formats a crawl report as a plain-text table
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();
    out.push_str("=== Crawl Report ===\n\n");
    out.push_str(&format!(
        "{:<8}{:>8}{:>8}{:>9}{:>9}{:>12}{:>9}{:>7}{:>10}\n",
        "project", "ranked", "denied", "fetched", "failed", "incomplete", "written", "swept", "elapsed"
    ));

    for p in &report.projects {
        out.push_str(&format!(
            "{:<8}{:>8}{:>8}{:>9}{:>9}{:>12}{:>9}{:>7}{:>10}\n",
            p.project,
            p.ranked,
            p.denied,
            p.fetched,
            p.fetch_failures,
            p.incomplete,
            p.written,
            p.swept,
            format!("{:.1}s", p.elapsed.as_secs_f64())
        ));
    }

    out.push_str(&format!(
        "\n{} articles written across {} projects in {:.1}s\n",
        report.total_written(),
        report.projects.len(),
        report.elapsed.as_secs_f64()
    ));
    out
}

/// Prints a crawl report to stdout
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}

/// Prints stored row counts to stdout
pub fn print_statistics(stats: &FeedStatistics) {
    println!("=== Feed Statistics ===\n");
    for (project, count) in &stats.articles_by_project {
        println!("  {:<4} {} articles", project, count);
    }
    println!("\nTotal: {} articles", stats.total_articles());
}
