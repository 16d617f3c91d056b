use crate::config::DenylistConfig;
use crate::wiki::RankedItem;

/// Decides which ranked entries are not real articles
///
/// The top list for a project includes special pages and the project's home
/// page. These are removed before any detail is fetched.
pub trait RankingFilter: Send + Sync {
    /// Returns true if the entry should be dropped
    fn should_skip(&self, article: &str) -> bool;

    /// Keeps the entries that pass the filter, preserving their order
    fn retain(&self, ranked: Vec<RankedItem>) -> Vec<RankedItem> {
        ranked
            .into_iter()
            .filter(|item| !self.should_skip(&item.article))
            .collect()
    }
}

/// Title-based denylist built from configuration
///
/// An article is skipped when its title:
/// 1. starts with any configured prefix (e.g. "Special:")
/// 2. equals any configured exact title (e.g. "Main_Page")
/// 3. contains any configured substring (e.g. a localized home page name)
#[derive(Debug, Clone, Default)]
pub struct Denylist {
    prefixes: Vec<String>,
    exact: Vec<String>,
    contains: Vec<String>,
}

impl Denylist {
    pub fn new(config: &DenylistConfig) -> Self {
        Self {
            prefixes: config.prefixes.clone(),
            exact: config.exact.clone(),
            contains: config.contains.clone(),
        }
    }
}

impl RankingFilter for Denylist {
    fn should_skip(&self, article: &str) -> bool {
        self.prefixes.iter().any(|p| article.starts_with(p.as_str()))
            || self.exact.iter().any(|e| article == e)
            || self.contains.iter().any(|c| article.contains(c.as_str()))
    }
}
