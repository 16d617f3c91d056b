//! Project handling for Wikifeed
//!
//! A project is one Wikipedia language edition. The set of projects the feed
//! knows about is fixed at compile time; membership never touches the store.

mod denylist;

pub use denylist::{Denylist, RankingFilter};

use crate::FeedError;

/// Every project the feed can crawl or serve
pub const PROJECTS: &[&str] = &[
    "en", "fr", "es", "de", "ru", "ja", "nl", "it", "sv", "pl", "vi", "pt", "ar", "zh", "uk",
    "ro", "bg", "th",
];

/// Returns true if `project` is one of [`PROJECTS`]
///
/// # Examples
///
/// ```
/// use wikifeed::project::is_project;
///
/// assert!(is_project("en"));
/// assert!(!is_project("EN"));
/// assert!(!is_project("xx"));
/// ```
pub fn is_project(project: &str) -> bool {
    PROJECTS.contains(&project)
}

/// Returns `Ok(())` for a known project and `FeedError::UnknownProject` otherwise
pub fn ensure_project(project: &str) -> Result<(), FeedError> {
    if is_project(project) {
        Ok(())
    } else {
        Err(FeedError::UnknownProject(project.to_string()))
    }
}
