use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Wikifeed
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub api: ApiConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub denylist: DenylistConfig,
}

/// Crawl pass behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Projects to crawl, in order
    pub projects: Vec<String>,

    /// Rows retrieved before `now - retention`, truncated to the day, are swept
    #[serde(rename = "retention-hours", default = "default_retention_hours")]
    pub retention_hours: u64,

    /// Maximum number of upserts in flight at once
    #[serde(rename = "write-concurrency", default = "default_write_concurrency")]
    pub write_concurrency: u32,

    /// Steady request rate shared by all ranking and detail requests
    #[serde(rename = "rate-limit-rps", default = "default_rate_limit_rps")]
    pub rate_limit_rps: f64,

    /// Number of requests allowed to burst above the steady rate
    #[serde(rename = "rate-limit-burst", default = "default_rate_limit_burst")]
    pub rate_limit_burst: u32,
}

impl CrawlerConfig {
    /// Returns the retention window as a duration
    pub fn retention_window(&self) -> Duration {
        Duration::from_secs(self.retention_hours.saturating_mul(3600))
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            projects: vec!["en".to_string()],
            retention_hours: default_retention_hours(),
            write_concurrency: default_write_concurrency(),
            rate_limit_rps: default_rate_limit_rps(),
            rate_limit_burst: default_rate_limit_burst(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the user agent string: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Upstream REST endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the pageviews (ranking) API
    #[serde(rename = "pageviews-url", default = "default_pageviews_url")]
    pub pageviews_url: String,

    /// Base URL of a project's REST API; `{project}` is replaced by the project code
    #[serde(rename = "project-url-template", default = "default_project_url_template")]
    pub project_url_template: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            pageviews_url: default_pageviews_url(),
            project_url_template: default_project_url_template(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Ranked entries that are not real articles
#[derive(Debug, Clone, Deserialize)]
pub struct DenylistConfig {
    /// Titles starting with any of these are dropped
    #[serde(default)]
    pub prefixes: Vec<String>,

    /// Titles equal to any of these are dropped
    #[serde(default)]
    pub exact: Vec<String>,

    /// Titles containing any of these are dropped
    #[serde(default)]
    pub contains: Vec<String>,
}

impl Default for DenylistConfig {
    fn default() -> Self {
        Self {
            prefixes: vec!["Special:".to_string(), "Wikipedia:".to_string()],
            exact: vec!["Main_Page".to_string()],
            contains: vec![
                "Pagina principale".to_string(),
                "Wikipédia:Accueil principal".to_string(),
            ],
        }
    }
}

fn default_retention_hours() -> u64 {
    48
}

fn default_write_concurrency() -> u32 {
    10
}

fn default_rate_limit_rps() -> f64 {
    75.0
}

fn default_rate_limit_burst() -> u32 {
    5
}

fn default_pageviews_url() -> String {
    "https://wikimedia.org/api/rest_v1".to_string()
}

fn default_project_url_template() -> String {
    "https://{project}.wikipedia.org/api/rest_v1".to_string()
}
