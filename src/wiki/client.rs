//! HTTP client for the Wikimedia REST API
//!
//! Every request this client sends, ranking or detail, first waits on a
//! single token-bucket limiter. However many article fetches are in flight,
//! the upstream service sees at most the configured steady rate plus burst.

use crate::config::{ApiConfig, CrawlerConfig, UserAgentConfig};
use crate::wiki::types::{MediaPayload, SummaryPayload, TopPageviewsPayload};
use crate::wiki::{ArticleSource, ItemDetail, RankedItem};
use crate::{ConfigError, FeedError, FetchError, FetchResult};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::time::Duration;
use url::{ParseError, Url};

/// Longest error body kept in a `FetchError::Status`
const MAX_ERROR_BODY: usize = 512;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Builds an HTTP client with the configured user agent
///
/// # Example
///
/// ```no_run
/// use wikifeed::config::UserAgentConfig;
/// use wikifeed::wiki::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "Wikifeed".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the shared token bucket: `rps` requests per second, `burst` at once
pub fn build_rate_limiter(rps: f64, burst: u32) -> Result<DirectLimiter, ConfigError> {
    let period = Duration::try_from_secs_f64(1.0 / rps).map_err(|_| {
        ConfigError::Validation(format!("rate_limit_rps {} is out of range", rps))
    })?;
    let burst = NonZeroU32::new(burst)
        .ok_or_else(|| ConfigError::Validation("rate_limit_burst must be >= 1".to_string()))?;
    let quota = Quota::with_period(period)
        .ok_or_else(|| ConfigError::Validation(format!("rate_limit_rps {} is too high", rps)))?
        .allow_burst(burst);
    Ok(RateLimiter::direct(quota))
}

/// Rate-limited client for the ranking and detail endpoints
pub struct WikiClient {
    client: Client,
    limiter: DirectLimiter,
    api: ApiConfig,
}

impl WikiClient {
    /// Creates a client from the loaded configuration
    pub fn new(
        user_agent: &UserAgentConfig,
        api: ApiConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, FeedError> {
        let client = build_http_client(user_agent)?;
        let limiter = build_rate_limiter(crawler.rate_limit_rps, crawler.rate_limit_burst)?;
        Ok(Self {
            client,
            limiter,
            api,
        })
    }

    /// URL of the top-viewed list for `project` on `day`
    pub fn ranking_url(&self, project: &str, day: NaiveDate) -> FetchResult<Url> {
        let host = format!("{}.wikipedia.org", project);
        let year = format!("{:04}", day.year());
        let month = format!("{:02}", day.month());
        let date = format!("{:02}", day.day());
        join_segments(
            &self.api.pageviews_url,
            &[
                "metrics",
                "pageviews",
                "top",
                host.as_str(),
                "all-access",
                year.as_str(),
                month.as_str(),
                date.as_str(),
            ],
        )
    }

    /// URL of an article endpoint (`summary` or `media`) on `project`
    pub fn page_url(&self, project: &str, endpoint: &str, article: &str) -> FetchResult<Url> {
        let base = self.api.project_url_template.replace("{project}", project);
        join_segments(&base, &["page", endpoint, article])
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> FetchResult<T> {
        self.limiter.until_ready().await;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn get_summary(&self, project: &str, article: &str) -> FetchResult<SummaryPayload> {
        let url = self.page_url(project, "summary", article)?;
        self.get_json(url).await
    }

    async fn get_media(&self, project: &str, article: &str) -> FetchResult<MediaPayload> {
        let url = self.page_url(project, "media", article)?;
        self.get_json(url).await
    }
}

#[async_trait]
impl ArticleSource for WikiClient {
    async fn fetch_ranking(&self, project: &str, day: NaiveDate) -> FetchResult<Vec<RankedItem>> {
        let url = self.ranking_url(project, day)?;
        let payload: TopPageviewsPayload = self.get_json(url).await?;
        payload
            .items
            .into_iter()
            .next()
            .map(|top| top.articles)
            .ok_or_else(|| FetchError::NoRanking {
                project: project.to_string(),
            })
    }

    async fn fetch_detail(&self, project: &str, article: &str) -> FetchResult<ItemDetail> {
        let summary = self.get_summary(project, article).await?;
        let media = self.get_media(project, article).await?;

        Ok(ItemDetail {
            article: article.to_string(),
            title: summary.titles.normalized,
            extract: summary.extract,
            page_url: summary.content_urls.desktop.page,
            media: media.into_media_refs(),
            retrieved_at: Utc::now(),
        })
    }
}

/// Appends path segments to `base`, percent-encoding each one
fn join_segments(base: &str, segments: &[&str]) -> FetchResult<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| FetchError::Url(ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
