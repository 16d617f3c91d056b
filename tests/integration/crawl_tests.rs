//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the Wikimedia REST API and run
//! full crawl passes against a SQLite database in a temporary directory.

use serde_json::json;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use wikifeed::config::{
    ApiConfig, Config, CrawlerConfig, DenylistConfig, OutputConfig, UserAgentConfig,
};
use wikifeed::storage::open_storage;
use wikifeed::{ArticleStore, Crawler, FeedError};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RANKING_PATH: &str =
    r"^/pageviews/metrics/pageviews/top/en\.wikipedia\.org/all-access/\d{4}/\d{2}/\d{2}$";

/// Creates a test configuration pointing both APIs at the mock server
fn create_test_config(base_url: &str, db_path: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            projects: vec!["en".to_string()],
            rate_limit_rps: 1000.0,
            rate_limit_burst: 50,
            ..CrawlerConfig::default()
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestFeed".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        api: ApiConfig {
            pageviews_url: format!("{}/pageviews", base_url),
            project_url_template: format!("{}/{{project}}/api/rest_v1", base_url),
        },
        output: OutputConfig {
            database_path: db_path.to_string_lossy().into_owned(),
        },
        denylist: DenylistConfig::default(),
    }
}

fn ranking_body(articles: &[(&str, u64)]) -> serde_json::Value {
    let articles: Vec<_> = articles
        .iter()
        .enumerate()
        .map(|(i, (article, views))| json!({"article": article, "views": views, "rank": i + 1}))
        .collect();
    json!({"items": [{"project": "en.wikipedia", "articles": articles}]})
}

async fn mount_article(server: &MockServer, article: &str, extract: &str, images: usize) {
    Mock::given(method("GET"))
        .and(path(format!("/en/api/rest_v1/page/summary/{}", article)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "titles": {"normalized": article.replace('_', " ")},
            "extract": extract,
            "content_urls": {"desktop": {"page": format!("https://en.wikipedia.org/wiki/{}", article)}}
        })))
        .mount(server)
        .await;

    let items: Vec<_> = (0..images)
        .map(|i| {
            json!({
                "type": "image",
                "original": {"source": format!("https://upload.example/{}_{}.jpg", article, i)},
                "thumbnail": {"source": format!("https://upload.example/{}_{}_320px.jpg", article, i)}
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/en/api/rest_v1/page/media/{}", article)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": items})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_project() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("feed.db");

    Mock::given(method("GET"))
        .and(path_regex(RANKING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(ranking_body(&[
            ("Main_Page", 9_000_000),
            ("Rust_(programming_language)", 52_000),
            ("Ferris", 31_000),
            ("Broken", 20_000),
            ("Special:Search", 10_000),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_article(&mock_server, "Rust_(programming_language)", "A language.", 2).await;
    mount_article(&mock_server, "Ferris", "", 1).await;

    Mock::given(method("GET"))
        .and(path("/en/api/rest_v1/page/summary/Broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/en/api/rest_v1/page/summary/Main_Page"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &db_path);
    let crawler = Crawler::from_config(&config).expect("Failed to build crawler");
    let report = crawler
        .crawl_once(&CancellationToken::new())
        .await
        .expect("Crawl failed");

    let en = &report.projects[0];
    assert_eq!(en.project, "en");
    assert_eq!(en.ranked, 5);
    assert_eq!(en.denied, 2);
    assert_eq!(en.fetched, 2);
    assert_eq!(en.fetch_failures, 1);
    assert_eq!(en.incomplete, 1);
    assert_eq!(en.written, 1);

    // Reopen the database file to check what was persisted
    let storage = open_storage(&db_path).expect("Failed to open storage");
    let rows = storage.get_articles("en", 0, 10).await.unwrap();
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row.article, "Rust_(programming_language)");
    assert_eq!(row.title, "Rust (programming language)");
    assert_eq!(row.abstract_text, "A language.");
    assert_eq!(row.daily_views, 52_000);
    assert_eq!(
        row.image_url,
        "https://upload.example/Rust_(programming_language)_0.jpg"
    );
    assert_eq!(
        row.thumbnail_url,
        "https://upload.example/Rust_(programming_language)_0_320px.jpg"
    );
    assert_eq!(
        row.article_url,
        "https://en.wikipedia.org/wiki/Rust_(programming_language)"
    );
}

#[tokio::test]
async fn test_repeated_crawl_keeps_one_row_per_article() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("feed.db");

    Mock::given(method("GET"))
        .and(path_regex(RANKING_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(ranking_body(&[("Alpha", 30), ("Beta", 20)])),
        )
        .mount(&mock_server)
        .await;
    mount_article(&mock_server, "Alpha", "First.", 1).await;
    mount_article(&mock_server, "Beta", "Second.", 1).await;

    let config = create_test_config(&mock_server.uri(), &db_path);
    let crawler = Crawler::from_config(&config).expect("Failed to build crawler");
    let cancel = CancellationToken::new();

    crawler.crawl_once(&cancel).await.expect("First crawl failed");
    crawler.crawl_once(&cancel).await.expect("Second crawl failed");

    let storage = crawler.store();
    assert_eq!(storage.count_articles("en").await.unwrap(), 2);
    let names: Vec<String> = storage
        .get_articles("en", 0, 10)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.article)
        .collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);
}

#[tokio::test]
async fn test_ranking_error_fails_crawl_without_writes() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("feed.db");

    Mock::given(method("GET"))
        .and(path_regex(RANKING_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/en/api/rest_v1/page/.*$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &db_path);
    let crawler = Crawler::from_config(&config).expect("Failed to build crawler");
    let result = crawler.crawl_once(&CancellationToken::new()).await;

    match result {
        Err(FeedError::Fetch(e)) => assert!(e.to_string().contains("500"), "{}", e),
        other => panic!("expected a fetch error, got {:?}", other),
    }
    assert_eq!(crawler.store().count_articles("en").await.unwrap(), 0);
}

#[tokio::test]
async fn test_empty_ranking_is_an_error() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("feed.db");

    Mock::given(method("GET"))
        .and(path_regex(RANKING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &db_path);
    let crawler = Crawler::from_config(&config).expect("Failed to build crawler");
    let result = crawler.crawl_once(&CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(FeedError::Fetch(wikifeed::FetchError::NoRanking { .. }))
    ));
}
