//! HTTP-level tests for the read API
//!
//! The router is exercised directly through `tower::ServiceExt::oneshot`
//! over an in-memory SQLite store, without opening sockets.

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt as _;
use wikifeed::server::{router, serve, MAX_LIMIT};
use wikifeed::{ArticleStore, FeedError, SqliteStorage, StoredArticle};

const BODY_LIMIT: usize = 1024 * 1024;

fn article(project: &str, name: &str, views: u64) -> StoredArticle {
    StoredArticle {
        project: project.to_string(),
        article: name.to_string(),
        title: name.replace('_', " "),
        abstract_text: format!("About {}", name),
        image_url: format!("https://upload.example.org/{}.jpg", name),
        thumbnail_url: format!("https://upload.example.org/{}_thumb.jpg", name),
        article_url: format!("https://{}.wikipedia.org/wiki/{}", project, name),
        daily_views: views,
        retrieved_at: Utc.with_ymd_and_hms(2024, 3, 2, 6, 0, 0).unwrap(),
    }
}

async fn seeded_router(rows: &[(&str, &str, u64)]) -> Router {
    let storage = SqliteStorage::new_in_memory().unwrap();
    for (project, name, views) in rows {
        storage
            .upsert_article(article(project, name, *views))
            .await
            .unwrap();
    }
    router(Arc::new(storage))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

fn article_names(body: &Value) -> Vec<&str> {
    body["articles"]
        .as_array()
        .expect("articles array")
        .iter()
        .map(|a| a["article"].as_str().expect("article name"))
        .collect()
}

#[tokio::test]
async fn test_healthz_returns_ok() {
    let app = seeded_router(&[]).await;

    let (status, bytes) = get(app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(bytes).unwrap().trim(), "OK");
}

#[tokio::test]
async fn test_articles_are_listed_most_viewed_first() {
    let app = seeded_router(&[
        ("en", "Rust", 500),
        ("en", "Go", 900),
        ("en", "Zig", 100),
        ("fr", "Paris", 10_000),
    ])
    .await;

    let (status, bytes) = get(app, "/articles?project=en").await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["project"], "en");
    assert_eq!(body["offset"], 0);
    assert_eq!(article_names(&body), vec!["Go", "Rust", "Zig"]);

    let first = &body["articles"][0];
    assert_eq!(first["title"], "Go");
    assert_eq!(first["abstract"], "About Go");
    assert_eq!(first["daily_views"], 900);
    assert_eq!(first["article_url"], "https://en.wikipedia.org/wiki/Go");
    assert!(first["retrieved_at"].as_str().unwrap().starts_with("2024-03-02T06:00:00"));
}

#[tokio::test]
async fn test_articles_offset_and_limit_page_through_the_feed() {
    let app = seeded_router(&[
        ("en", "A", 50),
        ("en", "B", 40),
        ("en", "C", 30),
        ("en", "D", 20),
        ("en", "E", 10),
    ])
    .await;

    let (status, bytes) = get(app.clone(), "/articles?project=en&offset=1&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["offset"], 1);
    assert_eq!(article_names(&body), vec!["B", "C"]);

    let (_, bytes) = get(app, "/articles?project=en&offset=10").await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(article_names(&body).is_empty());
}

#[tokio::test]
async fn test_articles_limit_is_clamped() {
    let rows: Vec<(String, u64)> = (0..MAX_LIMIT + 5)
        .map(|i| (format!("Article_{}", i), u64::from(i)))
        .collect();
    let storage = SqliteStorage::new_in_memory().unwrap();
    for (name, views) in &rows {
        storage.upsert_article(article("en", name, *views)).await.unwrap();
    }
    let app = router(Arc::new(storage));

    let uri = format!("/articles?project=en&limit={}", MAX_LIMIT * 10);
    let (status, bytes) = get(app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(article_names(&body).len(), MAX_LIMIT as usize);
}

#[tokio::test]
async fn test_unknown_project_is_rejected() {
    let app = seeded_router(&[("en", "Rust", 500)]).await;

    let (status, bytes) = get(app, "/articles?project=xx").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("xx"));
}

#[tokio::test]
async fn test_missing_project_is_rejected() {
    let app = seeded_router(&[("en", "Rust", 500)]).await;

    let (status, _) = get(app, "/articles").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_serve_stops_when_cancelled() {
    let storage = Arc::new(SqliteStorage::new_in_memory().unwrap());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let addr = "127.0.0.1:0".parse().unwrap();
    let result = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        serve(storage, addr, cancel),
    )
    .await
    .expect("server should stop after cancellation");
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_serve_reports_an_occupied_address() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap();

    let storage = Arc::new(SqliteStorage::new_in_memory().unwrap());
    let result = serve(storage, addr, CancellationToken::new()).await;
    assert!(matches!(result, Err(FeedError::Io(_))));
}
