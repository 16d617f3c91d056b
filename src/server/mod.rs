//! HTTP read API for the feed
//!
//! Routes:
//! - `GET /articles?project=en&offset=0&limit=20` returns a page of the
//!   project's feed, most viewed first
//! - `GET /healthz` returns `OK`

use crate::project::is_project;
use crate::storage::{ArticleStore, StoredArticle};
use crate::FeedError;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Largest page a single request may ask for
pub const MAX_LIMIT: u32 = 100;

const DEFAULT_LIMIT: u32 = 20;

#[derive(Clone)]
struct AppState {
    store: Arc<dyn ArticleStore>,
}

#[derive(Debug, Deserialize)]
struct ArticlesQuery {
    project: String,
    #[serde(default)]
    offset: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Body of a successful `/articles` response
#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    pub project: String,
    pub offset: u32,
    pub articles: Vec<StoredArticle>,
}

/// Errors returned to API clients as `{"error": "..."}`
#[derive(Debug)]
enum ApiError {
    UnknownProject(String),
    Store(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::UnknownProject(project) => (
                StatusCode::BAD_REQUEST,
                format!("{:?} is not a valid project", project),
            ),
            ApiError::Store(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Builds the API router over `store`
pub fn router(store: Arc<dyn ArticleStore>) -> Router {
    Router::new()
        .route("/articles", get(get_articles))
        .route("/healthz", get(healthz))
        .with_state(AppState { store })
}

async fn healthz() -> &'static str {
    "OK"
}

async fn get_articles(
    State(state): State<AppState>,
    Query(query): Query<ArticlesQuery>,
) -> Result<Json<ArticlesResponse>, ApiError> {
    let started = Instant::now();
    if !is_project(&query.project) {
        return Err(ApiError::UnknownProject(query.project));
    }

    let limit = query.limit.min(MAX_LIMIT);
    let articles = state
        .store
        .get_articles(&query.project, query.offset, limit)
        .await
        .map_err(|e| {
            tracing::error!("failed to read {} articles: {}", query.project, e);
            ApiError::Store(e.to_string())
        })?;

    tracing::info!(
        "{}?limit={}&offset={} - {} articles in {:.2?}",
        query.project,
        limit,
        query.offset,
        articles.len(),
        started.elapsed()
    );
    Ok(Json(ArticlesResponse {
        project: query.project,
        offset: query.offset,
        articles,
    }))
}

/// Serves the API on `addr` until `cancel` fires
///
/// # Returns
///
/// * `Ok(())` - The server shut down after cancellation
/// * `Err(FeedError)` - The address could not be bound or serving failed
pub async fn serve(
    store: Arc<dyn ArticleStore>,
    addr: SocketAddr,
    cancel: CancellationToken,
) -> Result<(), FeedError> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("serving on {}", listener.local_addr()?);

    axum::serve(listener, router(store))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}
