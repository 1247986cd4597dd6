use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use docsearch_core::snippet::{render, MAX_FRAGMENTS};
use docsearch_core::{DocId, Document, Index, SearchRequest, Tag};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

const DOCX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Serialize)]
pub struct SearchHit<'a> {
    #[serde(flatten)]
    pub document: &'a Document,
    #[serde(rename = "areaLabel")]
    pub area_label: String,
    pub score: f32,
    pub snippet: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<Index>,
}

pub fn build_app(index: Index, static_dir: Option<PathBuf>) -> Router {
    let app_state = AppState { index: Arc::new(index) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<HeaderValue> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let mut app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/tags", get(tags_handler))
        .route("/search", post(search_handler))
        .route("/download/:id", get(download_handler))
        .with_state(app_state);
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }
    app.layer(cors).layer(TraceLayer::new_for_http())
}

pub async fn tags_handler(State(state): State<AppState>) -> Json<Vec<Tag>> {
    Json(state.index.tags().into_iter().cloned().collect())
}

pub async fn search_handler(State(state): State<AppState>, Json(request): Json<SearchRequest>) -> Response {
    // snippets are always rendered
    let request = request.with_locations();
    let hits = match state.index.search(&request) {
        Ok(hits) => hits,
        Err(err) => {
            tracing::error!(error = %err, "search failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    };
    let results: Vec<SearchHit<'_>> = hits
        .iter()
        .map(|hit| SearchHit {
            document: hit.document,
            area_label: hit.document.area_label(),
            score: hit.score,
            snippet: render(&hit.document.content, &hit.locations, MAX_FRAGMENTS),
        })
        .collect();
    Json(results).into_response()
}

pub async fn download_handler(State(state): State<AppState>, Path(id): Path<DocId>) -> Response {
    let Some(doc) = state.index.document(id) else {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    };
    match tokio::fs::read(&doc.path).await {
        Ok(bytes) => {
            let disposition = format!("attachment; filename=\"{}\"", doc.file_name().replace('"', ""));
            (
                [
                    (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(path = %doc.path.display(), error = %err, "cannot read document");
            (StatusCode::INTERNAL_SERVER_ERROR, "cannot read document").into_response()
        }
    }
}

/// Builds the index over `data_dir` and wraps it in the router.
pub fn build_from_corpus(data_dir: &str, static_dir: Option<PathBuf>) -> Result<Router> {
    let (index, report) = Index::build(data_dir, &docsearch_core::BuildOptions::default())?;
    tracing::info!(indexed = report.indexed, skipped = report.skipped.len(), "corpus loaded");
    Ok(build_app(index, static_dir))
}
