//! Query HTTP server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/search?q=<text>` | Search pages |
//! | `POST` | `/api/search` | Search pages, body `{"q": "<text>"}` |
//! | `GET`  | `/health` | Health check (version and backend) |
//!
//! Every accepted query is appended to the search log, which is where the
//! next ingestion pass finds its terms.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query parameter 'q' is required" } }
//! ```
//!
//! Error codes: `bad_request` (400), `internal` (500). Internal errors carry
//! a generic message; the cause is logged.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use wikiseek_core::models::SearchHit;
use wikiseek_core::search::QueryDispatcher;

use crate::backend::build_dispatcher;
use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteStore;
use crate::terms::append_query;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    dispatcher: QueryDispatcher,
    log_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(dispatcher: QueryDispatcher, log_path: PathBuf) -> Self {
        Self {
            dispatcher,
            log_path: Arc::new(log_path),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/search", get(handle_search_get).post(handle_search_post))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Starts the query server on `[server].bind`. The search backend is
/// selected once, before the listener is bound.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::create_schema(&pool).await?;
    let store = Arc::new(SqliteStore::new(pool));

    let dispatcher = build_dispatcher(config, store).await;
    let state = AppState::new(dispatcher, config.ingest.log_path.clone());

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "query server listening");
    println!("Query server listening on http://{}", config.server.bind);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    backend: String,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.dispatcher.backend().kind().to_string(),
    })
}

// ============ /api/search ============

#[derive(Deserialize, Default)]
struct SearchParams {
    #[serde(default)]
    q: Option<String>,
}

#[derive(Serialize)]
struct SearchResponse {
    query: String,
    backend: String,
    results: Vec<SearchHit>,
}

async fn handle_search_get(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    answer(&state, params.q).await
}

async fn handle_search_post(
    State(state): State<AppState>,
    Json(params): Json<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    answer(&state, params.q).await
}

async fn answer(state: &AppState, q: Option<String>) -> Result<Json<SearchResponse>, AppError> {
    let query = q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(bad_request("query parameter 'q' is required"));
    }

    if let Err(e) = append_query(&state.log_path, &query).await {
        warn!(error = %e, "error writing to search log");
    }

    let results = state.dispatcher.search(&query).await.map_err(|e| {
        error!(query = %query, error = %e, "search failed");
        internal("search failed")
    })?;

    Ok(Json(SearchResponse {
        backend: state.dispatcher.backend().kind().to_string(),
        query,
        results,
    }))
}
