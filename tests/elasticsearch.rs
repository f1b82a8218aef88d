//! Elasticsearch client and index rebuild against a throwaway axum server
//! that speaks the subset of the REST API the client uses.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, head, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use wikiseek::backend::build_dispatcher;
use wikiseek::config::{parse_config, Config};
use wikiseek::elasticsearch::{connect_engine, ElasticsearchIndex};
use wikiseek::sqlite_store::SqliteStore;
use wikiseek::{db, migrate};
use wikiseek_core::error::IndexError;
use wikiseek_core::index::SearchIndex;
use wikiseek_core::models::Page;
use wikiseek_core::store::PageStore;
use wikiseek_core::sync::{FullRebuild, SyncStrategy};

#[derive(Default)]
struct MockEs {
    /// `None` while the index does not exist.
    docs: Option<Vec<Value>>,
    mapping: Option<Value>,
    requests: Vec<String>,
    last_search: Option<Value>,
    reject_url: Option<String>,
}

type Shared = Arc<Mutex<MockEs>>;

fn record(state: &Shared, line: String) {
    state.lock().unwrap().requests.push(line);
}

async fn root(State(state): State<Shared>) -> Json<Value> {
    record(&state, "GET /".to_string());
    Json(json!({ "version": { "number": "8.12.0" } }))
}

async fn index_head(State(state): State<Shared>, Path(index): Path<String>) -> StatusCode {
    record(&state, format!("HEAD /{}", index));
    if state.lock().unwrap().docs.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn index_delete(State(state): State<Shared>, Path(index): Path<String>) -> StatusCode {
    record(&state, format!("DELETE /{}", index));
    let mut guard = state.lock().unwrap();
    if guard.docs.take().is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn index_create(
    State(state): State<Shared>,
    Path(index): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    record(&state, format!("PUT /{}", index));
    let mut guard = state.lock().unwrap();
    if guard.docs.is_some() {
        return StatusCode::BAD_REQUEST;
    }
    guard.docs = Some(Vec::new());
    guard.mapping = Some(body);
    StatusCode::OK
}

async fn doc_post(
    State(state): State<Shared>,
    Path(index): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    Json(doc): Json<Value>,
) -> impl IntoResponse {
    let refresh = params.get("refresh").cloned().unwrap_or_default();
    record(&state, format!("POST /{}/_doc?refresh={}", index, refresh));
    let mut guard = state.lock().unwrap();
    if guard.reject_url.as_deref() == doc["url"].as_str() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "mapper_parsing_exception" })));
    }
    guard.docs.get_or_insert_with(Vec::new).push(doc);
    (StatusCode::CREATED, Json(json!({ "result": "created" })))
}

async fn search_post(
    State(state): State<Shared>,
    Path(index): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record(&state, format!("POST /{}/_search", index));
    let mut guard = state.lock().unwrap();
    guard.last_search = Some(body.clone());
    let Some(docs) = guard.docs.as_ref() else {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "index_not_found_exception" })));
    };

    let query = body["query"]["multi_match"]["query"]
        .as_str()
        .unwrap_or_default()
        .to_lowercase();
    let size = body["size"].as_u64().unwrap_or(10) as usize;
    let hits: Vec<Value> = docs
        .iter()
        .filter(|d| {
            let title = d["title"].as_str().unwrap_or_default().to_lowercase();
            let content = d["content"].as_str().unwrap_or_default().to_lowercase();
            title.contains(&query) || content.contains(&query)
        })
        .take(size)
        .map(|d| json!({ "_index": index, "_score": 1.0, "_source": d }))
        .collect();
    (StatusCode::OK, Json(json!({ "hits": { "hits": hits } })))
}

async fn count_get(State(state): State<Shared>, Path(index): Path<String>) -> impl IntoResponse {
    record(&state, format!("GET /{}/_count", index));
    match state.lock().unwrap().docs.as_ref() {
        Some(docs) => (StatusCode::OK, Json(json!({ "count": docs.len() }))),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "index_not_found_exception" }))),
    }
}

async fn spawn_mock(state: Shared) -> u16 {
    let app = Router::new()
        .route("/", get(root))
        .route(
            "/{index}",
            head(index_head).delete(index_delete).put(index_create),
        )
        .route("/{index}/_doc", post(doc_post))
        .route("/{index}/_search", post(search_post))
        .route("/{index}/_count", get(count_get))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

fn config_for(tmp: &TempDir, port: u16) -> Config {
    parse_config(&format!(
        r#"[db]
path = "{}/data/wikiseek.sqlite"

[search_engine]
host = "127.0.0.1"
port = {}
password = "secret"
connect_retries = 1
retry_delay_secs = 0
timeout_secs = 5
"#,
        tmp.path().display(),
        port
    ))
    .unwrap()
}

async fn seeded_store(config: &Config, pages: &[(&str, &str, &str)]) -> SqliteStore {
    let pool = db::connect(config).await.unwrap();
    migrate::create_schema(&pool).await.unwrap();
    let store = SqliteStore::new(pool);
    for (url, title, content) in pages {
        store
            .upsert_page(&Page::new(*url, *title, *content, "en"))
            .await
            .unwrap();
    }
    store
}

const PAGES: &[(&str, &str, &str)] = &[
    (
        "https://en.wikipedia.org/wiki/Rust_(programming_language)",
        "Rust (programming language)",
        "Rust is a general-purpose programming language.\n",
    ),
    (
        "https://da.wikipedia.org/wiki/Golang",
        "Go (programmeringssprog)",
        "Go er et programmeringssprog.\n",
    ),
    (
        "https://en.wikipedia.org/wiki/Elasticsearch",
        "Elasticsearch",
        "Elasticsearch is a search engine based on Lucene.\n",
    ),
];

fn stale_docs(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| json!({ "title": format!("Stale {}", i), "url": format!("/stale/{}", i), "content": "old" }))
        .collect()
}

#[tokio::test]
async fn test_sync_into_absent_index() {
    let tmp = TempDir::new().unwrap();
    let mock = Shared::default();
    let port = spawn_mock(mock.clone()).await;
    let config = config_for(&tmp, port);
    let store = seeded_store(&config, PAGES).await;

    let index = connect_engine(&config.search_engine).await.unwrap();
    let report = FullRebuild::default().sync(&store, &index).await.unwrap();

    assert_eq!(report.indexed, 3);
    assert_eq!(report.failed, 0);
    assert!(!report.recreated);
    assert_eq!(index.count().await.unwrap(), 3);

    let guard = mock.lock().unwrap();
    let mapping = guard.mapping.as_ref().unwrap();
    assert_eq!(mapping["mappings"]["properties"]["url"]["type"], "keyword");
    assert_eq!(mapping["mappings"]["properties"]["title"]["type"], "text");
    assert_eq!(mapping["mappings"]["properties"]["last_updated"]["type"], "date");
    assert!(!guard.requests.contains(&"DELETE /pages".to_string()));
    let doc_posts: Vec<&String> = guard
        .requests
        .iter()
        .filter(|r| r.starts_with("POST /pages/_doc"))
        .collect();
    assert_eq!(doc_posts.len(), 3);
    assert!(doc_posts.iter().all(|r| r.ends_with("refresh=true")));

    let docs = guard.docs.as_ref().unwrap();
    assert_eq!(docs[0]["url"], PAGES[0].0);
    assert_eq!(docs[0]["language"], "en");
}

#[tokio::test]
async fn test_sync_replaces_stale_index() {
    let tmp = TempDir::new().unwrap();
    let mock = Shared::default();
    mock.lock().unwrap().docs = Some(stale_docs(5));
    let port = spawn_mock(mock.clone()).await;
    let config = config_for(&tmp, port);
    let store = seeded_store(&config, PAGES).await;

    let index = connect_engine(&config.search_engine).await.unwrap();
    let report = FullRebuild::default().sync(&store, &index).await.unwrap();

    assert!(report.recreated);
    assert_eq!(index.count().await.unwrap(), 3);

    let guard = mock.lock().unwrap();
    let order: Vec<&str> = guard
        .requests
        .iter()
        .map(String::as_str)
        .filter(|r| matches!(*r, "HEAD /pages" | "DELETE /pages" | "PUT /pages"))
        .collect();
    assert_eq!(order, vec!["HEAD /pages", "DELETE /pages", "PUT /pages"]);
    assert!(guard
        .docs
        .as_ref()
        .unwrap()
        .iter()
        .all(|d| d["content"] != "old"));
}

#[tokio::test]
async fn test_sync_into_existing_empty_index() {
    let tmp = TempDir::new().unwrap();
    let mock = Shared::default();
    mock.lock().unwrap().docs = Some(Vec::new());
    let port = spawn_mock(mock.clone()).await;
    let config = config_for(&tmp, port);
    let store = seeded_store(&config, PAGES).await;

    let index = connect_engine(&config.search_engine).await.unwrap();
    let report = FullRebuild::default().sync(&store, &index).await.unwrap();

    assert!(report.recreated);
    assert_eq!(report.indexed, 3);
    assert_eq!(index.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_rejected_document_is_counted_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let mock = Shared::default();
    mock.lock().unwrap().reject_url = Some(PAGES[1].0.to_string());
    let port = spawn_mock(mock.clone()).await;
    let config = config_for(&tmp, port);
    let store = seeded_store(&config, PAGES).await;

    let index = connect_engine(&config.search_engine).await.unwrap();
    let report = FullRebuild::default().sync(&store, &index).await.unwrap();

    assert_eq!(report.indexed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(index.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_exists_and_count_on_missing_index() {
    let tmp = TempDir::new().unwrap();
    let port = spawn_mock(Shared::default()).await;
    let config = config_for(&tmp, port);

    let index =
        ElasticsearchIndex::new(format!("http://127.0.0.1:{}", port), &config.search_engine)
            .unwrap();
    index.ping().await.unwrap();
    assert!(!index.exists().await.unwrap());
    match index.count().await {
        Err(IndexError::Status { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected 404 status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_search_request_shape() {
    let tmp = TempDir::new().unwrap();
    let mock = Shared::default();
    let port = spawn_mock(mock.clone()).await;
    let config = config_for(&tmp, port);
    let store = seeded_store(&config, PAGES).await;

    let index = connect_engine(&config.search_engine).await.unwrap();
    FullRebuild::default().sync(&store, &index).await.unwrap();

    let docs = index.search("lucene", 5).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].title, "Elasticsearch");

    let guard = mock.lock().unwrap();
    let body = guard.last_search.as_ref().unwrap();
    assert_eq!(body["size"], 5);
    assert_eq!(body["query"]["multi_match"]["query"], "lucene");
    assert_eq!(
        body["query"]["multi_match"]["fields"],
        json!(["title^3", "url^2", "content"])
    );
}

#[tokio::test]
async fn test_unreachable_engine_yields_none() {
    let tmp = TempDir::new().unwrap();
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = config_for(&tmp, port);
    assert!(connect_engine(&config.search_engine).await.is_none());
}

#[tokio::test]
async fn test_dispatcher_uses_engine_when_reachable() {
    let tmp = TempDir::new().unwrap();
    let mock = Shared::default();
    let port = spawn_mock(mock.clone()).await;
    let config = config_for(&tmp, port);
    let store = Arc::new(seeded_store(&config, PAGES).await);

    let dispatcher = build_dispatcher(&config, store.clone()).await;
    assert_eq!(dispatcher.backend().kind(), "engine");
    // The missing index was created during selection.
    assert!(mock.lock().unwrap().docs.is_some());
    assert!(dispatcher.search("rust").await.unwrap().is_empty());

    let index = connect_engine(&config.search_engine).await.unwrap();
    FullRebuild::default()
        .sync(store.as_ref(), &index)
        .await
        .unwrap();

    let hits = dispatcher.search("rust").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].url, PAGES[0].0);
    assert!(hits[0].snippet.contains("Rust"));
}

#[tokio::test]
async fn test_dispatcher_falls_back_when_unreachable() {
    let tmp = TempDir::new().unwrap();
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = config_for(&tmp, port);
    let store = Arc::new(
        seeded_store(&config, &[("/test-url", "TestTitle", "Some TestContent here")]).await,
    );

    let dispatcher = build_dispatcher(&config, store).await;
    assert_eq!(dispatcher.backend().kind(), "fallback");

    let hits = dispatcher.search("TestContent").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "TestTitle");
    assert!(dispatcher.search("testcontent").await.unwrap().is_empty());
}
