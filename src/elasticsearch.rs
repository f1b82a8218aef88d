//! Elasticsearch [`SearchIndex`] over the REST API.
//!
//! Uses plain `reqwest` calls with basic auth:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | probe | `GET /` |
//! | exists | `HEAD /{index}` |
//! | delete | `DELETE /{index}` |
//! | create | `PUT /{index}` with the mapping body |
//! | index_document | `POST /{index}/_doc?refresh=true` |
//! | search | `POST /{index}/_search` with a `multi_match` query |
//! | count | `GET /{index}/_count` |
//!
//! [`connect_engine`] probes the cluster at startup, trying plain HTTP
//! before HTTPS on every attempt, and gives up after the configured number
//! of attempts so callers can fall back to the page store.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use wikiseek_core::error::IndexError;
use wikiseek_core::index::{IndexSchema, SearchIndex, QUERY_FIELDS};
use wikiseek_core::models::PageDocument;

use crate::config::SearchEngineConfig;

/// A single Elasticsearch index reachable at `base_url`.
#[derive(Clone)]
pub struct ElasticsearchIndex {
    client: reqwest::Client,
    base_url: String,
    index: String,
    username: String,
    password: String,
}

impl ElasticsearchIndex {
    pub fn new(base_url: impl Into<String>, config: &SearchEngineConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            index: config.index.clone(),
            username: config.username.clone(),
            password: config.resolved_password(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .basic_auth(&self.username, Some(&self.password))
    }

    fn index_path(&self, suffix: &str) -> String {
        format!("/{}{}", self.index, suffix)
    }

    /// `GET /`: succeeds when the cluster answers with a success status.
    pub async fn ping(&self) -> Result<(), IndexError> {
        let response = send(self.request(Method::GET, "/")).await?;
        check(response).await.map(|_| ())
    }
}

async fn send(request: RequestBuilder) -> Result<Response, IndexError> {
    request
        .send()
        .await
        .map_err(|e| IndexError::Transport(e.to_string()))
}

/// Turn a non-success response into [`IndexError::Status`].
async fn check(response: Response) -> Result<Response, IndexError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(IndexError::Status {
        status: status.as_u16(),
        body,
    })
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Deserialize)]
struct HitsEnvelope {
    hits: Vec<Hit>,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: PageDocument,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

/// Query body for the weighted multi-field search.
pub fn search_body(query: &str, size: usize) -> serde_json::Value {
    json!({
        "size": size,
        "query": {
            "multi_match": {
                "query": query,
                "fields": QUERY_FIELDS,
            }
        }
    })
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    fn name(&self) -> &str {
        &self.index
    }

    async fn exists(&self) -> Result<bool, IndexError> {
        let response = send(self.request(Method::HEAD, &self.index_path(""))).await?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(IndexError::Status {
                status: status.as_u16(),
                body: String::new(),
            }),
        }
    }

    async fn delete(&self) -> Result<(), IndexError> {
        let response = send(self.request(Method::DELETE, &self.index_path(""))).await?;
        check(response).await?;
        Ok(())
    }

    async fn create(&self, schema: &IndexSchema) -> Result<(), IndexError> {
        let response = send(
            self.request(Method::PUT, &self.index_path(""))
                .json(&schema.to_mapping()),
        )
        .await?;
        check(response).await?;
        Ok(())
    }

    async fn index_document(&self, doc: &PageDocument) -> Result<(), IndexError> {
        let response = send(
            self.request(Method::POST, &self.index_path("/_doc"))
                .query(&[("refresh", "true")])
                .json(doc),
        )
        .await?;
        check(response).await?;
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PageDocument>, IndexError> {
        let response = send(
            self.request(Method::POST, &self.index_path("/_search"))
                .json(&search_body(query, limit)),
        )
        .await?;
        let parsed: SearchResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| IndexError::Malformed(e.to_string()))?;
        Ok(parsed.hits.hits.into_iter().map(|h| h.source).collect())
    }

    async fn count(&self) -> Result<u64, IndexError> {
        let response = send(self.request(Method::GET, &self.index_path("/_count"))).await?;
        let parsed: CountResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| IndexError::Malformed(e.to_string()))?;
        Ok(parsed.count)
    }
}

/// Probe the configured cluster and return a connected index handle.
///
/// Each attempt tries `http://host:port` and then `https://host:port`.
/// Returns `None` once every attempt has failed.
pub async fn connect_engine(config: &SearchEngineConfig) -> Option<ElasticsearchIndex> {
    for attempt in 1..=config.connect_retries {
        for scheme in ["http", "https"] {
            let base_url = format!("{}://{}:{}", scheme, config.host, config.port);
            let index = match ElasticsearchIndex::new(base_url.as_str(), config) {
                Ok(i) => i,
                Err(e) => {
                    warn!(%base_url, error = %e, "error creating search engine client");
                    continue;
                }
            };
            match index.ping().await {
                Ok(()) => {
                    info!(%base_url, "connected to search engine");
                    return Some(index);
                }
                Err(e) => debug!(%base_url, error = %e, "search engine probe failed"),
            }
        }

        if attempt < config.connect_retries {
            warn!(
                attempt,
                max = config.connect_retries,
                delay_secs = config.retry_delay_secs,
                "could not connect to search engine, retrying"
            );
            tokio::time::sleep(config.retry_delay()).await;
        }
    }

    warn!(
        attempts = config.connect_retries,
        "failed to connect to search engine, continuing with the page store fallback"
    );
    None
}
