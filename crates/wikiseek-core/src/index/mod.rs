//! Search-engine index abstraction.
//!
//! [`SearchIndex`] exposes the handful of index operations the
//! synchronizer and the dispatcher need: existence check, delete, create
//! with a schema, single-document indexing with immediate visibility,
//! relevance search and a document count. The Elasticsearch client in the
//! `wikiseek` crate and [`memory::InMemoryIndex`] implement it.

pub mod memory;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::error::IndexError;
use crate::models::PageDocument;

/// Lifecycle state of the target index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    IndexAbsent,
    IndexPresent,
}

impl IndexState {
    pub fn from_exists(exists: bool) -> Self {
        if exists {
            IndexState::IndexPresent
        } else {
            IndexState::IndexAbsent
        }
    }
}

/// How a field is indexed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Analyzed for relevance search.
    FullText,
    /// Matched exactly, not analyzed.
    Keyword,
    Date,
}

impl FieldKind {
    fn mapping_type(self) -> &'static str {
        match self {
            FieldKind::FullText => "text",
            FieldKind::Keyword => "keyword",
            FieldKind::Date => "date",
        }
    }
}

/// Field layout of an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    pub fields: Vec<(&'static str, FieldKind)>,
}

impl IndexSchema {
    /// The fixed five-field page schema.
    pub fn pages() -> Self {
        Self {
            fields: vec![
                ("title", FieldKind::FullText),
                ("url", FieldKind::Keyword),
                ("content", FieldKind::FullText),
                ("language", FieldKind::Keyword),
                ("last_updated", FieldKind::Date),
            ],
        }
    }

    /// Elasticsearch index-creation body (`{"mappings": {"properties": ...}}`).
    pub fn to_mapping(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, kind)| (name.to_string(), json!({ "type": kind.mapping_type() })))
            .collect();
        json!({ "mappings": { "properties": properties } })
    }
}

/// Relevance weights for the multi-field query.
pub const QUERY_FIELDS: [&str; 3] = ["title^3", "url^2", "content"];

/// A search-engine index holding [`PageDocument`]s.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Index name (e.g. `"pages"`).
    fn name(&self) -> &str;

    async fn exists(&self) -> Result<bool, IndexError>;

    /// Drop the index and every document in it.
    async fn delete(&self) -> Result<(), IndexError>;

    async fn create(&self, schema: &IndexSchema) -> Result<(), IndexError>;

    /// Add one document; it is searchable as soon as this returns.
    async fn index_document(&self, doc: &PageDocument) -> Result<(), IndexError>;

    /// Multi-field relevance query over [`QUERY_FIELDS`], best match first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PageDocument>, IndexError>;

    async fn count(&self) -> Result<u64, IndexError>;

    /// Current lifecycle state.
    async fn state(&self) -> Result<IndexState, IndexError> {
        Ok(IndexState::from_exists(self.exists().await?))
    }
}
