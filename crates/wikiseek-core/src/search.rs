//! Query dispatch over the search engine or the page store.
//!
//! The backend is a capability fixed when the dispatcher is built:
//! [`SearchBackend::Engine`] when the engine answered the startup probe,
//! [`SearchBackend::Fallback`] otherwise. It is never re-probed per query.
//!
//! | Backend | Matching | Order | Limit |
//! |---------|----------|-------|-------|
//! | Engine | multi-field relevance (`title^3`, `url^2`, `content`) | engine score | `max_results` |
//! | Fallback | case-sensitive substring of `content` | storage order | none |

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::index::SearchIndex;
use crate::models::SearchHit;
use crate::store::PageStore;

/// Where queries are answered.
#[derive(Clone)]
pub enum SearchBackend {
    Engine(Arc<dyn SearchIndex>),
    Fallback(Arc<dyn PageStore>),
}

impl SearchBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            SearchBackend::Engine(_) => "engine",
            SearchBackend::Fallback(_) => "fallback",
        }
    }
}

/// Result shaping parameters.
#[derive(Debug, Clone, Copy)]
pub struct DispatchParams {
    /// Engine hit limit.
    pub max_results: usize,
    /// Snippet length in characters.
    pub snippet_chars: usize,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            max_results: 10,
            snippet_chars: 240,
        }
    }
}

/// Read-only query front end. Cheap to clone and safe to share.
#[derive(Clone)]
pub struct QueryDispatcher {
    backend: SearchBackend,
    params: DispatchParams,
}

impl QueryDispatcher {
    pub fn new(backend: SearchBackend, params: DispatchParams) -> Self {
        Self { backend, params }
    }

    pub fn backend(&self) -> &SearchBackend {
        &self.backend
    }

    /// Answer `query`. Zero matches is an empty list, not an error; a blank
    /// query short-circuits to an empty list.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        debug!(backend = self.backend.kind(), query, "dispatching search");

        let hits = match &self.backend {
            SearchBackend::Engine(index) => index
                .search(query, self.params.max_results)
                .await?
                .into_iter()
                .map(|doc| SearchHit {
                    snippet: make_snippet(&doc.content, query, self.params.snippet_chars),
                    title: doc.title,
                    url: doc.url,
                })
                .collect(),
            SearchBackend::Fallback(store) => store
                .search_content(query)
                .await?
                .into_iter()
                .map(|page| SearchHit {
                    snippet: make_snippet(&page.content, query, self.params.snippet_chars),
                    title: page.title,
                    url: page.url,
                })
                .collect(),
        };
        Ok(hits)
    }
}

/// Excerpt of `content` around the first case-insensitive occurrence of
/// `query`, or its leading characters when the query does not occur
/// verbatim. Newlines are collapsed to spaces.
pub fn make_snippet(content: &str, query: &str, max_chars: usize) -> String {
    let chars: Vec<char> = content.chars().collect();
    let start = find_char_offset(content, query)
        .map(|pos| {
            let centered = pos.saturating_sub(max_chars / 3);
            centered.min(chars.len().saturating_sub(max_chars))
        })
        .unwrap_or(0);
    let end = (start + max_chars).min(chars.len());

    let mut snippet: String = chars[start..end]
        .iter()
        .map(|c| if *c == '\n' || *c == '\r' { ' ' } else { *c })
        .collect();
    snippet = snippet.trim().to_string();
    if start > 0 {
        snippet.insert_str(0, "...");
    }
    if end < chars.len() {
        snippet.push_str("...");
    }
    snippet
}

/// Character offset of the first case-insensitive match of `needle`.
fn find_char_offset(haystack: &str, needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.trim().chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return None;
    }
    let hay: Vec<char> = haystack.chars().collect();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| {
        hay[i..i + needle.len()]
            .iter()
            .zip(&needle)
            .all(|(h, n)| h.to_lowercase().eq(std::iter::once(*n)))
    })
}
