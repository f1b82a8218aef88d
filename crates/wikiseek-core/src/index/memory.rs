//! In-memory [`SearchIndex`] for tests.
//!
//! Scoring is a weighted count of case-insensitive query-word occurrences
//! (title ×3, url ×2, content ×1), enough to exercise engine ordering.
//! The index can be switched into a failing mode to simulate an outage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::IndexError;
use crate::models::PageDocument;

use super::{IndexSchema, SearchIndex};

pub struct InMemoryIndex {
    name: String,
    /// `None` while the index is absent.
    docs: RwLock<Option<Vec<PageDocument>>>,
    failing: AtomicBool,
    rejected_url: RwLock<Option<String>>,
}

impl InMemoryIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: RwLock::new(None),
            failing: AtomicBool::new(false),
            rejected_url: RwLock::new(None),
        }
    }

    /// Every call fails with a transport error while set.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Reject `index_document` for the document with this URL.
    pub fn reject_url(&self, url: impl Into<String>) {
        if let Ok(mut rejected) = self.rejected_url.write() {
            *rejected = Some(url.into());
        }
    }

    /// Seed documents directly, creating the index if needed.
    pub fn seed(&self, docs: Vec<PageDocument>) {
        if let Ok(mut guard) = self.docs.write() {
            guard.get_or_insert_with(Vec::new).extend(docs);
        }
    }

    fn check(&self) -> Result<(), IndexError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(IndexError::Transport("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

fn poisoned() -> IndexError {
    IndexError::Transport("in-memory index lock poisoned".to_string())
}

fn missing(name: &str) -> IndexError {
    IndexError::Status {
        status: 404,
        body: format!("no such index [{}]", name),
    }
}

fn occurrences(haystack: &str, words: &[String]) -> usize {
    let haystack = haystack.to_lowercase();
    words.iter().map(|w| haystack.matches(w.as_str()).count()).sum()
}

#[async_trait]
impl SearchIndex for InMemoryIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self) -> Result<bool, IndexError> {
        self.check()?;
        Ok(self.docs.read().map_err(|_| poisoned())?.is_some())
    }

    async fn delete(&self) -> Result<(), IndexError> {
        self.check()?;
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        if docs.take().is_none() {
            return Err(missing(&self.name));
        }
        Ok(())
    }

    async fn create(&self, _schema: &IndexSchema) -> Result<(), IndexError> {
        self.check()?;
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        if docs.is_some() {
            return Err(IndexError::Status {
                status: 400,
                body: format!("index [{}] already exists", self.name),
            });
        }
        *docs = Some(Vec::new());
        Ok(())
    }

    async fn index_document(&self, doc: &PageDocument) -> Result<(), IndexError> {
        self.check()?;
        let rejected = self.rejected_url.read().map_err(|_| poisoned())?.clone();
        if rejected.as_deref() == Some(doc.url.as_str()) {
            return Err(IndexError::Status {
                status: 400,
                body: "mapper_parsing_exception".to_string(),
            });
        }
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        // Indexing into a missing index auto-creates it, as Elasticsearch does.
        docs.get_or_insert_with(Vec::new).push(doc.clone());
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PageDocument>, IndexError> {
        self.check()?;
        let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        let docs = self.docs.read().map_err(|_| poisoned())?;
        let docs = docs.as_ref().ok_or_else(|| missing(&self.name))?;

        let mut scored: Vec<(usize, &PageDocument)> = docs
            .iter()
            .map(|d| {
                let score = 3 * occurrences(&d.title, &words)
                    + 2 * occurrences(&d.url, &words)
                    + occurrences(&d.content, &words);
                (score, d)
            })
            .filter(|(score, _)| *score > 0)
            .collect();
        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, d)| d.clone())
            .collect())
    }

    async fn count(&self) -> Result<u64, IndexError> {
        self.check()?;
        let docs = self.docs.read().map_err(|_| poisoned())?;
        docs.as_ref()
            .map(|d| d.len() as u64)
            .ok_or_else(|| missing(&self.name))
    }
}
