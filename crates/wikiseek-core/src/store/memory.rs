//! In-memory [`PageStore`] and [`TermLedger`] for tests and embedding.
//!
//! Pages live in a `Vec` so storage order matches insertion order, the way
//! SQLite rowids do. Behind `std::sync::RwLock` for thread safety.

use std::collections::HashSet;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use crate::models::Page;

use super::{PageStore, TermLedger};

/// In-memory store for tests.
pub struct InMemoryStore {
    pages: RwLock<Vec<Page>>,
    terms: RwLock<HashSet<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            pages: RwLock::new(Vec::new()),
            terms: RwLock::new(HashSet::new()),
        }
    }

    /// Number of recorded ledger terms.
    pub fn processed_count(&self) -> usize {
        self.terms.read().map(|t| t.len()).unwrap_or(0)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl PageStore for InMemoryStore {
    async fn upsert_page(&self, page: &Page) -> Result<()> {
        page.validate()?;
        let mut pages = self.pages.write().map_err(|_| poisoned())?;
        let mut stored = page.clone();
        stored.last_updated = Utc::now();
        match pages.iter_mut().find(|p| p.url == page.url) {
            Some(existing) => *existing = stored,
            None => pages.push(stored),
        }
        Ok(())
    }

    async fn get_page(&self, url: &str) -> Result<Option<Page>> {
        let pages = self.pages.read().map_err(|_| poisoned())?;
        Ok(pages.iter().find(|p| p.url == url).cloned())
    }

    async fn list_pages(&self) -> Result<Vec<Page>> {
        Ok(self.pages.read().map_err(|_| poisoned())?.clone())
    }

    async fn count_pages(&self) -> Result<i64> {
        Ok(self.pages.read().map_err(|_| poisoned())?.len() as i64)
    }

    async fn search_content(&self, needle: &str) -> Result<Vec<Page>> {
        let pages = self.pages.read().map_err(|_| poisoned())?;
        Ok(pages
            .iter()
            .filter(|p| p.content.contains(needle))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TermLedger for InMemoryStore {
    async fn is_processed(&self, term: &str) -> Result<bool> {
        Ok(self.terms.read().map_err(|_| poisoned())?.contains(term))
    }

    async fn mark_processed(&self, term: &str) -> Result<()> {
        self.terms
            .write()
            .map_err(|_| poisoned())?
            .insert(term.to_string());
        Ok(())
    }
}
