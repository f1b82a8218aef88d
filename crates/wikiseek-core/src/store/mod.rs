//! Storage abstraction for pages and the processed-term ledger.
//!
//! The [`PageStore`] and [`TermLedger`] traits define every relational
//! operation the pipeline needs, so the resolver, synchronizer and
//! dispatcher run unchanged over SQLite or the in-memory store.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::models::Page;

/// Persistent page storage keyed by URL.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`upsert_page`](PageStore::upsert_page) | Insert or overwrite a page by URL |
/// | [`get_page`](PageStore::get_page) | Look up a page by URL |
/// | [`list_pages`](PageStore::list_pages) | Every page, in storage order |
/// | [`count_pages`](PageStore::count_pages) | Number of stored pages |
/// | [`search_content`](PageStore::search_content) | Case-sensitive substring scan of content |
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Insert a page, or overwrite title, content and language of the page
    /// with the same URL. `last_updated` is always set to the write time.
    ///
    /// Fails with [`PageError`](crate::error::PageError) (wrapped in
    /// `anyhow`) when url, title or content is empty. Nothing is written
    /// in that case.
    async fn upsert_page(&self, page: &Page) -> Result<()>;

    async fn get_page(&self, url: &str) -> Result<Option<Page>>;

    /// All pages in storage (insertion) order.
    async fn list_pages(&self) -> Result<Vec<Page>>;

    async fn count_pages(&self) -> Result<i64>;

    /// Pages whose content contains `needle`, compared case-sensitively,
    /// in storage order.
    async fn search_content(&self, needle: &str) -> Result<Vec<Page>>;
}

/// Durable record of which terms have already been ingested.
#[async_trait]
pub trait TermLedger: Send + Sync {
    async fn is_processed(&self, term: &str) -> Result<bool>;

    /// Records `term`. Marking an already recorded term succeeds and
    /// changes nothing.
    async fn mark_processed(&self, term: &str) -> Result<()>;
}

/// Fail-open ledger read: a read error counts as "not processed".
pub async fn already_processed(ledger: &dyn TermLedger, term: &str) -> bool {
    match ledger.is_processed(term).await {
        Ok(processed) => processed,
        Err(e) => {
            warn!(term, error = %e, "ledger read failed, treating term as unprocessed");
            false
        }
    }
}
