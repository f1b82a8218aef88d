//! Index synchronization from the page store.
//!
//! [`SyncStrategy`] decouples how the engine is brought up to date from
//! the store and dispatcher contracts. [`FullRebuild`] is the only
//! strategy: the index is dropped, recreated and bulk-loaded on every run.
//!
//! # Rebuild protocol
//!
//! ```text
//!  IndexPresent ──Delete──▶ IndexAbsent ──Create──▶ IndexPresent ──load──▶ done
//!        ▲                       │
//!        └── exists? ────────────┘ (skip Delete when already absent)
//! ```
//!
//! Existence check, delete, create and reading the store are structural:
//! any failure aborts with [`SyncError`]. Documents that fail to index are
//! logged and counted; a later sync repairs them.
//!
//! Readers querying the engine while a rebuild runs can see a missing or
//! partially loaded index.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::index::{IndexSchema, IndexState, SearchIndex};
use crate::models::PageDocument;
use crate::store::PageStore;

/// Result of a completed sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Documents indexed successfully.
    pub indexed: usize,
    /// Documents the engine rejected.
    pub failed: usize,
    /// Whether an existing index was dropped first.
    pub recreated: bool,
}

/// Brings a search index in line with the page store.
#[async_trait]
pub trait SyncStrategy: Send + Sync {
    async fn sync(
        &self,
        store: &dyn PageStore,
        index: &dyn SearchIndex,
    ) -> Result<SyncReport, SyncError>;
}

/// Delete-and-recreate synchronization.
#[derive(Debug, Clone)]
pub struct FullRebuild {
    schema: IndexSchema,
}

impl FullRebuild {
    pub fn new(schema: IndexSchema) -> Self {
        Self { schema }
    }
}

impl Default for FullRebuild {
    fn default() -> Self {
        Self::new(IndexSchema::pages())
    }
}

#[async_trait]
impl SyncStrategy for FullRebuild {
    async fn sync(
        &self,
        store: &dyn PageStore,
        index: &dyn SearchIndex,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();

        let state = index.state().await.map_err(SyncError::ExistenceCheck)?;
        if state == IndexState::IndexPresent {
            info!(index = index.name(), "index exists, removing and rebuilding");
            index.delete().await.map_err(SyncError::Delete)?;
            report.recreated = true;
        }

        index.create(&self.schema).await.map_err(SyncError::Create)?;
        debug!(index = index.name(), "created index");

        let pages = store.list_pages().await.map_err(SyncError::Store)?;
        for page in &pages {
            let doc = PageDocument::from(page);
            match index.index_document(&doc).await {
                Ok(()) => {
                    debug!(url = %page.url, "indexed page");
                    report.indexed += 1;
                }
                Err(e) => {
                    warn!(url = %page.url, error = %e, "error indexing page");
                    report.failed += 1;
                }
            }
        }

        info!(
            index = index.name(),
            indexed = report.indexed,
            failed = report.failed,
            "synced pages to search index"
        );
        Ok(report)
    }
}
