//! Backend selection for the query dispatcher.
//!
//! The engine is probed once. A reachable engine gets its index created
//! if it does not exist yet, so engine queries never hit a missing index
//! before the first sync.

use std::sync::Arc;

use tracing::{info, warn};

use wikiseek_core::index::{IndexSchema, SearchIndex};
use wikiseek_core::search::{DispatchParams, QueryDispatcher, SearchBackend};
use wikiseek_core::store::PageStore;

use crate::config::Config;
use crate::elasticsearch::connect_engine;

/// Probe the engine and pick where queries are answered.
pub async fn select_backend(config: &Config, store: Arc<dyn PageStore>) -> SearchBackend {
    match connect_engine(&config.search_engine).await {
        Some(index) => {
            ensure_index(&index).await;
            SearchBackend::Engine(Arc::new(index))
        }
        None => SearchBackend::Fallback(store),
    }
}

/// Create the index when it is absent. Failures are logged only.
pub async fn ensure_index(index: &dyn SearchIndex) {
    match index.exists().await {
        Ok(true) => {}
        Ok(false) => match index.create(&IndexSchema::pages()).await {
            Ok(()) => info!(index = index.name(), "created search index"),
            Err(e) => warn!(index = index.name(), error = %e, "error creating search index"),
        },
        Err(e) => warn!(index = index.name(), error = %e, "error checking search index"),
    }
}

pub fn dispatch_params(config: &Config) -> DispatchParams {
    DispatchParams {
        max_results: config.search.max_results,
        snippet_chars: config.search.snippet_chars,
    }
}

/// Build a dispatcher whose backend is fixed for its lifetime.
pub async fn build_dispatcher(config: &Config, store: Arc<dyn PageStore>) -> QueryDispatcher {
    let backend = select_backend(config, store).await;
    info!(backend = backend.kind(), "search backend selected");
    QueryDispatcher::new(backend, dispatch_params(config))
}
