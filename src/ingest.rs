//! `ingest` and `terms` commands.
//!
//! An ingestion pass reads the search log, resolves every new term against
//! the configured languages and stores the pages it finds. With `--sync`
//! the search index is rebuilt afterwards, but only when the pass grew the
//! page store and the engine is reachable.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

use wikiseek_core::ingest::{ingest_terms, IngestContext, IngestReport};
use wikiseek_core::slug::ContentSource;
use wikiseek_core::store::PageStore;
use wikiseek_core::sync::{FullRebuild, SyncStrategy};

use crate::config::Config;
use crate::db;
use crate::elasticsearch::connect_engine;
use crate::fetch::HttpFetcher;
use crate::migrate;
use crate::sqlite_store::SqliteStore;
use crate::sync::print_sync_report;
use crate::terms::load_terms;

fn log_path<'a>(config: &'a Config, log_override: Option<&'a Path>) -> &'a Path {
    log_override.unwrap_or(&config.ingest.log_path)
}

/// Print the unique normalized terms found in the search log.
pub fn run_terms(config: &Config, log_override: Option<PathBuf>) -> Result<()> {
    let terms = load_terms(log_path(config, log_override.as_deref()));
    for term in &terms {
        println!("{}", term);
    }
    println!("{} terms", terms.len());
    Ok(())
}

/// Run one ingestion pass, optionally followed by an index rebuild.
pub async fn run_ingest(
    config: &Config,
    log_override: Option<PathBuf>,
    sync_after: bool,
) -> Result<IngestReport> {
    let pool = db::connect(config).await?;
    migrate::create_schema(&pool).await?;
    let store = SqliteStore::new(pool.clone());

    let path = log_path(config, log_override.as_deref());
    let terms = load_terms(path);
    info!(log = %path.display(), terms = terms.len(), "starting ingestion pass");

    let pages_before = store.count_pages().await?;

    let fetcher = HttpFetcher::from_config(config)?;
    let source = ContentSource::new(config.ingest.source_domain.clone());
    let ctx = IngestContext {
        fetcher: &fetcher,
        store: &store,
        ledger: &store,
        source: &source,
        languages: &config.ingest.languages,
    };
    let report = ingest_terms(&ctx, &terms).await;

    println!("ingest {}", path.display());
    println!("  terms found: {}", report.terms_found);
    println!("  already processed: {}", report.skipped);
    println!("  pages saved: {}", report.pages_saved);
    println!("  not found: {}", report.not_found);
    println!("  save failures: {}", report.save_failed);

    if sync_after {
        let pages_after = store.count_pages().await?;
        if pages_after > pages_before {
            match connect_engine(&config.search_engine).await {
                Some(index) => {
                    let sync = FullRebuild::default().sync(&store, &index).await?;
                    print_sync_report(&index, &sync);
                }
                None => println!("  sync skipped: search engine unreachable"),
            }
        } else {
            println!("  sync skipped: no new pages");
        }
    }

    println!("ok");
    pool.close().await;
    Ok(report)
}
