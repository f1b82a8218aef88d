//! `sync` command: rebuild the search index from the page store.

use anyhow::{bail, Result};

use wikiseek_core::index::SearchIndex;
use wikiseek_core::sync::{FullRebuild, SyncReport, SyncStrategy};

use crate::config::Config;
use crate::db;
use crate::elasticsearch::connect_engine;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

/// Connect to the engine and run a full rebuild. An unreachable engine is
/// an error here, unlike for queries.
pub async fn run_sync(config: &Config) -> Result<SyncReport> {
    let pool = db::connect(config).await?;
    migrate::create_schema(&pool).await?;
    let store = SqliteStore::new(pool.clone());

    let Some(index) = connect_engine(&config.search_engine).await else {
        pool.close().await;
        bail!(
            "search engine unreachable at {}:{}",
            config.search_engine.host,
            config.search_engine.port
        );
    };

    let result = FullRebuild::default().sync(&store, &index).await;
    pool.close().await;
    let report = result?;

    print_sync_report(&index, &report);
    println!("ok");
    Ok(report)
}

pub fn print_sync_report(index: &dyn SearchIndex, report: &SyncReport) {
    println!("sync {}", index.name());
    if report.recreated {
        println!("  replaced existing index");
    }
    println!("  documents indexed: {}", report.indexed);
    println!("  documents failed: {}", report.failed);
}
