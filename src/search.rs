//! `search` command.

use anyhow::Result;
use std::sync::Arc;

use wikiseek_core::models::SearchHit;

use crate::backend::build_dispatcher;
use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

pub async fn run_search(config: &Config, query: &str) -> Result<Vec<SearchHit>> {
    let pool = db::connect(config).await?;
    migrate::create_schema(&pool).await?;
    let store = Arc::new(SqliteStore::new(pool.clone()));

    let dispatcher = build_dispatcher(config, store).await;
    let result = dispatcher.search(query).await;
    pool.close().await;
    let hits = result?;

    println!("backend: {}", dispatcher.backend().kind());
    if hits.is_empty() {
        println!("No results.");
        return Ok(hits);
    }

    for (i, hit) in hits.iter().enumerate() {
        println!("{}. {}", i + 1, hit.title);
        println!("    url: {}", hit.url);
        println!("    excerpt: \"{}\"", hit.snippet.trim());
        println!();
    }

    Ok(hits)
}
