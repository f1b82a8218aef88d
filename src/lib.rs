//! # wikiseek
//!
//! Turns what users search for into searchable encyclopedia pages.
//!
//! Queries are appended to a search log. An ingestion pass extracts the
//! logged terms, resolves each one to an article (trying languages in
//! priority order), and stores the article in SQLite. A sync pushes the
//! stored pages into Elasticsearch. Queries go to Elasticsearch when it is
//! reachable at startup and fall back to a substring scan of the page store
//! otherwise.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌──────────┐   ┌───────────────┐
//! │ search.log │──▶│ ingest pass  │──▶│  SQLite  │──▶│ Elasticsearch │
//! └─────▲──────┘   │ resolve+fetch│   │  pages   │   │    (sync)     │
//!       │          └──────────────┘   └────┬─────┘   └───────┬───────┘
//!       │                                  │ fallback        │ engine
//!       │                                  ▼                 ▼
//!       │                            ┌──────────────────────────┐
//!       └────────────────────────────│    query dispatcher      │
//!                                    │     (CLI and HTTP)       │
//!                                    └──────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! wikiseek init                   # create database
//! wikiseek ingest --sync          # fetch pages for logged terms, then sync
//! wikiseek search "rust"
//! wikiseek serve                  # start HTTP query server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`sqlite_store`] | Page store and term ledger on SQLite |
//! | [`terms`] | Search-log reading and appending |
//! | [`fetch`] | HTTP page fetcher and article extraction |
//! | [`elasticsearch`] | Elasticsearch index and startup probe |
//! | [`backend`] | Query backend selection |
//! | [`ingest`] | `ingest` and `terms` commands |
//! | [`sync`] | `sync` command |
//! | [`search`] | `search` command |
//! | [`server`] | HTTP query server |

pub mod backend;
pub mod config;
pub mod db;
pub mod elasticsearch;
pub mod fetch;
pub mod ingest;
pub mod migrate;
pub mod search;
pub mod server;
pub mod sqlite_store;
pub mod sync;
pub mod terms;
