//! # wikiseek core
//!
//! Backend-agnostic logic for wikiseek: page models, search-log term
//! extraction, article URL construction, the page store / ledger / index
//! traits with in-memory implementations, the language-cascading page
//! resolver, the ingestion pass, the index synchronizer and the query
//! dispatcher.
//!
//! This crate contains no tokio, sqlx, reqwest, or filesystem I/O. The
//! `wikiseek` crate plugs SQLite, HTTP and Elasticsearch implementations
//! into the traits defined here.

pub mod error;
pub mod index;
pub mod ingest;
pub mod models;
pub mod resolve;
pub mod search;
pub mod slug;
pub mod store;
pub mod sync;
pub mod terms;
