//! Typed error conditions shared across the pipeline.
//!
//! Store operations return `anyhow::Result` and wrap these types where a
//! caller needs to tell one condition apart from another (for example
//! `err.downcast_ref::<PageError>()` after a rejected upsert).

use thiserror::Error;

/// A page failed validation before it reached storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("invalid page data: {field} is empty")]
    Invalid { field: &'static str },
}

/// Failure to fetch one URL in one language.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// HTTP 404. The resolver moves on to the next language.
    #[error("page not found (404): {url}")]
    NotFound { url: String },

    /// Any other non-success status.
    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    /// The URL does not belong to the language's domain.
    #[error("{url} is outside the allowed domain {allowed}")]
    DomainNotAllowed { url: String, allowed: String },

    /// Connection failure, timeout, or unreadable body.
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

/// Every language in the cascade failed for a term.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no valid page found for term '{term}'")]
    NoPageFound { term: String },
}

/// Failure talking to the search engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("search engine unreachable: {0}")]
    Transport(String),

    #[error("search engine returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed search engine response: {0}")]
    Malformed(String),
}

/// A structural step of an index rebuild failed; the sync was aborted.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("error checking if index exists: {0}")]
    ExistenceCheck(#[source] IndexError),

    #[error("error deleting index: {0}")]
    Delete(#[source] IndexError),

    #[error("error creating index: {0}")]
    Create(#[source] IndexError),

    #[error("error reading pages from store: {0:#}")]
    Store(anyhow::Error),
}
