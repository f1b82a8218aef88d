//! Search-log file access.
//!
//! Reading is best-effort: a missing or unreadable log yields no terms and
//! a warning, never an error. The query endpoint appends to the same file.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use wikiseek_core::terms::{extract_terms, format_log_line};

/// Unique, normalized terms found in the log at `path`.
pub fn load_terms(path: &Path) -> Vec<String> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not open search log");
            return Vec::new();
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    let terms = extract_terms(text.lines());
    for term in &terms {
        debug!(term = %term, "extracted search term");
    }
    terms
}

/// Append one `query="..."` line to the log, creating it if needed.
pub async fn append_query(path: &Path, query: &str) -> Result<()> {
    let line = format_log_line(query, &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to open search log: {}", path.display()))?;
    file.write_all(format!("{}\n", line).as_bytes()).await?;
    // tokio writes land on disk only once flushed.
    file.flush().await?;
    Ok(())
}
