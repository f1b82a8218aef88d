//! Search-term extraction from query log lines.
//!
//! Log lines carry a `query="<term>"` marker. Only the first marker on a
//! line counts. Terms are trimmed and lower-cased, so casing variants of
//! the same query collapse into a single unit of ingestion work.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

fn query_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r#"query="([^"]+)""#).expect("static regex"))
}

/// Normalizes a raw query into a term: trimmed and lower-cased.
pub fn normalize_term(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Extracts the term from a single log line, if it carries a marker.
pub fn term_from_line(line: &str) -> Option<String> {
    let captures = query_marker().captures(line)?;
    let term = normalize_term(captures.get(1)?.as_str());
    if term.is_empty() {
        None
    } else {
        Some(term)
    }
}

/// Extracts the unique set of terms from log text, sorted.
pub fn extract_terms<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let unique: BTreeSet<String> = lines.into_iter().filter_map(term_from_line).collect();
    unique.into_iter().collect()
}

/// Formats the log line that [`term_from_line`] reads back.
///
/// Embedded double quotes would end the marker early, so they are replaced
/// with single quotes.
pub fn format_log_line(query: &str, timestamp: &str) -> String {
    format!("{} query=\"{}\"", timestamp, query.replace('"', "'"))
}
