//! Core data models that flow through ingestion and retrieval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PageError;

/// A stored article. `url` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub title: String,
    pub content: String,
    /// Language code the page was resolved in (e.g. `"da"`).
    pub language: String,
    pub last_updated: DateTime<Utc>,
}

impl Page {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content: content.into(),
            language: language.into(),
            last_updated: Utc::now(),
        }
    }

    /// Rejects pages with an empty url, title or content. Whitespace is
    /// content: an article of blank paragraphs is still stored.
    pub fn validate(&self) -> Result<(), PageError> {
        if self.url.is_empty() {
            return Err(PageError::Invalid { field: "url" });
        }
        if self.title.is_empty() {
            return Err(PageError::Invalid { field: "title" });
        }
        if self.content.is_empty() {
            return Err(PageError::Invalid { field: "content" });
        }
        Ok(())
    }
}

/// Denormalized copy of a [`Page`] as submitted to the search engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDocument {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(default)]
    pub language: String,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub last_updated: String,
}

impl From<&Page> for PageDocument {
    fn from(page: &Page) -> Self {
        Self {
            title: page.title.clone(),
            url: page.url.clone(),
            content: page.content.clone(),
            language: page.language.clone(),
            last_updated: page.last_updated.to_rfc3339(),
        }
    }
}

/// One entry of a query answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_complete_page() {
        let page = Page::new("https://en.wikipedia.org/wiki/Rust", "Rust", "body", "en");
        assert!(page.validate().is_ok());
    }

    #[test]
    fn test_validate_names_the_empty_field() {
        let mut page = Page::new("https://en.wikipedia.org/wiki/Rust", "Rust", "body", "en");
        page.content = String::new();
        assert_eq!(
            page.validate(),
            Err(PageError::Invalid { field: "content" })
        );

        page.title = String::new();
        assert_eq!(page.validate(), Err(PageError::Invalid { field: "title" }));

        page.url = String::new();
        assert_eq!(page.validate(), Err(PageError::Invalid { field: "url" }));
    }

    #[test]
    fn test_validate_accepts_blank_paragraphs() {
        let page = Page::new("https://da.wikipedia.org/wiki/Tom", "Tom", "\n\n", "da");
        assert!(page.validate().is_ok());
    }

    #[test]
    fn test_document_carries_language_and_timestamp() {
        let page = Page::new("https://da.wikipedia.org/wiki/Kat", "Kat", "Katte", "da");
        let doc = PageDocument::from(&page);
        assert_eq!(doc.language, "da");
        assert_eq!(doc.last_updated, page.last_updated.to_rfc3339());
    }
}
