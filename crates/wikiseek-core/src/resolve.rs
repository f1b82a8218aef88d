//! Language-cascading page resolution.
//!
//! A term is tried in each configured language, in priority order, until
//! one fetch yields a page with a non-empty title. Attempts are strictly
//! sequential: the content source is rate-sensitive and the cascade stops
//! at the first hit.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{FetchError, ResolveError};
use crate::models::Page;
use crate::slug::ContentSource;

/// Title and body extracted from one article response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub title: String,
    pub content: String,
}

/// Fetches one article URL within one language's domain.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// `language` selects the only host the request may reach.
    async fn fetch(&self, url: &str, language: &str) -> Result<FetchedPage, FetchError>;
}

/// The first valid page found for a term and the language it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub page: Page,
    pub language: String,
}

/// Try `languages` in order and return the first valid page.
///
/// A fetch counts as a hit only when it succeeds and the extracted title
/// is non-empty. 404s, other HTTP failures and empty titles all move the
/// cascade on to the next language.
pub async fn resolve_page(
    fetcher: &dyn PageFetcher,
    source: &ContentSource,
    term: &str,
    languages: &[String],
) -> Result<Resolved, ResolveError> {
    for language in languages {
        let url = source.article_url(term, language);
        debug!(term, %language, %url, "trying article");
        match fetcher.fetch(&url, language).await {
            Ok(fetched) if !fetched.title.trim().is_empty() => {
                info!(term, %language, title = %fetched.title.trim(), "resolved page");
                let page = Page::new(
                    fetched.url,
                    fetched.title.trim(),
                    fetched.content,
                    language.as_str(),
                );
                return Ok(Resolved {
                    page,
                    language: language.clone(),
                });
            }
            Ok(_) => {
                warn!(term, %language, %url, "response had no title, trying next language");
            }
            Err(FetchError::NotFound { .. }) => {
                debug!(term, %language, %url, "no article in this language");
            }
            Err(e) => {
                warn!(term, %language, error = %e, "fetch failed, trying next language");
            }
        }
    }
    Err(ResolveError::NoPageFound {
        term: term.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted fetcher shared by the resolver and ingestion tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Answers from a URL → response table and records every call.
    /// Unknown URLs answer 404.
    #[derive(Default)]
    pub struct ScriptedFetcher {
        responses: HashMap<String, Result<FetchedPage, FetchError>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: &str, title: &str, content: &str) -> Self {
            self.responses.insert(
                url.to_string(),
                Ok(FetchedPage {
                    url: url.to_string(),
                    title: title.to_string(),
                    content: content.to_string(),
                }),
            );
            self
        }

        pub fn error(mut self, url: &str, error: FetchError) -> Self {
            self.responses.insert(url.to_string(), Err(error));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str, _language: &str) -> Result<FetchedPage, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            self.responses.get(url).cloned().unwrap_or_else(|| {
                Err(FetchError::NotFound {
                    url: url.to_string(),
                })
            })
        }
    }
}
