//! HTTP page fetcher for the encyclopedia.
//!
//! Each request is pinned to the language's host: the URL must point at
//! `<lang>.<source-domain>` (including the port when the source domain
//! names one) and redirects are followed only while they stay on the host
//! and port of the original request. Requests carry an explicit timeout
//! so a stalled response cannot hold up an ingestion pass indefinitely.
//!
//! The article title comes from `#firstHeading`; the body is the text of
//! every `<p>` inside the first `div.mw-parser-output`, one line each.

use async_trait::async_trait;
use reqwest::redirect::{Attempt, Policy};
use reqwest::{StatusCode, Url};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

use wikiseek_core::error::FetchError;
use wikiseek_core::resolve::{FetchedPage, PageFetcher};
use wikiseek_core::slug::ContentSource;

use crate::config::{Config, FetchConfig};

const MAX_REDIRECTS: usize = 10;

/// [`PageFetcher`] over `reqwest`.
pub struct HttpFetcher {
    client: reqwest::Client,
    source: ContentSource,
}

fn client_builder(fetch: &FetchConfig) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .user_agent(fetch.user_agent.clone())
        .redirect(Policy::custom(same_host_redirects))
}

impl HttpFetcher {
    pub fn new(source: ContentSource, fetch: &FetchConfig) -> anyhow::Result<Self> {
        let client = client_builder(fetch).build()?;
        Ok(Self { client, source })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            ContentSource::new(config.ingest.source_domain.clone()),
            &config.fetch,
        )
    }
}

fn same_host_redirects(attempt: Attempt) -> reqwest::redirect::Action {
    if attempt.previous().len() > MAX_REDIRECTS {
        return attempt.error("too many redirects");
    }
    let allowed = redirect_allowed(attempt.previous(), attempt.url());
    if allowed {
        attempt.follow()
    } else {
        attempt.stop()
    }
}

/// A redirect may be followed only to the host and port of the first
/// request.
fn redirect_allowed(previous: &[Url], next: &Url) -> bool {
    match previous.first().and_then(authority) {
        Some(origin) => authority(next).as_deref() == Some(origin.as_str()),
        None => false,
    }
}

/// `host[:port]`, with the port omitted when it is the scheme default.
fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// 404 is the only "no such article" answer; any other non-success status
/// is reported as is.
fn classify_status(status: StatusCode, url: &str) -> Result<(), FetchError> {
    if status == StatusCode::NOT_FOUND {
        return Err(FetchError::NotFound {
            url: url.to_string(),
        });
    }
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(())
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, language: &str) -> Result<FetchedPage, FetchError> {
        let allowed = self.source.language_host(language);
        let transport = |message: String| FetchError::Transport {
            url: url.to_string(),
            message,
        };

        let parsed = Url::parse(url).map_err(|e| transport(e.to_string()))?;
        if authority(&parsed).as_deref() != Some(allowed.as_str()) {
            return Err(FetchError::DomainNotAllowed {
                url: url.to_string(),
                allowed,
            });
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "fetched");

        classify_status(status, url)?;

        let body = response
            .text()
            .await
            .map_err(|e| transport(e.to_string()))?;
        let article = extract_article(&body);

        Ok(FetchedPage {
            url: url.to_string(),
            title: article.title,
            content: article.content,
        })
    }
}

/// Title and body text of an article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub content: String,
}

struct ArticleSelectors {
    heading: Selector,
    main: Selector,
    paragraph: Selector,
}

impl ArticleSelectors {
    fn new() -> Self {
        Self {
            heading: Selector::parse("#firstHeading").expect("heading selector"),
            main: Selector::parse("div.mw-parser-output").expect("main selector"),
            paragraph: Selector::parse("p").expect("paragraph selector"),
        }
    }
}

/// Extract the article title and paragraph text from a page.
///
/// Missing elements produce empty strings; the resolver decides what an
/// empty title means.
pub fn extract_article(html: &str) -> Article {
    let selectors = ArticleSelectors::new();
    let document = Html::parse_document(html);

    let title = document
        .select(&selectors.heading)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let mut content = String::new();
    if let Some(main) = document.select(&selectors.main).next() {
        for p in main.select(&selectors.paragraph) {
            content.push_str(&p.text().collect::<String>());
            content.push('\n');
        }
    }

    Article { title, content }
}
