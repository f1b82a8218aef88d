//! Canonical article URLs for the content source.

/// The encyclopedia being scraped, reachable per language at
/// `https://<lang>.<domain>/wiki/<slug>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSource {
    pub domain: String,
}

impl ContentSource {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    /// The only host a fetch in `language` may touch, with the port when
    /// the domain names one (`wiki.local:8080` gives `en.wiki.local:8080`).
    pub fn language_host(&self, language: &str) -> String {
        format!("{}.{}", language, self.domain)
    }

    pub fn article_url(&self, term: &str, language: &str) -> String {
        format!(
            "https://{}/wiki/{}",
            self.language_host(language),
            article_slug(term)
        )
    }
}

impl Default for ContentSource {
    fn default() -> Self {
        Self::new("wikipedia.org")
    }
}

/// Spaces become underscores, then the slug is title-cased.
///
/// Each space maps to one underscore, so runs of spaces are preserved.
pub fn article_slug(term: &str) -> String {
    title_case(&term.replace(' ', "_"))
}

/// Upper-cases the first letter of each word and lower-cases the rest.
///
/// Underscores, apostrophes and letters/digits continue a word; any other
/// character (`-`, `(`, `.`) starts a new one.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = !(c == '_' || c == '\'' || c == '’');
        }
    }
    out
}
