//! One sequential ingestion pass over a set of terms.
//!
//! Per term: ledger check → resolve across languages → upsert → ledger
//! mark. Every per-term failure is logged and the pass moves on; nothing
//! short of a panic aborts the run. A term is marked only after its page
//! has been stored, so failed terms are retried on the next pass.

use tracing::{info, warn};

use crate::resolve::{resolve_page, PageFetcher};
use crate::slug::ContentSource;
use crate::store::{already_processed, PageStore, TermLedger};

/// Inputs for an ingestion pass.
pub struct IngestContext<'a> {
    pub fetcher: &'a dyn PageFetcher,
    pub store: &'a dyn PageStore,
    pub ledger: &'a dyn TermLedger,
    pub source: &'a ContentSource,
    /// Languages in priority order.
    pub languages: &'a [String],
}

/// Outcome counters for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub terms_found: usize,
    pub skipped: usize,
    pub pages_saved: usize,
    pub not_found: usize,
    pub save_failed: usize,
}

/// Process `terms` one at a time.
pub async fn ingest_terms(ctx: &IngestContext<'_>, terms: &[String]) -> IngestReport {
    let mut report = IngestReport {
        terms_found: terms.len(),
        ..IngestReport::default()
    };

    for term in terms {
        if already_processed(ctx.ledger, term).await {
            info!(term = %term, "skipping already processed term");
            report.skipped += 1;
            continue;
        }

        let resolved = match resolve_page(ctx.fetcher, ctx.source, term, ctx.languages).await {
            Ok(r) => r,
            Err(e) => {
                warn!(term = %term, error = %e, "failed to resolve term in any language");
                report.not_found += 1;
                continue;
            }
        };

        if let Err(e) = ctx.store.upsert_page(&resolved.page).await {
            warn!(term = %term, url = %resolved.page.url, error = %e, "error saving page");
            report.save_failed += 1;
            continue;
        }
        info!(
            language = %resolved.language,
            title = %resolved.page.title,
            "saved page"
        );
        report.pages_saved += 1;

        if let Err(e) = ctx.ledger.mark_processed(term).await {
            warn!(term = %term, error = %e, "error marking term as processed");
        }
    }

    report
}
