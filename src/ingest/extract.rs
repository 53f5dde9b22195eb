// src/ingest/extract.rs
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use crate::categorize::CategoryTable;
use crate::ingest::types::{BidCandidate, BidSource};

const PROCUREMENT_HINTS: [&str; 3] = ["tender", "bid", "procurement"];

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("static selector"));

/// Collapse runs of whitespace and trim.
pub fn clean_anchor_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn looks_like_procurement(text: &str) -> bool {
    let lower = text.to_lowercase();
    PROCUREMENT_HINTS.iter().any(|h| lower.contains(h))
}

/// Resolve `href` against `base`. Only http(s) results are accepted.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let resolved = base.join(href).ok()?;
    matches!(resolved.scheme(), "http" | "https").then_some(resolved)
}

/// Pull procurement-looking anchors out of `html` and categorize them.
/// Anchors that fail any step (empty text, no hint, bad href, no category)
/// are dropped individually.
pub fn extract_candidates(
    html: &str,
    source: &BidSource,
    table: &CategoryTable,
    now: DateTime<Utc>,
) -> Vec<BidCandidate> {
    let base = match Url::parse(&source.url) {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!(error = %e, source = %source.name, url = %source.url, "invalid source url");
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let mut out = Vec::new();

    for element in document.select(&ANCHOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let text = clean_anchor_text(&element.text().collect::<String>());
        if text.is_empty() || !looks_like_procurement(&text) {
            continue;
        }
        let Some(url) = resolve_href(&base, href) else {
            tracing::debug!(source = %source.name, href, "unresolvable href");
            continue;
        };
        let Some(cat) = table.categorize(&text) else {
            continue;
        };

        out.push(BidCandidate {
            source: source.name.clone(),
            title: text,
            url: url.to_string(),
            bid_category: cat.category,
            services: cat.services,
            publish_date: now,
        });
    }

    out
}
