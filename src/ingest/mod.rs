// src/ingest/mod.rs
pub mod config;
pub mod extract;
pub mod fetch;
pub mod types;

use chrono::{DateTime, Utc};
use metrics::counter;

use crate::categorize::CategoryTable;
use crate::ingest::types::{BidSource, PageFetcher, SourceOutcome};

/// Fetch and extract a single source. Fetch errors become `SourceOutcome::Failed`.
pub async fn scrape_source(
    fetcher: &dyn PageFetcher,
    source: &BidSource,
    table: &CategoryTable,
    now: DateTime<Utc>,
) -> SourceOutcome {
    match fetcher.fetch(source).await {
        Ok(html) => {
            let candidates = extract::extract_candidates(&html, source, table, now);
            counter!("bid_candidates_total").increment(candidates.len() as u64);
            tracing::info!(source = %source.name, found = candidates.len(), "source scraped");
            SourceOutcome::Scraped {
                source: source.name.clone(),
                candidates,
            }
        }
        Err(e) => {
            tracing::warn!(error = ?e, source = %source.name, url = %source.url, "source fetch failed");
            counter!("bid_fetch_errors_total").increment(1);
            SourceOutcome::Failed {
                source: source.name.clone(),
                error: e,
            }
        }
    }
}

/// Scrape every source in order, one at a time. Never fails as a whole.
pub async fn scrape_all(
    fetcher: &dyn PageFetcher,
    sources: &[BidSource],
    table: &CategoryTable,
    now: DateTime<Utc>,
) -> Vec<SourceOutcome> {
    let mut out = Vec::with_capacity(sources.len());
    for s in sources {
        out.push(scrape_source(fetcher, s, table, now).await);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};

    struct StaticFetcher;

    #[async_trait::async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, source: &BidSource) -> Result<String> {
            if source.name == "down" {
                return Err(anyhow!("connection refused"));
            }
            Ok(r#"<a href="/t/1">Tender: prepaid bundles</a>"#.to_string())
        }
    }

    #[tokio::test]
    async fn failed_source_keeps_position_and_yields_nothing() {
        let sources = vec![
            BidSource::new("https://a.test/", "up"),
            BidSource::new("https://b.test/", "down"),
            BidSource::new("https://c.test/", "up2"),
        ];
        let table = CategoryTable::default();
        let out = scrape_all(&StaticFetcher, &sources, &table, Utc::now()).await;

        let names: Vec<_> = out.iter().map(|o| o.source()).collect();
        assert_eq!(names, vec!["up", "down", "up2"]);
        assert!(out[1].is_failed());
        assert!(out[1].candidates().is_empty());
        assert_eq!(out[0].candidates()[0].url, "https://a.test/t/1");
        assert_eq!(out[2].candidates()[0].url, "https://c.test/t/1");
    }
}
