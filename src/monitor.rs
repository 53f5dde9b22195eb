// src/monitor.rs
//! One scrape pass: sources → candidates → stored alerts → digest.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

use crate::categorize::CategoryTable;
use crate::ingest::{
    self,
    types::{BidSource, PageFetcher, SourceOutcome},
};
use crate::notify::{self, MailTransport};
use crate::recorder::{self, RecordOutcome};
use crate::store::BidStore;

/// One-time metrics registration (so series show up in the exposition).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("bid_monitor_runs_total", "Completed monitor runs.");
        describe_counter!("bid_fetch_errors_total", "Source fetches that failed.");
        describe_counter!(
            "bid_candidates_total",
            "Categorized procurement anchors found."
        );
        describe_counter!("bid_inserted_total", "New bid alerts stored.");
        describe_counter!(
            "bid_duplicates_total",
            "Candidates skipped because (url, title) was already stored."
        );
        describe_counter!("bid_insert_errors_total", "Store errors while saving bids.");
        describe_counter!("bid_digests_sent_total", "Digest emails sent.");
        describe_gauge!("bid_monitor_last_run_ts", "Unix ts of the last monitor run.");
    });
}

#[derive(Debug)]
pub struct RunReport {
    pub sources: Vec<SourceOutcome>,
    pub record: RecordOutcome,
    pub digest_sent: bool,
}

impl RunReport {
    pub fn new_bids(&self) -> usize {
        self.record.saved.len()
    }

    pub fn failed_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.is_failed()).count()
    }
}

pub struct BidMonitor {
    sources: Vec<BidSource>,
    table: CategoryTable,
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn BidStore>,
    mailer: Arc<dyn MailTransport>,
    recipient: String,
}

impl BidMonitor {
    pub fn new(
        sources: Vec<BidSource>,
        table: CategoryTable,
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn BidStore>,
        mailer: Arc<dyn MailTransport>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            sources,
            table,
            fetcher,
            store,
            mailer,
            recipient: recipient.into(),
        }
    }

    pub async fn run_once(&self) -> Result<RunReport> {
        self.run_at(Utc::now()).await
    }

    /// Run with an explicit timestamp (used as publish date and created_at).
    /// Only a digest send failure is returned as an error; stored alerts stay.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunReport> {
        ensure_metrics_described();

        let sources =
            ingest::scrape_all(self.fetcher.as_ref(), &self.sources, &self.table, now).await;

        let candidates = sources
            .iter()
            .flat_map(|s| s.candidates().iter().cloned())
            .collect::<Vec<_>>();

        let record = recorder::record_candidates(self.store.as_ref(), candidates, now).await;

        counter!("bid_monitor_runs_total").increment(1);
        gauge!("bid_monitor_last_run_ts").set(now.timestamp().max(0) as f64);

        let digest_sent =
            notify::notify_new_bids(self.mailer.as_ref(), &self.recipient, &record.saved).await?;

        Ok(RunReport {
            sources,
            record,
            digest_sent,
        })
    }
}
