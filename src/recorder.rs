// src/recorder.rs
use chrono::{DateTime, Utc};
use metrics::counter;

use crate::ingest::types::BidCandidate;
use crate::store::{BidAlert, BidStore, InsertOutcome, NewBidAlert};

#[derive(Debug, Default)]
pub struct RecordOutcome {
    /// Alerts inserted by this call, in candidate order.
    pub saved: Vec<BidAlert>,
    pub duplicates: usize,
    pub failed: usize,
}

/// Insert every candidate as a fresh alert. Duplicates and store errors are
/// counted, never returned.
pub async fn record_candidates(
    store: &dyn BidStore,
    candidates: Vec<BidCandidate>,
    now: DateTime<Utc>,
) -> RecordOutcome {
    let mut out = RecordOutcome::default();

    for c in candidates {
        let alert = NewBidAlert::from_candidate(c, now);
        match store.insert_if_unique(&alert).await {
            Ok(InsertOutcome::Inserted(saved)) => {
                counter!("bid_inserted_total").increment(1);
                out.saved.push(saved);
            }
            Ok(InsertOutcome::AlreadyExists) => {
                tracing::debug!(url = %alert.url, title = %alert.title, "known bid, skipped");
                counter!("bid_duplicates_total").increment(1);
                out.duplicates += 1;
            }
            Err(e) => {
                tracing::warn!(error = ?e, url = %alert.url, "saving bid failed");
                counter!("bid_insert_errors_total").increment(1);
                out.failed += 1;
            }
        }
    }

    out
}
