// src/notify/mod.rs
pub mod digest;
pub mod email;

use anyhow::{Context, Result};
use metrics::counter;

use crate::store::BidAlert;

pub use email::EmailSender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait::async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

/// Send one digest for `saved` to `recipient`. Does nothing (and returns
/// `Ok(false)`) when `saved` is empty; send errors are returned to the caller.
pub async fn notify_new_bids(
    transport: &dyn MailTransport,
    recipient: &str,
    saved: &[BidAlert],
) -> Result<bool> {
    if saved.is_empty() {
        return Ok(false);
    }

    let mail = digest::build_digest(recipient, saved);
    transport
        .send(&mail)
        .await
        .with_context(|| format!("sending bid digest ({} bids) to {recipient}", saved.len()))?;

    counter!("bid_digests_sent_total").increment(1);
    tracing::info!(count = saved.len(), to = recipient, "bid alert email sent");
    Ok(true)
}
