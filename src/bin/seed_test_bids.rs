//! Inserts a fixed set of sample bids into the configured store.
//! With `SEED_SEND_EMAIL=1` the newly inserted ones are also mailed as a digest,
//! which is a quick way to check SMTP settings end to end.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};

use bid_monitor::config::{self, MailSettings};
use bid_monitor::ingest::types::BidCandidate;
use bid_monitor::notify::{self, EmailSender};
use bid_monitor::store::{BidStore, SqliteBidStore};
use bid_monitor::{BidCategory, InsertOutcome, NewBidAlert};

fn bid(
    (source, title, url): (&str, &str, &str),
    cat: BidCategory,
    services: &[&str],
    publish_date: DateTime<Utc>,
) -> BidCandidate {
    BidCandidate {
        source: source.into(),
        title: title.into(),
        url: url.into(),
        bid_category: cat,
        services: services.iter().map(|s| s.to_string()).collect(),
        publish_date,
    }
}

fn sample_bids() -> Vec<(BidCandidate, &'static str, i64)> {
    let now = Utc::now();
    vec![
        (
            bid(
                (
                    "Ministry of Finance",
                    "Tender for Mobile Communication Services",
                    "https://mof.gov.sl/tenders/123",
                ),
                BidCategory::Communication,
                &["mobile", "cug"],
                now,
            ),
            "Provision of mobile and CUG services for government departments",
            30,
        ),
        (
            bid(
                (
                    "NPPA",
                    "Internet and VPN Services Procurement",
                    "https://nppa.gov.sl/tenders/456",
                ),
                BidCategory::Connectivity,
                &["internet", "vpn"],
                now,
            ),
            "National procurement for dedicated internet and VPN services",
            15,
        ),
        (
            bid(
                (
                    "Ministry of Health",
                    "ICT Infrastructure Setup",
                    "https://mohs.gov.sl/tenders/789",
                ),
                BidCategory::Ict,
                &["networking", "security"],
                now,
            ),
            "Implementation of network infrastructure and security systems",
            45,
        ),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_errors = config::load_dotenv();
    bid_monitor::init_tracing();
    config::warn_dotenv_errors(&dotenv_errors);

    let db_url = config::database_url();
    let store = SqliteBidStore::connect(&db_url)
        .await
        .with_context(|| format!("opening bid store {db_url}"))?;

    let now = Utc::now();
    let mut saved = Vec::new();
    for (candidate, description, closes_in_days) in sample_bids() {
        let mut alert = NewBidAlert::from_candidate(candidate, now);
        alert.description = Some(description.to_string());
        alert.closing_date = Some(now + Duration::days(closes_in_days));
        match store.insert_if_unique(&alert).await? {
            InsertOutcome::Inserted(a) => saved.push(a),
            InsertOutcome::AlreadyExists => {
                tracing::info!(title = %alert.title, "sample bid already present");
            }
        }
    }
    store.close().await;
    tracing::info!(inserted = saved.len(), "sample bids seeded");

    if std::env::var("SEED_SEND_EMAIL").is_ok_and(|v| v == "1") {
        let mail = MailSettings::from_env()?;
        let sender = EmailSender::from_settings(&mail)?;
        notify::notify_new_bids(&sender, &mail.to, &saved).await?;
    }
    Ok(())
}
