// tests/monitor_run.rs
//
// End-to-end monitor runs with a scripted fetcher, the in-memory store and a
// recording mail transport.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use bid_monitor::ingest::types::{BidSource, PageFetcher};
use bid_monitor::notify::{MailTransport, OutgoingMail};
use bid_monitor::store::MemoryBidStore;
use bid_monitor::{BidMonitor, CategoryTable};

/// url -> page body; missing urls fail like a refused connection.
struct ScriptedFetcher {
    pages: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(u, b)| (u.to_string(), b.to_string()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, source: &BidSource) -> Result<String> {
        self.calls.lock().unwrap().push(source.url.clone());
        self.pages
            .get(&source.url)
            .cloned()
            .ok_or_else(|| anyhow!("connection refused: {}", source.url))
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    fail: bool,
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        if self.fail {
            return Err(anyhow!("smtp: 421 service not available"));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

const MOF: &str = "https://mof.gov.sl/";
const MOH: &str = "https://mohs.gov.sl/";
const NPPA: &str = "https://nppa.gov.sl/";

fn sources() -> Vec<BidSource> {
    vec![
        BidSource::new(MOF, "Ministry of Finance"),
        BidSource::new(MOH, "Ministry of Health"),
        BidSource::new(NPPA, "NPPA"),
    ]
}

fn monitor(
    fetcher: Arc<ScriptedFetcher>,
    store: Arc<MemoryBidStore>,
    mailer: Arc<RecordingMailer>,
) -> BidMonitor {
    BidMonitor::new(
        sources(),
        CategoryTable::default(),
        fetcher,
        store,
        mailer,
        "bids@example.test",
    )
}

#[tokio::test]
async fn failed_source_does_not_stop_the_run() {
    let fetcher = Arc::new(ScriptedFetcher::new(&[
        (MOF, r#"<a href="/t1">Tender for prepaid vouchers</a>"#),
        (NPPA, r#"<a href="/t2">Procurement of VPN services</a>"#),
    ]));
    let store = Arc::new(MemoryBidStore::new());
    let mailer = Arc::new(RecordingMailer::default());

    let report = monitor(fetcher.clone(), store.clone(), mailer.clone())
        .run_once()
        .await
        .expect("run ok");

    assert_eq!(*fetcher.calls.lock().unwrap(), vec![MOF, MOH, NPPA]);
    assert_eq!(report.failed_sources(), 1);
    let failed = report.sources.iter().find(|s| s.is_failed()).unwrap();
    assert_eq!(failed.source(), "Ministry of Health");
    assert!(failed.candidates().is_empty());
    assert_eq!(report.new_bids(), 2);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn no_new_bids_means_no_mail() {
    let fetcher = Arc::new(ScriptedFetcher::new(&[
        (MOF, r#"<a href="/about">About the ministry</a>"#),
        (MOH, r#"<a href="/t">Tender for hospital beds</a>"#),
        (NPPA, ""),
    ]));
    let store = Arc::new(MemoryBidStore::new());
    let mailer = Arc::new(RecordingMailer::default());

    let report = monitor(fetcher, store.clone(), mailer.clone())
        .run_once()
        .await
        .unwrap();

    assert_eq!(report.new_bids(), 0);
    assert!(!report.digest_sent);
    assert!(mailer.sent.lock().unwrap().is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn three_new_bids_produce_one_digest_with_all_of_them() {
    let fetcher = Arc::new(ScriptedFetcher::new(&[
        (MOF, r#"<a href="/t/1">Tender for mobile network services</a>"#),
        (MOH, r#"<a href="/t/2">Bid for cloud infrastructure</a>"#),
        (NPPA, r#"<a href="/t/3">Procurement of toll free numbers</a>"#),
    ]));
    let store = Arc::new(MemoryBidStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let now = Utc.with_ymd_and_hms(2025, 7, 14, 6, 30, 0).unwrap();

    let report = monitor(fetcher, store.clone(), mailer.clone())
        .run_at(now)
        .await
        .unwrap();
    assert!(report.digest_sent);

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1, "exactly one digest");
    let mail = &sent[0];
    assert_eq!(mail.to, "bids@example.test");
    assert_eq!(mail.subject, "New Relevant Bids Alert");

    let html = &mail.html_body;
    for needle in [
        "Tender for mobile network services",
        "Ministry of Finance",
        "<strong>Category:</strong> Communication",
        "<strong>Services:</strong> mobile",
        "Bid for cloud infrastructure",
        "Ministry of Health",
        "<strong>Category:</strong> ICT",
        "<strong>Services:</strong> cloud, infrastructure",
        "Procurement of toll free numbers",
        "<strong>Category:</strong> Collaboration",
        "<strong>Services:</strong> toll free",
        "https://nppa.gov.sl/t/3",
        "<strong>Published:</strong> 2025-07-14",
    ] {
        assert!(html.contains(needle), "digest missing {needle:?}");
    }
    assert_eq!(html.matches("View Bid").count(), 3);
    assert!(!html.contains("Closing Date"));
    assert!(!html.contains("Description"));
}

#[tokio::test]
async fn rerun_is_idempotent_and_silent() {
    let pages = [(MOF, r#"<a href="https://mof.gov.sl/t1">Tender X for telecom</a>"#)];
    let store = Arc::new(MemoryBidStore::new());
    let mailer = Arc::new(RecordingMailer::default());

    let first = monitor(Arc::new(ScriptedFetcher::new(&pages)), store.clone(), mailer.clone())
        .run_once()
        .await
        .unwrap();
    let second = monitor(Arc::new(ScriptedFetcher::new(&pages)), store.clone(), mailer.clone())
        .run_once()
        .await
        .unwrap();

    assert_eq!(first.new_bids(), 1);
    assert_eq!(second.new_bids(), 0);
    assert_eq!(second.record.duplicates, 1);
    assert_eq!(store.len(), 1);
    assert_eq!(mailer.sent.lock().unwrap().len(), 1, "second run sends nothing");
}

#[tokio::test]
async fn mail_failure_is_returned_but_records_persist() {
    let fetcher = Arc::new(ScriptedFetcher::new(&[(
        MOF,
        r#"<a href="/t1">Tender for SMS services</a>"#,
    )]));
    let store = Arc::new(MemoryBidStore::new());
    let mailer = Arc::new(RecordingMailer {
        fail: true,
        ..Default::default()
    });

    let err = monitor(fetcher, store.clone(), mailer)
        .run_once()
        .await
        .expect_err("send failure must surface");
    assert!(format!("{err:#}").contains("421"));
    assert_eq!(store.len(), 1);
}
