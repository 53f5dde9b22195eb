//! monitor-bids: one scrape pass over the configured procurement sites.
//! Takes no arguments; settings come from the environment (see `config`).
//! Exits non-zero when the digest email cannot be sent.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use bid_monitor::config::{self, MonitorConfig};
use bid_monitor::ingest::fetch::HttpFetcher;
use bid_monitor::metrics::Metrics;
use bid_monitor::notify::EmailSender;
use bid_monitor::store::SqliteBidStore;
use bid_monitor::{BidMonitor, CategoryTable};

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_errors = config::load_dotenv();
    bid_monitor::init_tracing();
    config::warn_dotenv_errors(&dotenv_errors);

    let cfg = MonitorConfig::from_env()?;
    let metrics = match &cfg.metrics_textfile {
        Some(_) => Some(Metrics::init()?),
        None => None,
    };

    let mailer = EmailSender::from_settings(&cfg.mail)?;
    let fetcher = HttpFetcher::new().with_timeout(cfg.fetch_timeout);

    let store = SqliteBidStore::connect(&cfg.database_url)
        .await
        .with_context(|| format!("opening bid store {}", cfg.database_url))?;
    info!(sources = cfg.sources.len(), "bid monitor starting");

    let monitor = BidMonitor::new(
        cfg.sources.clone(),
        CategoryTable::default(),
        Arc::new(fetcher),
        Arc::new(store.clone()),
        Arc::new(mailer),
        cfg.mail.to.clone(),
    );

    let result = monitor.run_once().await;
    store.close().await;

    if let (Some(m), Some(path)) = (&metrics, &cfg.metrics_textfile) {
        if let Err(e) = m.write_textfile(path) {
            error!(error = ?e, "writing metrics textfile failed");
        }
    }

    match result {
        Ok(report) => {
            info!(
                new_bids = report.new_bids(),
                duplicates = report.record.duplicates,
                insert_errors = report.record.failed,
                failed_sources = report.failed_sources(),
                digest_sent = report.digest_sent,
                "Monitoring complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = ?e, "bid monitoring failed");
            Err(e)
        }
    }
}
