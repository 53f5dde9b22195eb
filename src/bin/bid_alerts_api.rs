//! Serves the bid alert endpoints (+ `/metrics`) for the dashboard UI.

use std::sync::Arc;

use anyhow::{Context, Result};

use bid_monitor::api::{self, AppState};
use bid_monitor::config::{self, ApiConfig};
use bid_monitor::metrics::Metrics;
use bid_monitor::notify::EmailSender;
use bid_monitor::store::SqliteBidStore;

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_errors = config::load_dotenv();
    bid_monitor::init_tracing();
    config::warn_dotenv_errors(&dotenv_errors);

    let cfg = ApiConfig::from_env()?;
    let metrics = Metrics::init()?;

    let store = SqliteBidStore::connect(&cfg.database_url)
        .await
        .with_context(|| format!("opening bid store {}", cfg.database_url))?;

    let mut state = AppState::new(Arc::new(store));
    if let Some(mail) = &cfg.mail {
        state = state.with_mailer(Arc::new(EmailSender::from_settings(mail)?), mail.to.clone());
    }

    let app = api::router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.addr)
        .await
        .with_context(|| format!("binding {}", cfg.addr))?;
    tracing::info!(addr = %cfg.addr, "bid alert api listening");
    axum::serve(listener, app).await.context("serving api")?;
    Ok(())
}
