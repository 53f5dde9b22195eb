// src/config/mod.rs
//! Process configuration, read from the environment after `.env.local` / `.env`.

pub mod mail;

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::ingest::config::load_sources_default;
use crate::ingest::types::BidSource;

pub use mail::MailSettings;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/bid_alerts.db";
pub const DEFAULT_API_ADDR: &str = "0.0.0.0:8080";

/// Load `.env.local` then `.env`. Missing files are fine; files that fail to
/// parse are returned so they can be logged once tracing is up.
pub fn load_dotenv() -> Vec<(&'static str, dotenvy::Error)> {
    let mut bad = Vec::new();
    if let Err(e) = dotenvy::from_filename(".env.local") {
        if !e.not_found() {
            bad.push((".env.local", e));
        }
    }
    match dotenvy::dotenv() {
        Err(e) if !e.not_found() => bad.push((".env", e)),
        _ => {}
    }
    bad
}

pub fn warn_dotenv_errors(bad: &[(&'static str, dotenvy::Error)]) {
    for (file, e) in bad {
        tracing::warn!(file = %file, error = %e, "ignoring malformed env file");
    }
}

pub fn database_url() -> String {
    env::var("BID_DATABASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

fn fetch_timeout() -> Result<Option<Duration>> {
    match env::var("BID_FETCH_TIMEOUT_SECS") {
        Ok(v) if !v.trim().is_empty() => {
            let secs: u64 = v
                .trim()
                .parse()
                .with_context(|| format!("invalid BID_FETCH_TIMEOUT_SECS {v:?}"))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        _ => Ok(None),
    }
}

/// Settings for the `monitor-bids` run.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub database_url: String,
    pub sources: Vec<BidSource>,
    pub mail: MailSettings,
    pub fetch_timeout: Option<Duration>,
    pub metrics_textfile: Option<PathBuf>,
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: database_url(),
            sources: load_sources_default().context("loading bid sources")?,
            mail: MailSettings::from_env().context("mail settings")?,
            fetch_timeout: fetch_timeout()?,
            metrics_textfile: env::var("BID_METRICS_TEXTFILE").ok().map(PathBuf::from),
        })
    }
}

/// Settings for the `bid-alerts-api` server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub addr: String,
    pub mail: Option<MailSettings>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: database_url(),
            addr: env::var("BID_API_ADDR").unwrap_or_else(|_| DEFAULT_API_ADDR.to_string()),
            mail: MailSettings::from_env_optional().context("mail settings")?,
        })
    }
}
