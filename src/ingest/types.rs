// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::categorize::BidCategory;

/// One site to scrape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BidSource {
    pub url: String,
    pub name: String,
}

impl BidSource {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }
}

/// A categorized anchor found during a run; not yet persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BidCandidate {
    pub source: String,
    pub title: String,
    pub url: String,
    pub bid_category: BidCategory,
    pub services: Vec<String>,
    pub publish_date: DateTime<Utc>,
}

/// Per-source result of the fetch + extract step.
#[derive(Debug)]
pub enum SourceOutcome {
    Scraped {
        source: String,
        candidates: Vec<BidCandidate>,
    },
    Failed {
        source: String,
        error: anyhow::Error,
    },
}

impl SourceOutcome {
    pub fn source(&self) -> &str {
        match self {
            SourceOutcome::Scraped { source, .. } | SourceOutcome::Failed { source, .. } => source,
        }
    }

    pub fn candidates(&self) -> &[BidCandidate] {
        match self {
            SourceOutcome::Scraped { candidates, .. } => candidates,
            SourceOutcome::Failed { .. } => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SourceOutcome::Failed { .. })
    }
}

#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Return the raw HTML body of `source.url`.
    async fn fetch(&self, source: &BidSource) -> Result<String>;
}
