// src/store/mod.rs
//! Bid alert persistence. Uniqueness of (url, title) is the store's job;
//! callers see a duplicate as `InsertOutcome::AlreadyExists`.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::categorize::BidCategory;
use crate::ingest::types::BidCandidate;

pub use memory::MemoryBidStore;
pub use sqlite::SqliteBidStore;

/// A bid alert ready to insert (no id yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBidAlert {
    pub source: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    pub bid_category: BidCategory,
    #[serde(default)]
    pub services: Vec<String>,
    pub publish_date: DateTime<Utc>,
    #[serde(default)]
    pub closing_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notified: bool,
    pub created_at: DateTime<Utc>,
}

impl NewBidAlert {
    pub fn from_candidate(c: BidCandidate, now: DateTime<Utc>) -> Self {
        Self {
            source: c.source,
            title: c.title,
            url: c.url,
            description: None,
            bid_category: c.bid_category,
            services: c.services,
            publish_date: c.publish_date,
            closing_date: None,
            notified: false,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidAlert {
    pub id: i64,
    pub source: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub bid_category: BidCategory,
    pub services: Vec<String>,
    pub publish_date: DateTime<Utc>,
    pub closing_date: Option<DateTime<Utc>>,
    pub notified: bool,
    pub created_at: DateTime<Utc>,
}

impl BidAlert {
    pub fn from_new(id: i64, n: NewBidAlert) -> Self {
        Self {
            id,
            source: n.source,
            title: n.title,
            url: n.url,
            description: n.description,
            bid_category: n.bid_category,
            services: n.services,
            publish_date: n.publish_date,
            closing_date: n.closing_date,
            notified: n.notified,
            created_at: n.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(BidAlert),
    AlreadyExists,
}

#[async_trait::async_trait]
pub trait BidStore: Send + Sync {
    /// Insert unless (url, title) already exists.
    async fn insert_if_unique(&self, alert: &NewBidAlert) -> Result<InsertOutcome>;

    /// Newest first (created_at desc, then id desc).
    async fn list_recent(&self, limit: usize) -> Result<Vec<BidAlert>>;

    /// Returns `false` when no alert has that id.
    async fn set_notified(&self, id: i64, notified: bool) -> Result<bool>;
}
