// src/store/memory.rs
use std::sync::Mutex;

use anyhow::{anyhow, Result};

use super::{BidAlert, BidStore, InsertOutcome, NewBidAlert};

/// Process-local store with the same uniqueness rule as the SQLite one.
#[derive(Debug, Default)]
pub struct MemoryBidStore {
    inner: Mutex<Vec<BidAlert>>,
}

impl MemoryBidStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<BidAlert> {
        self.inner.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl BidStore for MemoryBidStore {
    async fn insert_if_unique(&self, alert: &NewBidAlert) -> Result<InsertOutcome> {
        let mut v = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory store mutex poisoned"))?;
        if v.iter().any(|a| a.url == alert.url && a.title == alert.title) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        let id = v.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let row = BidAlert::from_new(id, alert.clone());
        v.push(row.clone());
        Ok(InsertOutcome::Inserted(row))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<BidAlert>> {
        let mut rows = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory store mutex poisoned"))?
            .clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn set_notified(&self, id: i64, notified: bool) -> Result<bool> {
        let mut v = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory store mutex poisoned"))?;
        match v.iter_mut().find(|a| a.id == id) {
            Some(a) => {
                a.notified = notified;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
