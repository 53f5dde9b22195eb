// src/ingest/fetch.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::ingest::types::{BidSource, PageFetcher};

/// Plain GET per source. No retries; timeout only when configured.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, source: &BidSource) -> Result<String> {
        let mut req = self.client.get(&source.url);
        if let Some(t) = self.timeout {
            req = req.timeout(t);
        }
        let body = req
            .send()
            .await
            .with_context(|| format!("GET {}", source.url))?
            .error_for_status()
            .with_context(|| format!("non-2xx from {}", source.url))?
            .text()
            .await
            .with_context(|| format!("reading body of {}", source.url))?;
        Ok(body)
    }
}
