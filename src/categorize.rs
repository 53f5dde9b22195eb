// src/categorize.rs
//! Keyword categorizer: maps anchor text to a bid category plus the matched
//! service keywords. Categories are checked in table order and the first one
//! with at least one keyword hit wins.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BidCategory {
    Communication,
    Connectivity,
    Collaboration,
    #[serde(rename = "ICT")]
    Ict,
}

impl BidCategory {
    pub const ALL: [BidCategory; 4] = [
        BidCategory::Communication,
        BidCategory::Connectivity,
        BidCategory::Collaboration,
        BidCategory::Ict,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BidCategory::Communication => "Communication",
            BidCategory::Connectivity => "Connectivity",
            BidCategory::Collaboration => "Collaboration",
            BidCategory::Ict => "ICT",
        }
    }
}

impl fmt::Display for BidCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BidCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BidCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow!("unknown bid category: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categorization {
    pub category: BidCategory,
    /// Matched keywords, in table order.
    pub services: Vec<String>,
}

/// Ordered category → keyword table. Keywords are stored lowercase.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    entries: Vec<(BidCategory, Vec<String>)>,
}

impl CategoryTable {
    pub fn new<I, K, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (BidCategory, K)>,
        K: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|(cat, kws)| {
                let kws = kws
                    .into_iter()
                    .map(|k| k.as_ref().trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                (cat, kws)
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[(BidCategory, Vec<String>)] {
        &self.entries
    }

    /// Classify `text`. Returns `None` when no category has a keyword hit.
    pub fn categorize(&self, text: &str) -> Option<Categorization> {
        let haystack = text.to_lowercase();
        if haystack.trim().is_empty() {
            return None;
        }

        for (category, keywords) in &self.entries {
            let services: Vec<String> = keywords
                .iter()
                .filter(|k| haystack.contains(k.as_str()))
                .cloned()
                .collect();
            if !services.is_empty() {
                return Some(Categorization {
                    category: *category,
                    services,
                });
            }
        }
        None
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        CategoryTable::new([
            (
                BidCategory::Communication,
                vec![
                    "mobile",
                    "postpaid",
                    "prepaid",
                    "cug",
                    "group communication",
                    "telecom",
                ],
            ),
            (
                BidCategory::Connectivity,
                vec![
                    "internet",
                    "vpn",
                    "speedbox",
                    "airbox",
                    "m2m",
                    "connectivity",
                    "network",
                ],
            ),
            (
                BidCategory::Collaboration,
                vec!["sms", "toll free", "short code", "ussd", "apn", "pabx"],
            ),
            (
                BidCategory::Ict,
                vec![
                    "security",
                    "networking",
                    "virtualization",
                    "it services",
                    "cloud",
                    "infrastructure",
                ],
            ),
        ])
    }
}
