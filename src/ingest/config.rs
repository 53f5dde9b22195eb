// src/ingest/config.rs
use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::ingest::types::BidSource;

pub const ENV_PATH: &str = "BID_SOURCES_PATH";

/// Built-in source list, used when no file is configured.
pub fn default_sources() -> Vec<BidSource> {
    vec![
        BidSource::new("https://mof.gov.sl/", "Ministry of Finance"),
        BidSource::new("https://mowpa.gov.sl/", "Ministry of Works"),
        BidSource::new("https://mohs.gov.sl/", "Ministry of Health"),
        BidSource::new("https://mbsse.gov.sl/", "Ministry of Education"),
        BidSource::new("https://mlgrd.gov.sl/", "Local Government"),
        BidSource::new("https://nppa.gov.sl/", "NPPA"),
        BidSource::new(
            "https://www.tendersinfo.com/global-sierra-leone-tenders.php",
            "TendersInfo",
        ),
    ]
}

/// Load sources from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<Vec<BidSource>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading bid sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
        .with_context(|| format!("parsing bid sources from {}", path.display()))
}

/// Load sources using env var + fallbacks:
/// 1) $BID_SOURCES_PATH
/// 2) config/bid_sources.toml
/// 3) config/bid_sources.json
/// 4) built-in list
pub fn load_sources_default() -> Result<Vec<BidSource>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        }
        return Err(anyhow!("{ENV_PATH} points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/bid_sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/bid_sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(default_sources())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<BidSource>> {
    let raw = match hint_ext {
        "toml" => parse_toml(s)?,
        "json" => parse_json(s)?,
        // No usable extension: `[[sources]]` is TOML, a bare `[` is a JSON array.
        _ => {
            let head = s.trim_start();
            if head.starts_with('[') && !head.starts_with("[[") {
                parse_json(s)?
            } else {
                parse_toml(s)?
            }
        }
    };
    clean_list(raw)
}

fn parse_toml(s: &str) -> Result<Vec<BidSource>> {
    #[derive(serde::Deserialize)]
    struct TomlSources {
        sources: Vec<BidSource>,
    }
    let v: TomlSources = toml::from_str(s)?;
    Ok(v.sources)
}

fn parse_json(s: &str) -> Result<Vec<BidSource>> {
    let v: Vec<BidSource> = serde_json::from_str(s)?;
    Ok(v)
}

/// Trim, drop blanks, drop repeated URLs (first wins), validate http(s).
fn clean_list(items: Vec<BidSource>) -> Result<Vec<BidSource>> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let url = it.url.trim();
        let name = it.name.trim();
        if url.is_empty() || name.is_empty() {
            continue;
        }
        let parsed = Url::parse(url).with_context(|| format!("invalid source url {url:?}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("source url must be http(s): {url}");
        }
        if seen.insert(url.to_string()) {
            out.push(BidSource::new(url, name));
        }
    }
    Ok(out)
}
