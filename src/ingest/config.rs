// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::{ExtractorKind, SourceDescriptor};

pub const ENV_SOURCES_PATH: &str = "SOURCES_PATH";

pub const BINANCE_CMS_URL: &str = "https://www.binance.com/bapi/composite/v1/public/cms/article/list/query?type=1&pageNo=1&pageSize=20&catalogId=48";
pub const BINANCE_LIST_PAGE_URL: &str = "https://www.binance.com/en/support/announcement/list/48";
pub const RSS_MIRROR_URL: &str = "https://rsshub.app/binance/announcement/new-crypto-listings";

/// Built-in chain: structured API first, then the public page, then an RSS mirror.
pub fn default_sources() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor::new(
            "binance-cms",
            BINANCE_CMS_URL,
            ExtractorKind::BinanceCms {
                catalog_id: Some(48),
            },
        ),
        SourceDescriptor::new(
            "binance-list-page",
            BINANCE_LIST_PAGE_URL,
            ExtractorKind::HtmlAnchors,
        ),
        SourceDescriptor::new("rss-mirror", RSS_MIRROR_URL, ExtractorKind::Rss),
    ]
}

/// Load sources from an explicit path. Supports TOML (`[[sources]]`) or a JSON array.
pub fn load_sources_from(path: &Path) -> Result<Vec<SourceDescriptor>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let sources = parse_sources(&content, ext.as_str())?;
    validate(sources).with_context(|| format!("validating sources in {}", path.display()))
}

/// Load sources using env var + fallbacks:
/// 1) $SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) built-in defaults
pub fn load_sources_default() -> Result<Vec<SourceDescriptor>> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("SOURCES_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(default_sources())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<SourceDescriptor>> {
    if hint_ext == "toml" {
        return parse_toml(s);
    }
    if hint_ext == "json" {
        return parse_json(s);
    }
    parse_json(s).or_else(|_| parse_toml(s))
}

fn parse_toml(s: &str) -> Result<Vec<SourceDescriptor>> {
    #[derive(serde::Deserialize)]
    struct TomlSources {
        sources: Vec<SourceDescriptor>,
    }
    let v: TomlSources = toml::from_str(s).context("parsing sources toml")?;
    Ok(v.sources)
}

fn parse_json(s: &str) -> Result<Vec<SourceDescriptor>> {
    serde_json::from_str(s).context("parsing sources json")
}

/// Trim fields, reject empty lists, blank fields and duplicate names. Order is kept.
fn validate(items: Vec<SourceDescriptor>) -> Result<Vec<SourceDescriptor>> {
    if items.is_empty() {
        return Err(anyhow!("no sources configured"));
    }
    let mut names = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for mut it in items {
        it.name = it.name.trim().to_string();
        it.endpoint = it.endpoint.trim().to_string();
        if it.name.is_empty() || it.endpoint.is_empty() {
            return Err(anyhow!("source with empty name or endpoint"));
        }
        if !names.insert(it.name.clone()) {
            return Err(anyhow!("duplicate source name {:?}", it.name));
        }
        out.push(it);
    }
    Ok(out)
}
