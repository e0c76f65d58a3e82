// src/ingest/providers/binance_cms.rs
//! Binance CMS article-list API (`/bapi/composite/v1/public/cms/article/list/query`).
//! One article is one candidate fragment.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Deserialize;

use crate::ingest::candidate;
use crate::ingest::providers::format_date;
use crate::ingest::types::Item;

pub const ARTICLE_BASE_URL: &str = "https://www.binance.com/en/support/announcement";

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<Data>,
}

#[derive(Debug, Deserialize, Default)]
struct Data {
    #[serde(default)]
    catalogs: Vec<Catalog>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Catalog {
    catalog_id: Option<u64>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    code: Option<String>,
    title: Option<String>,
    release_date: Option<i64>,
    publish_date: Option<i64>,
}

impl Article {
    fn date(&self) -> String {
        self.release_date
            .or(self.publish_date)
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(format_date)
            .unwrap_or_default()
    }

    fn link(&self) -> Option<String> {
        self.code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| format!("{ARTICLE_BASE_URL}/{c}"))
    }
}

/// Parse the API response. `catalog_id` restricts to one catalog when set.
pub fn extract(raw: &str, catalog_id: Option<u64>) -> Result<Vec<Item>> {
    let env: Envelope = serde_json::from_str(raw).context("parsing binance cms json")?;
    let data = env.data.unwrap_or_default();

    let fallback = match catalog_id {
        Some(id) => format!("{ARTICLE_BASE_URL}/list/{id}"),
        None => ARTICLE_BASE_URL.to_string(),
    };

    let mut articles: Vec<Article> = data.articles;
    for cat in data.catalogs {
        if catalog_id.is_none() || cat.catalog_id == catalog_id {
            articles.extend(cat.articles);
        }
    }
    counter!("listing_fragments_total", "extractor" => "binance_cms")
        .increment(articles.len() as u64);

    let out = articles
        .iter()
        .filter_map(|a| {
            let title = a.title.as_deref()?;
            candidate(title, &a.date(), a.link(), &fallback)
        })
        .collect();
    Ok(out)
}
