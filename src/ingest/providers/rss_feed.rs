// src/ingest/providers/rss_feed.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::counter;
use quick_xml::de::from_str;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::borrow::Cow;

use crate::ingest::candidate;
use crate::ingest::providers::format_date;
use crate::ingest::types::Item;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// RFC 2822 → display format; anything else is shown as-is.
fn display_date(raw: &str) -> String {
    DateTime::parse_from_rfc2822(raw.trim())
        .map(|dt| format_date(dt.with_timezone(&Utc)))
        .unwrap_or_else(|_| raw.trim().to_string())
}

static RE_NAMED_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]*);").expect("entity regex"));

/// quick-xml only knows the five XML entities. Every other named HTML entity is
/// decoded (and re-escaped for XML); names html-escape does not know become text.
fn scrub_html_entities_for_xml(s: &str) -> Cow<'_, str> {
    RE_NAMED_ENTITY.replace_all(s, |caps: &Captures<'_>| {
        let whole = &caps[0];
        match &caps[1] {
            "amp" | "lt" | "gt" | "quot" | "apos" => whole.to_string(),
            _ => {
                let decoded = html_escape::decode_html_entities(whole);
                if decoded == whole {
                    format!("&amp;{}", &whole[1..])
                } else {
                    html_escape::encode_text(&decoded).into_owned()
                }
            }
        }
    })
}

/// One `<item>` is one fragment; feed order is kept (feeds list newest first).
pub fn extract(raw: &str, feed_url: &str) -> Result<Vec<Item>> {
    let xml = scrub_html_entities_for_xml(raw);
    let rss: Rss = from_str(&xml).context("parsing rss xml")?;
    counter!("listing_fragments_total", "extractor" => "rss")
        .increment(rss.channel.item.len() as u64);

    let out = rss
        .channel
        .item
        .into_iter()
        .filter_map(|it| {
            let title = it.title?;
            let date = it.pub_date.as_deref().map(display_date).unwrap_or_default();
            candidate(&title, &date, it.link, feed_url)
        })
        .collect();
    Ok(out)
}
