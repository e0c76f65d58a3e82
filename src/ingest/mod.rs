// src/ingest/mod.rs
pub mod config;
pub mod fallback;
pub mod fetch;
pub mod filter;
pub mod identity;
pub mod providers;
pub mod types;

use crate::ingest::types::{ExtractorKind, Item, SourceDescriptor};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// Upper bound on items carried through one cycle.
pub const MAX_ITEMS: usize = 20;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "listing_fetch_attempts_total",
            "Fetch attempts per source, including retries."
        );
        describe_counter!(
            "listing_fetch_failures_total",
            "Transport failures per source."
        );
        describe_counter!(
            "listing_source_misses_total",
            "Fetches that succeeded but extracted no qualifying items."
        );
        describe_counter!(
            "listing_fragments_total",
            "Candidate fragments seen by extractors."
        );
        describe_counter!(
            "listing_items_total",
            "Fragments that passed relevance filtering."
        );
        describe_histogram!("listing_extract_ms", "Extraction time in milliseconds.");
        describe_counter!("listing_delivered_total", "Items delivered to notifiers.");
        describe_counter!(
            "listing_delivery_failures_total",
            "Items whose delivery failed."
        );
        describe_counter!("listing_cycles_total", "Completed poll cycles.");
        describe_counter!("listing_cycle_errors_total", "Poll cycles that errored.");
        describe_gauge!(
            "listing_last_cycle_ts",
            "Unix ts when the poll loop last finished a cycle."
        );
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // “ ” ‘ ’ « » → ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // Trailing sentence punctuation only; brackets like "(FOO)" stay.
    while let Some(last) = out.chars().last() {
        if matches!(last, '!' | '?' | '.' | ',' | ':' | ';') || last.is_whitespace() {
            out.pop();
        } else {
            break;
        }
    }
    out
}

/// Collapse repeated identities (first occurrence wins, order kept) and cap at `max`.
pub fn dedup_items(items: Vec<Item>, max: usize) -> Vec<Item> {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut keep = Vec::with_capacity(items.len().min(max));
    for it in items {
        if keep.len() >= max {
            break;
        }
        if seen.insert(it.identity().to_string()) {
            keep.push(it);
        }
    }
    keep
}

/// Run the extractor configured for `source` over `raw`.
/// Returns items newest-first, already filtered.
pub fn extract(source: &SourceDescriptor, raw: &str) -> anyhow::Result<Vec<Item>> {
    ensure_metrics_described();
    let t0 = std::time::Instant::now();
    let out = match &source.extractor {
        ExtractorKind::BinanceCms { catalog_id } => {
            providers::binance_cms::extract(raw, *catalog_id)?
        }
        ExtractorKind::HtmlAnchors => providers::html_page::extract_anchors(raw, &source.endpoint),
        ExtractorKind::HtmlTable => providers::html_page::extract_table_rows(raw, &source.endpoint),
        ExtractorKind::Rss => providers::rss_feed::extract(raw, &source.endpoint)?,
    };
    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    metrics::histogram!("listing_extract_ms", "source" => source.name.clone()).record(ms);
    metrics::counter!("listing_items_total", "source" => source.name.clone())
        .increment(out.len() as u64);
    Ok(out)
}

/// Shared tail of every extractor: normalize, gate, build the item.
pub(crate) fn candidate(
    raw_title: &str,
    date: &str,
    link: Option<String>,
    fallback_url: &str,
) -> Option<Item> {
    let title = normalize_text(raw_title);
    if !filter::is_listing_headline(&title) {
        return None;
    }
    Some(Item::new(title, date.trim(), link, fallback_url))
}
