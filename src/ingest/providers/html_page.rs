// src/ingest/providers/html_page.rs
//! HTML announcement pages. Two fragment shapes: anchors/headings and table rows.

use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::ingest::candidate;
use crate::ingest::types::Item;

static SEL_ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a, h1, h2, h3").expect("anchor selector"));
static SEL_A: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("a selector"));
static SEL_ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("row selector"));
static SEL_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td, th").expect("cell selector"));
static RE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("date regex"));

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

/// Resolve `href` against the page URL. Script and in-page links are not links.
fn resolve_href(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    match base {
        Some(b) => b.join(href).ok().map(|u| u.to_string()),
        None => Url::parse(href).ok().map(|u| u.to_string()),
    }
}

/// An anchor's own href; for a heading, the anchor wrapping it (card layouts)
/// and then the first anchor inside it.
fn own_link(el: &ElementRef<'_>, base: Option<&Url>) -> Option<String> {
    if el.value().name() == "a" {
        return el.value().attr("href").and_then(|h| resolve_href(base, h));
    }
    let enclosing = el
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "a" && a.value().attr("href").is_some())
        .and_then(|a| a.value().attr("href"))
        .and_then(|h| resolve_href(base, h));
    if enclosing.is_some() {
        return enclosing;
    }
    el.select(&SEL_A)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|h| resolve_href(base, h))
}

/// Every `a` and `h1`-`h3` element is one fragment, in document order.
pub fn extract_anchors(raw: &str, page_url: &str) -> Vec<Item> {
    let doc = Html::parse_document(raw);
    let base = Url::parse(page_url).ok();

    let mut seen = 0u64;
    let mut out = Vec::new();
    for el in doc.select(&SEL_ANCHORS) {
        seen += 1;
        let link = own_link(&el, base.as_ref());
        if let Some(item) = candidate(&element_text(&el), "", link, page_url) {
            out.push(item);
        }
    }
    counter!("listing_fragments_total", "extractor" => "html_anchors").increment(seen);
    out
}

/// Every `tr` is one fragment. A trailing `YYYY-MM-DD...` cell becomes the date.
pub fn extract_table_rows(raw: &str, page_url: &str) -> Vec<Item> {
    let doc = Html::parse_document(raw);
    let base = Url::parse(page_url).ok();

    let mut seen = 0u64;
    let mut out = Vec::new();
    for row in doc.select(&SEL_ROW) {
        seen += 1;
        let mut cells: Vec<String> = row
            .select(&SEL_CELL)
            .map(|c| crate::ingest::normalize_text(&element_text(&c)))
            .filter(|t| !t.is_empty())
            .collect();

        let date = match cells.last() {
            Some(last) if RE_DATE.is_match(last) => cells.pop().unwrap_or_default(),
            _ => String::new(),
        };

        let link = row
            .select(&SEL_A)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|h| resolve_href(base.as_ref(), h));

        if let Some(item) = candidate(&cells.join(" "), &date, link, page_url) {
            out.push(item);
        }
    }
    counter!("listing_fragments_total", "extractor" => "html_table").increment(seen);
    out
}
