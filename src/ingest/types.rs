// src/ingest/types.rs
use serde::{Deserialize, Serialize};

use crate::ingest::identity::identity_for;

/// One candidate announcement. Immutable once built; equality of `identity`
/// means "same announcement" regardless of the other fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    identity: String,
    title: String,
    date: String,
    url: String,
}

impl Item {
    /// Build an item from an extracted fragment.
    ///
    /// `link` is the fragment's own link, if it had one. Identity is derived from
    /// it when present, otherwise from the title. `fallback_url` is shown to the
    /// user when the fragment carried no link (usually the source endpoint).
    pub fn new(
        title: impl Into<String>,
        date: impl Into<String>,
        link: Option<String>,
        fallback_url: &str,
    ) -> Self {
        let title = title.into();
        let link = link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty());
        let identity = identity_for(link.as_deref(), &title);
        Self {
            identity,
            title,
            date: date.into(),
            url: link.unwrap_or_else(|| fallback_url.to_string()),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Display date; empty when the source did not expose one.
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// How a source's raw document is turned into items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractorKind {
    /// Binance CMS article-list JSON (`data.catalogs[].articles[]`).
    BinanceCms {
        #[serde(default)]
        catalog_id: Option<u64>,
    },
    /// Anchors and h1-h3 headings of an HTML page.
    HtmlAnchors,
    /// Table rows of an HTML page.
    HtmlTable,
    /// RSS 2.0 `channel/item` entries.
    Rss,
}

/// Static description of one upstream origin. List order is fallback priority.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub name: String,
    pub endpoint: String,
    pub extractor: ExtractorKind,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, extractor: ExtractorKind) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            extractor,
        }
    }
}
