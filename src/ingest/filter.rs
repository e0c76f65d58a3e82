// src/ingest/filter.rs
//! Headline classification: listing phrasing in, routine market updates out.

use once_cell::sync::Lazy;
use regex::Regex;

/// Fragments longer than this are article bodies, not headlines.
pub const MAX_HEADLINE_CHARS: usize = 220;

static RE_INCLUDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(will\s+list|to\s+list|lists|listed\s+on|new\s+listing)\b")
        .expect("include regex")
});

static RE_EXCLUDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(new\s+trading\s+pairs?|spot\s+trading|trading\s+pairs?|trading\s+bots?|margin\s+trading|perpetual\s+contracts?|perpetual\s+futures)\b",
    )
    .expect("exclude regex")
});

pub fn matches_listing(text: &str) -> bool {
    RE_INCLUDE.is_match(text)
}

pub fn matches_noise(text: &str) -> bool {
    RE_EXCLUDE.is_match(text)
}

/// Headline gate applied to already-normalized text.
pub fn is_listing_headline(text: &str) -> bool {
    if text.is_empty() || text.chars().count() > MAX_HEADLINE_CHARS {
        return false;
    }
    matches_listing(text) && !matches_noise(text)
}
