// src/ingest/identity.rs
//! Content-derived identity tokens for items.

use sha2::{Digest, Sha256};

/// Hex SHA-256 of `text`. Always 64 lowercase hex chars.
pub fn digest_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Canonical form of a link: trimmed, no `#fragment`, no trailing slash.
pub fn normalize_link(link: &str) -> String {
    let t = link.trim();
    let t = t.split('#').next().unwrap_or(t);
    t.trim_end_matches('/').to_string()
}

/// Canonical form of a title: normalized text, lowercased.
pub fn normalize_title(title: &str) -> String {
    crate::ingest::normalize_text(title).to_lowercase()
}

/// Identity token: the link when present, otherwise the title.
pub fn identity_for(link: Option<&str>, title: &str) -> String {
    match link.map(normalize_link).filter(|l| !l.is_empty()) {
        Some(l) => digest_hex(&l),
        None => digest_hex(&normalize_title(title)),
    }
}
