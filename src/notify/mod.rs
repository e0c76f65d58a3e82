// src/notify/mod.rs
//! Outgoing announcement delivery.

pub mod discord;
pub mod telegram;

use anyhow::{anyhow, Result};
use std::time::Duration;

use crate::ingest::types::Item;

/// Hard cap well below Telegram's 4096-char message limit.
pub const MAX_MESSAGE_CHARS: usize = 4000;

pub const MESSAGE_HEADER: &str = "🆕 New Listing Announcement";

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one announcement (title, date, url).
    async fn deliver(&self, item: &Item) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Sleep before retry `attempt` (1-based): 500ms doubling, capped at 32s.
pub(crate) fn backoff(attempt: u8) -> Duration {
    Duration::from_millis(500u64 << attempt.saturating_sub(1).min(6))
}

/// Cut `s` to at most `max` chars, marking the cut with an ellipsis.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Plain-text body shared by chat channels. The date line is omitted when unknown.
pub fn format_message(item: &Item) -> String {
    let mut text = format!("{MESSAGE_HEADER}\n\n{}\n", item.title());
    if !item.date().is_empty() {
        text.push_str(item.date());
        text.push('\n');
    }
    text.push_str(item.url());
    truncate_chars(&text, MAX_MESSAGE_CHARS)
}

/// Fans out to every configured channel. Fails if any channel failed,
/// after all of them were tried.
#[derive(Default)]
pub struct NotifierMux {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, n: impl Notifier + 'static) -> Self {
        self.channels.push(Box::new(n));
        self
    }

    pub fn push(&mut self, n: Box<dyn Notifier>) {
        self.channels.push(n);
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[async_trait::async_trait]
impl Notifier for NotifierMux {
    async fn deliver(&self, item: &Item) -> Result<()> {
        let mut failed = Vec::new();
        for ch in &self.channels {
            if let Err(e) = ch.deliver(item).await {
                tracing::warn!(target: "notify", channel = ch.name(), "delivery failed: {e:#}");
                failed.push(ch.name());
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("delivery failed on: {}", failed.join(", ")))
        }
    }

    fn name(&self) -> &'static str {
        "mux"
    }
}
