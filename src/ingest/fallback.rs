// src/ingest/fallback.rs
//! Ordered fallback across sources with bounded retries per source.
//!
//! Per source: `Fetching -> {Success, TransportFailure}`. A transport failure
//! loops back to `Fetching` until the attempt budget runs out (`Exhausted`).
//! A success is extracted; non-empty ends the walk, empty moves on to the
//! next source without retrying.

use metrics::counter;
use std::time::Duration;

use crate::error::FetchError;
use crate::ingest::fetch::Fetcher;
use crate::ingest::types::{Item, SourceDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fetch attempts per source, at least 1.
    pub attempts: usize,
    /// Sleep before the second attempt.
    pub base_delay: Duration,
    /// Added to the sleep for every further attempt.
    pub step: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            base_delay: Duration::from_secs(2),
            step: Duration::from_secs(1),
            timeout: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    /// Delay slept after failed attempt number `attempt` (1-based): 2s, 3s, 4s, ...
    pub fn delay_after(&self, attempt: usize) -> Duration {
        self.base_delay + self.step * (attempt.saturating_sub(1) as u32)
    }
}

/// Result of walking one source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    Hit(Vec<Item>),
    /// Fetched fine but nothing qualified (or the document did not parse).
    Miss,
    Exhausted { attempts: usize, last_error: FetchError },
}

/// First non-empty extraction, or empty `items` when every source was exhausted.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub source: Option<String>,
    pub items: Vec<Item>,
}

/// Walk one source through its retry budget.
pub async fn try_source<F: Fetcher + ?Sized>(
    fetcher: &F,
    source: &SourceDescriptor,
    policy: &RetryPolicy,
) -> SourceOutcome {
    let attempts = policy.attempts.max(1);
    let mut attempt = 0usize;
    loop {
        attempt += 1;
        counter!("listing_fetch_attempts_total", "source" => source.name.clone()).increment(1);

        match fetcher.fetch(&source.endpoint, policy.timeout).await {
            Ok(raw) => {
                return match crate::ingest::extract(source, &raw) {
                    Ok(items) if !items.is_empty() => SourceOutcome::Hit(items),
                    Ok(_) => SourceOutcome::Miss,
                    Err(e) => {
                        tracing::warn!(target: "ingest", source = %source.name, "extraction failed: {e:#}");
                        SourceOutcome::Miss
                    }
                };
            }
            Err(e) => {
                counter!("listing_fetch_failures_total", "source" => source.name.clone())
                    .increment(1);
                tracing::debug!(target: "ingest", source = %source.name, attempt, error = %e, "fetch attempt failed");
                if attempt >= attempts {
                    return SourceOutcome::Exhausted {
                        attempts: attempt,
                        last_error: e,
                    };
                }
                let delay = policy.delay_after(attempt);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Try sources in order; stop at the first one yielding items.
pub async fn fetch_first_available<F: Fetcher + ?Sized>(
    fetcher: &F,
    sources: &[SourceDescriptor],
    policy: &RetryPolicy,
) -> FetchOutcome {
    crate::ingest::ensure_metrics_described();

    for source in sources {
        match try_source(fetcher, source, policy).await {
            SourceOutcome::Hit(items) => {
                tracing::debug!(target: "ingest", source = %source.name, items = items.len(), "source answered");
                return FetchOutcome {
                    source: Some(source.name.clone()),
                    items,
                };
            }
            SourceOutcome::Miss => {
                counter!("listing_source_misses_total", "source" => source.name.clone())
                    .increment(1);
                tracing::info!(target: "ingest", source = %source.name, "no qualifying items, trying next source");
            }
            SourceOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                tracing::warn!(target: "ingest", source = %source.name, attempts, error = %last_error, "source exhausted");
            }
        }
    }
    FetchOutcome::default()
}
