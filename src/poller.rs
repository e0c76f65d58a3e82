// src/poller.rs
//! Drives fetch → dedup → diff → deliver → persist on a fixed interval.

use anyhow::{Context, Result};
use metrics::{counter, gauge};
use std::time::Duration;
use tokio::time;

use crate::cursor::CursorStore;
use crate::delivery::plan_delivery;
use crate::ingest::fallback::{fetch_first_available, RetryPolicy};
use crate::ingest::fetch::Fetcher;
use crate::ingest::types::SourceDescriptor;
use crate::ingest::{dedup_items, MAX_ITEMS};
use crate::notify::Notifier;

/// What one cycle did; mostly for logs and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub source: Option<String>,
    pub fetched: usize,
    pub delivered: usize,
    pub failed: usize,
    pub rebaselined: bool,
    pub cursor_written: bool,
}

pub struct Poller {
    sources: Vec<SourceDescriptor>,
    fetcher: Box<dyn Fetcher>,
    notifier: Box<dyn Notifier>,
    store: Box<dyn CursorStore>,
    retry: RetryPolicy,
    interval: Duration,
}

impl Poller {
    pub fn new(
        sources: Vec<SourceDescriptor>,
        fetcher: Box<dyn Fetcher>,
        notifier: Box<dyn Notifier>,
        store: Box<dyn CursorStore>,
    ) -> Self {
        Self {
            sources,
            fetcher,
            notifier,
            store,
            retry: RetryPolicy::default(),
            interval: Duration::from_secs(crate::config::app::DEFAULT_POLL_INTERVAL_SECS),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// One full cycle. Delivery failures are counted, not returned; only
    /// cursor store errors surface as `Err`.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let outcome = fetch_first_available(&*self.fetcher, &self.sources, &self.retry).await;
        if outcome.items.is_empty() {
            tracing::warn!(target: "poller", sources = self.sources.len(), "all sources exhausted, nothing fetched");
            return Ok(CycleReport::default());
        }

        let items = dedup_items(outcome.items, MAX_ITEMS);
        let cursor = self.store.load().await.context("loading cursor")?;
        let plan = plan_delivery(&items, cursor.as_deref());

        let mut report = CycleReport {
            source: outcome.source,
            fetched: items.len(),
            rebaselined: plan.rebaselined,
            ..CycleReport::default()
        };

        if plan.rebaselined {
            tracing::info!(target: "poller", had_cursor = cursor.is_some(), "cursor not in current list, rebaselining without delivery");
        }

        for item in &plan.fresh {
            match self.notifier.deliver(item).await {
                Ok(()) => {
                    report.delivered += 1;
                    counter!("listing_delivered_total").increment(1);
                    tracing::info!(target: "poller", title = item.title(), url = item.url(), "delivered");
                }
                Err(e) => {
                    report.failed += 1;
                    counter!("listing_delivery_failures_total").increment(1);
                    tracing::warn!(target: "poller", title = item.title(), "delivery failed: {e:#}");
                }
            }
        }

        // Persisted even when some deliveries failed: at-least-once, no replay storms.
        if let Some(next) = plan.next_cursor {
            self.store.store(&next).await.context("storing cursor")?;
            report.cursor_written = true;
        }
        Ok(report)
    }

    /// Loop forever. A failed cycle is logged and retried on the next tick.
    pub async fn run(&self) {
        crate::ingest::ensure_metrics_described();
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.run_cycle().await {
                Ok(r) => {
                    counter!("listing_cycles_total").increment(1);
                    tracing::debug!(
                        target: "poller",
                        source = r.source.as_deref().unwrap_or("-"),
                        fetched = r.fetched,
                        delivered = r.delivered,
                        failed = r.failed,
                        rebaselined = r.rebaselined,
                        "cycle done"
                    );
                }
                Err(e) => {
                    counter!("listing_cycle_errors_total").increment(1);
                    tracing::warn!(target: "poller", "cycle failed: {e:#}");
                }
            }
            gauge!("listing_last_cycle_ts").set(chrono::Utc::now().timestamp() as f64);
        }
    }
}
