// tests/common/mod.rs
// Scripted doubles shared by the integration tests.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use listing_watch::cursor::CursorStore;
use listing_watch::error::FetchError;
use listing_watch::ingest::fetch::Fetcher;
use listing_watch::{Item, Notifier};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays canned responses per endpoint; the last one repeats forever.
#[derive(Default, Clone)]
pub struct ScriptedFetcher {
    script: Arc<Mutex<HashMap<String, VecDeque<Result<String, FetchError>>>>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, endpoint: &str, responses: Vec<Result<String, FetchError>>) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), responses.into());
        self
    }

    pub fn set(&self, endpoint: &str, responses: Vec<Result<String, FetchError>>) {
        self.script
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), responses.into());
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls.lock().unwrap().get(endpoint).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, endpoint: &str, _timeout: Duration) -> Result<String, FetchError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_default() += 1;

        let mut script = self.script.lock().unwrap();
        let Some(queue) = script.get_mut(endpoint) else {
            return Err(FetchError::Connect(format!("no script for {endpoint}")));
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or(Err(FetchError::Status(404)))
        }
    }
}

/// Records delivered titles; optionally fails for titles containing a marker.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    pub delivered: Arc<Mutex<Vec<String>>>,
    pub fail_on: Option<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            delivered: Arc::default(),
            fail_on: Some(marker.to_string()),
        }
    }

    pub fn titles(&self) -> Vec<String> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, item: &Item) -> Result<()> {
        if let Some(m) = &self.fail_on {
            if item.title().contains(m.as_str()) {
                return Err(anyhow!("chat api unavailable"));
            }
        }
        self.delivered.lock().unwrap().push(item.title().to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Cursor store that can be told to fail on load, on store, or both.
#[derive(Default, Clone)]
pub struct BrokenStore {
    pub fail_load: bool,
    pub fail_store: bool,
    pub loads: Arc<Mutex<usize>>,
    pub stored: Arc<Mutex<Vec<String>>>,
}

impl BrokenStore {
    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    pub fn failing_store() -> Self {
        Self {
            fail_store: true,
            ..Self::default()
        }
    }

    pub fn loads(&self) -> usize {
        *self.loads.lock().unwrap()
    }
}

#[async_trait]
impl CursorStore for BrokenStore {
    async fn load(&self) -> Result<Option<String>> {
        *self.loads.lock().unwrap() += 1;
        if self.fail_load {
            return Err(anyhow!("state file unreadable"));
        }
        Ok(None)
    }

    async fn store(&self, identity: &str) -> Result<()> {
        if self.fail_store {
            return Err(anyhow!("disk full"));
        }
        self.stored.lock().unwrap().push(identity.to_string());
        Ok(())
    }
}

/// RSS document with the given titles, newest first.
pub fn rss_with(titles: &[&str]) -> String {
    let items: String = titles
        .iter()
        .map(|t| {
            let slug = t.to_lowercase().replace(' ', "-");
            format!("<item><title>{t}</title><link>https://feed.test/{slug}</link></item>")
        })
        .collect();
    format!("<rss version=\"2.0\"><channel><title>t</title>{items}</channel></rss>")
}

pub fn no_delay() -> listing_watch::ingest::fallback::RetryPolicy {
    listing_watch::ingest::fallback::RetryPolicy {
        attempts: 2,
        base_delay: Duration::ZERO,
        step: Duration::ZERO,
        timeout: Duration::from_secs(1),
    }
}
