// src/cursor.rs
//! Durable "last delivered identity" between runs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;

pub const DEFAULT_STATE_PATH: &str = "state.json";

#[async_trait::async_trait]
pub trait CursorStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>>;
    async fn store(&self, identity: &str) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StateFile {
    last_id: Option<String>,
}

/// JSON file `{"last_id": "..."}`. Written via temp file + rename.
#[derive(Debug, Clone)]
pub struct FileCursorStore {
    path: PathBuf,
}

impl FileCursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl CursorStore for FileCursorStore {
    /// Missing or unreadable JSON counts as "no cursor"; only I/O errors propagate.
    async fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(s) => match serde_json::from_str::<StateFile>(&s) {
                Ok(state) => Ok(state.last_id.filter(|id| !id.is_empty())),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), "corrupt state file, starting fresh: {e}");
                    Ok(None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", self.path.display())),
        }
    }

    async fn store(&self, identity: &str) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let state = StateFile {
            last_id: Some(identity.to_string()),
        };
        let body = serde_json::to_vec(&state).context("serializing state")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

/// In-process store; records every write.
#[derive(Debug, Default)]
pub struct MemoryCursorStore {
    current: Mutex<Option<String>>,
    pub writes: Mutex<Vec<String>>,
}

impl MemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cursor(identity: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(Some(identity.into())),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn current(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl CursorStore for MemoryCursorStore {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.current())
    }

    async fn store(&self, identity: &str) -> Result<()> {
        *self.current.lock().unwrap_or_else(|p| p.into_inner()) = Some(identity.to_string());
        self.writes
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(identity.to_string());
        Ok(())
    }
}
