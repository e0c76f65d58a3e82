// src/error.rs
//! Error types at the crate seams. Application code wraps these in `anyhow`.

use thiserror::Error;

/// Transport-level failure of a single fetch attempt.
/// Every variant is retryable by the fallback orchestrator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("non-success status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(String),

    #[error("reading body failed: {0}")]
    Body(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else if e.is_body() || e.is_decode() {
            FetchError::Body(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Startup configuration problems. Fatal before the poll loop starts, never after.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing mandatory env var {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("sources file {path}: {message}")]
    Sources { path: String, message: String },
}

impl ConfigError {
    pub fn invalid(name: &'static str, value: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            value: value.into(),
        }
    }

    pub fn sources(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Sources {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_descriptive() {
        assert_eq!(
            ConfigError::Missing("TG_TOKEN").to_string(),
            "missing mandatory env var TG_TOKEN"
        );
        assert_eq!(FetchError::Status(503).to_string(), "non-success status 503");
        assert_eq!(
            ConfigError::invalid("POLL_INTERVAL_SECS", "abc").to_string(),
            "invalid value for POLL_INTERVAL_SECS: \"abc\""
        );
    }
}
