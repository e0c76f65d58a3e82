// src/config/app.rs
use std::path::PathBuf;
use std::time::Duration;

use crate::cursor::DEFAULT_STATE_PATH;
use crate::error::ConfigError;
use crate::ingest::fallback::RetryPolicy;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_FETCH_ATTEMPTS: usize = 2;

/// Process configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram_token: String,
    pub telegram_chat_id: String,
    pub discord_webhook: Option<String>,
    pub poll_interval: Duration,
    pub retry: RetryPolicy,
    pub state_path: PathBuf,
    pub metrics_addr: Option<std::net::SocketAddr>,
    /// `DEBUG=1` (the default) turns on debug logs for this crate.
    pub debug: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as `from_env`, reading values through `get`.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let telegram_token = non_empty("TG_TOKEN").ok_or(ConfigError::Missing("TG_TOKEN"))?;
        let telegram_chat_id =
            non_empty("TG_CHAT_ID").ok_or(ConfigError::Missing("TG_CHAT_ID"))?;

        let poll_secs: u64 = parse_or("POLL_INTERVAL_SECS", non_empty("POLL_INTERVAL_SECS"), DEFAULT_POLL_INTERVAL_SECS)?;
        let timeout_secs: u64 = parse_or("FETCH_TIMEOUT_SECS", non_empty("FETCH_TIMEOUT_SECS"), DEFAULT_FETCH_TIMEOUT_SECS)?;
        let attempts: usize = parse_or("FETCH_ATTEMPTS", non_empty("FETCH_ATTEMPTS"), DEFAULT_FETCH_ATTEMPTS)?;

        let metrics_addr: Option<std::net::SocketAddr> = match non_empty("METRICS_ADDR") {
            Some(v) => Some(
                v.parse()
                    .map_err(|_| ConfigError::invalid("METRICS_ADDR", v))?,
            ),
            None => None,
        };

        let debug = get("DEBUG").map(|v| v.trim() == "1").unwrap_or(true);

        Ok(Self {
            telegram_token,
            telegram_chat_id,
            discord_webhook: non_empty("DISCORD_WEBHOOK_URL"),
            poll_interval: Duration::from_secs(poll_secs.max(1)),
            retry: RetryPolicy {
                attempts: attempts.max(1),
                timeout: Duration::from_secs(timeout_secs.max(1)),
                ..RetryPolicy::default()
            },
            state_path: non_empty("STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH)),
            metrics_addr,
            debug,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.parse().map_err(|_| ConfigError::invalid(name, v)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let m: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| m.get(k).cloned())
    }

    #[test]
    fn credentials_are_mandatory() {
        assert!(matches!(cfg(&[]), Err(ConfigError::Missing("TG_TOKEN"))));
        assert!(matches!(
            cfg(&[("TG_TOKEN", "t")]),
            Err(ConfigError::Missing("TG_CHAT_ID"))
        ));
        assert!(matches!(
            cfg(&[("TG_TOKEN", "  "), ("TG_CHAT_ID", "1")]),
            Err(ConfigError::Missing("TG_TOKEN"))
        ));
    }

    #[test]
    fn defaults_apply() {
        let c = cfg(&[("TG_TOKEN", "t"), ("TG_CHAT_ID", "1")]).unwrap();
        assert_eq!(c.poll_interval, Duration::from_secs(300));
        assert_eq!(c.retry.attempts, 2);
        assert_eq!(c.retry.timeout, Duration::from_secs(20));
        assert_eq!(c.state_path, PathBuf::from("state.json"));
        assert!(c.debug);
        assert!(c.discord_webhook.is_none());
        assert!(c.metrics_addr.is_none());
    }

    #[test]
    fn overrides_and_invalid_values() {
        let c = cfg(&[
            ("TG_TOKEN", "t"),
            ("TG_CHAT_ID", "1"),
            ("POLL_INTERVAL_SECS", "0"),
            ("FETCH_ATTEMPTS", "3"),
            ("DEBUG", "0"),
            ("METRICS_ADDR", "127.0.0.1:9000"),
        ])
        .unwrap();
        assert_eq!(c.poll_interval, Duration::from_secs(1));
        assert_eq!(c.retry.attempts, 3);
        assert!(!c.debug);
        assert_eq!(c.metrics_addr.unwrap().port(), 9000);

        let bad = cfg(&[("TG_TOKEN", "t"), ("TG_CHAT_ID", "1"), ("POLL_INTERVAL_SECS", "soon")]);
        assert!(matches!(
            bad,
            Err(ConfigError::Invalid {
                name: "POLL_INTERVAL_SECS",
                ..
            })
        ));
    }
}
