use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{backoff, truncate_chars, Notifier, MESSAGE_HEADER};
use crate::ingest::types::Item;

/// Discord caps embed descriptions at 4096 chars.
const MAX_DESCRIPTION_CHARS: usize = 4000;

/// Optional mirror of the Telegram feed into a Discord channel webhook.
#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl DiscordNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    async fn post(&self, payload: &DiscordWebhookPayload) -> Result<()> {
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.webhook)
                .timeout(self.timeout)
                .json(payload)
                .send()
                .await;

            match res {
                Ok(rsp) => {
                    if let Err(e) = rsp.error_for_status_ref() {
                        if attempt < self.max_retries {
                            tokio::time::sleep(backoff(attempt)).await;
                            continue;
                        }
                        return Err(anyhow!("Discord webhook HTTP error: {}", e.without_url()));
                    }
                    return Ok(());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(backoff(attempt)).await;
                        continue;
                    }
                    return Err(anyhow!("Discord webhook request failed: {}", e.without_url()));
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn deliver(&self, item: &Item) -> Result<()> {
        self.post(&DiscordWebhookPayload::for_item(item)).await
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

#[derive(Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    url: String,
}

#[derive(Serialize)]
struct DiscordWebhookPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    fn for_item(item: &Item) -> Self {
        let description = if item.date().is_empty() {
            item.title().to_string()
        } else {
            format!("{}\n**Date:** {}", item.title(), item.date())
        };
        Self {
            content: None,
            embeds: vec![DiscordEmbed {
                title: MESSAGE_HEADER.to_string(),
                description: truncate_chars(&description, MAX_DESCRIPTION_CHARS),
                url: item.url().to_string(),
            }],
        }
    }
}
