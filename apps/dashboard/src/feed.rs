use std::time::Duration;

use anyhow::Result;
use client_core::ChannelSubscription;
use serde_json::Value;
use tracing::{info, warn};

/// Participant channel that re-opens its subscription `retry` after it drops.
pub struct ChannelFeed {
    url: String,
    channel: String,
    retry: Duration,
    subscription: Option<ChannelSubscription>,
}

impl ChannelFeed {
    pub async fn connect(url: &str, channel: &str, retry: Duration) -> Result<Self> {
        let subscription = ChannelSubscription::open(url, channel).await?;
        Ok(Self {
            url: url.to_string(),
            channel: channel.to_string(),
            retry,
            subscription: Some(subscription),
        })
    }

    pub async fn next_payload(&mut self) -> Value {
        loop {
            if let Some(subscription) = self.subscription.as_mut() {
                if let Some(payload) = subscription.next_payload().await {
                    return payload;
                }
                if let Some(closed) = self.subscription.take() {
                    closed.close().await;
                }
                warn!(channel = %self.channel, retry_ms = self.retry.as_millis() as u64, "participant channel closed");
                tokio::time::sleep(self.retry).await;
            }

            match ChannelSubscription::open(&self.url, &self.channel).await {
                Ok(subscription) => {
                    info!(channel = %self.channel, "participant channel re-opened");
                    self.subscription = Some(subscription);
                }
                Err(error) => {
                    warn!(channel = %self.channel, %error, "failed to re-open participant channel");
                    tokio::time::sleep(self.retry).await;
                }
            }
        }
    }

    pub async fn close(self) {
        if let Some(subscription) = self.subscription {
            subscription.close().await;
        }
    }
}

#[cfg(test)]
#[path = "tests/feed_tests.rs"]
mod tests;
