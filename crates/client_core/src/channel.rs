use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use shared::protocol::ChannelFrame;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::ClientError;

const PAYLOAD_BUFFER: usize = 64;

/// Maps an http(s) base url onto its ws(s) counterpart; ws(s) urls are kept.
pub fn channel_ws_url(raw: &str) -> Result<Url> {
    let mut url =
        Url::parse(raw).map_err(|_| ClientError::InvalidChannelUrl(raw.to_string()))?;
    let scheme = match url.scheme() {
        "ws" | "wss" => return Ok(url),
        "http" => "ws",
        "https" => "wss",
        _ => return Err(ClientError::InvalidChannelUrl(raw.to_string()).into()),
    };
    url.set_scheme(scheme)
        .map_err(|_| ClientError::InvalidChannelUrl(raw.to_string()))?;
    Ok(url)
}

/// Payload carried by a text frame, if it belongs to `channel`. Frames that
/// are not envelopes are passed through as raw JSON text.
pub(crate) fn route_frame(channel: &str, text: String) -> Option<Value> {
    match serde_json::from_str::<ChannelFrame>(&text) {
        Ok(ChannelFrame::Message {
            channel: from,
            data,
        }) if from == channel => Some(data),
        Ok(_) => None,
        Err(_) => Some(Value::String(text)),
    }
}

/// Live subscription. Dropping it (or calling [`ChannelSubscription::close`])
/// sends an unsubscribe for the same channel and closes the socket.
pub struct ChannelSubscription {
    channel: String,
    payloads: mpsc::Receiver<Value>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ChannelSubscription {
    pub async fn open(url: &str, channel: &str) -> Result<Self> {
        let ws_url = channel_ws_url(url)?;
        let (ws_stream, _) = connect_async(ws_url.as_str())
            .await
            .with_context(|| format!("failed to connect channel websocket: {ws_url}"))?;
        let (mut writer, mut reader) = ws_stream.split();

        let subscribe = serde_json::to_string(&ChannelFrame::Subscribe {
            channel: channel.to_string(),
        })?;
        writer
            .send(Message::Text(subscribe))
            .await
            .context("failed to send subscribe frame")?;
        info!(channel, url = %ws_url, "subscribed to channel");

        let (payload_tx, payloads) = mpsc::channel(PAYLOAD_BUFFER);
        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
        let task_channel = channel.to_string();
        let task = tokio::spawn(async move {
            let channel = task_channel;
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    msg = reader.next() => match msg {
                        Some(Ok(Message::Text(text))) => {
                            let Some(payload) = route_frame(&channel, text) else {
                                continue;
                            };
                            if payload_tx.send(payload).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!(channel = %channel, "channel socket closed by peer");
                            return;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            warn!(channel = %channel, %err, "channel receive failed");
                            return;
                        }
                    }
                }
            }

            match serde_json::to_string(&ChannelFrame::Unsubscribe {
                channel: channel.clone(),
            }) {
                Ok(frame) => {
                    if let Err(err) = writer.send(Message::Text(frame)).await {
                        debug!(channel = %channel, %err, "unsubscribe frame not delivered");
                    }
                }
                Err(err) => warn!(channel = %channel, %err, "failed to encode unsubscribe frame"),
            }
            let _ = writer.close().await;
            info!(channel = %channel, "unsubscribed from channel");
        });

        Ok(Self {
            channel: channel.to_string(),
            payloads,
            shutdown,
            task,
        })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Next payload for this channel; `None` once the socket is gone.
    pub async fn next_payload(&mut self) -> Option<Value> {
        self.payloads.recv().await
    }

    pub async fn close(self) {
        let Self {
            payloads,
            shutdown,
            task,
            ..
        } = self;
        drop(payloads);
        let _ = shutdown.send(());
        let _ = task.await;
    }
}

#[cfg(test)]
#[path = "tests/channel_tests.rs"]
mod tests;
