use std::{sync::Arc, time::Duration};

use attendance::AttendanceBoard;
use client_core::ChannelSubscription;
use tracing::{info, warn};

/// Forwards every payload until the subscription ends. Returns how many were forwarded.
pub(crate) async fn forward(subscription: &mut ChannelSubscription, board: &AttendanceBoard) -> usize {
    let mut forwarded = 0;
    while let Some(payload) = subscription.next_payload().await {
        // Rejected payloads are already logged by the board; the next snapshot replaces them.
        let _ = board.ingest(payload).await;
        forwarded += 1;
    }
    forwarded
}

/// Keeps one subscription open, re-opening it `retry` after it drops.
pub(crate) async fn run(url: String, channel: String, board: Arc<AttendanceBoard>, retry: Duration) {
    loop {
        match ChannelSubscription::open(&url, &channel).await {
            Ok(mut subscription) => {
                let forwarded = forward(&mut subscription, &board).await;
                warn!(%url, %channel, forwarded, "upstream channel ended");
                subscription.close().await;
            }
            Err(error) => warn!(%url, %channel, %error, "failed to subscribe to upstream channel"),
        }
        info!(retry_ms = retry.as_millis() as u64, "re-opening upstream channel");
        tokio::time::sleep(retry).await;
    }
}
