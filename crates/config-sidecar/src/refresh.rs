//! Subscription-mode consumer: update stream → last known good value
//!
//! Drains the refresher's channel for as long as the producer lives. A
//! failed cycle is logged and skipped; it never stops the drain and never
//! clears the previously published value.

use crate::server::LatestBlob;
use blob_api_client::BlobUpdate;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Consume updates forever, publishing each successful value.
pub async fn publish_updates(mut update_rx: mpsc::Receiver<BlobUpdate>, latest: LatestBlob) {
    while let Some(update) = update_rx.recv().await {
        match update {
            BlobUpdate::Value(value) => {
                debug!(size = value.len(), "Publishing updated blob value");
                *latest.write().await = Some(value);
            }
            BlobUpdate::Failed(msg) => {
                warn!(error = %msg, "Poll cycle failed, keeping last known value");
            }
        }
    }
    info!("Update stream closed");
}
