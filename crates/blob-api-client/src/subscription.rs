//! Polling subscription for a single blob
//!
//! Polls the remote API for one pinned key at a fixed interval and publishes
//! every cycle's outcome onto a channel. A failed cycle is an item on the
//! stream, never the end of it; the loop only stops once the receiving side
//! has gone away.

use crate::client::{BlobClient, BlobFetch};
use crate::error::Result;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// One poll cycle's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobUpdate {
    /// The blob's current value.
    Value(Vec<u8>),
    /// The cycle failed; the previous value remains authoritative.
    Failed(String),
}

/// Configuration for a blob subscription
pub struct SubscriptionConfig {
    /// Remote API endpoint URL
    pub endpoint: String,
    /// Bearer credential
    pub secret: String,
    /// The pinned key to poll
    pub key: String,
    /// Time between polls
    pub interval: Duration,
}

/// Subscription that polls one blob and streams updates
pub struct BlobSubscription {
    client: BlobClient,
    key: String,
    interval: Duration,
    update_tx: mpsc::Sender<BlobUpdate>,
}

impl BlobSubscription {
    /// Create a new subscription. This is the only fatal path: once
    /// constructed, `run` keeps going no matter what the remote does.
    pub fn new(config: SubscriptionConfig, update_tx: mpsc::Sender<BlobUpdate>) -> Result<Self> {
        let client = BlobClient::new(&config.endpoint, &config.secret)?;
        Ok(Self {
            client,
            key: config.key,
            interval: config.interval,
            update_tx,
        })
    }

    /// Poll forever, one full (unconditional) fetch per interval.
    pub async fn run(&mut self) {
        info!(key = %self.key, interval = ?self.interval, "Starting blob subscription");
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            ticker.tick().await;

            let update = match self.client.fetch(&self.key, None).await {
                Ok(BlobFetch::Changed { value, .. }) => {
                    debug!(key = %self.key, size = value.len(), "Poll cycle succeeded");
                    BlobUpdate::Value(value)
                }
                Ok(BlobFetch::Unchanged) => {
                    // Unreachable for an unconditional fetch; the client
                    // rejects a bare 304 before we get here.
                    BlobUpdate::Failed("unexpected not-modified response".to_string())
                }
                Ok(BlobFetch::Missing) => {
                    debug!(key = %self.key, "Poll cycle found no blob");
                    BlobUpdate::Failed(format!("blob {:?} not found", self.key))
                }
                Err(e) => {
                    debug!(key = %self.key, error = %e, "Poll cycle failed");
                    BlobUpdate::Failed(e.to_string())
                }
            };

            if self.update_tx.send(update).await.is_err() {
                info!(key = %self.key, "Update receiver dropped, stopping subscription");
                return;
            }
        }
    }
}
