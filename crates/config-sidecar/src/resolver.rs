//! Fetch orchestration: freshness check, conditional revalidation, write-back
//!
//! `resolve` holds the key's cache slot lock across the whole sequence, so
//! concurrent requests for the same stale key queue up behind a single
//! remote fetch instead of racing each other to the write-back.

use crate::cache::{CacheStore, CachedBlob};
use crate::error::Result;
use blob_api_client::{BlobClient, BlobFetch};
use chrono::{Duration, Utc};
use tracing::{info, warn};

/// Resolves blob values through the cache, revalidating when stale
pub struct BlobResolver {
    cache: CacheStore,
    client: BlobClient,
    fresh: Duration,
}

impl BlobResolver {
    pub fn new(client: BlobClient, fresh_secs: u64) -> Self {
        Self {
            cache: CacheStore::new(),
            client,
            fresh: Duration::seconds(fresh_secs as i64),
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Resolve a key to its current blob value.
    ///
    /// `Ok(None)` means the remote reports no such blob; that is a valid
    /// outcome, not a failure. On any error the cache is left untouched and
    /// the previously cached value stays authoritative for later requests.
    pub async fn resolve(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let slot = self.cache.slot(key).await;
        let mut cached = slot.lock().await;

        if let Some(blob) = cached.as_ref() {
            let expiry = blob.fetched_at + self.fresh;
            let now = Utc::now();
            if now < expiry {
                info!(key, remain = %(expiry - now), "Blob is still fresh, not fetching");
                self.cache.record_hit();
                return Ok(Some(blob.value.clone()));
            }
        }
        self.cache.record_miss();

        let validator = cached.as_ref().map(|b| b.validator.clone());
        match self.client.fetch(key, validator.as_deref()).await? {
            BlobFetch::Unchanged => match cached.as_mut() {
                Some(blob) => {
                    info!(key, "Blob fetched and unchanged");
                    blob.fetched_at = Utc::now();
                    Ok(Some(blob.value.clone()))
                }
                None => {
                    // The client only reports Unchanged for a conditional
                    // request, and the slot lock keeps the entry in place.
                    Err(blob_api_client::BlobClientError::UnexpectedNotModified.into())
                }
            },
            BlobFetch::Missing => {
                warn!(key, "Blob not found");
                Ok(None)
            }
            BlobFetch::Changed { value, validator } => {
                info!(key, size = value.len(), "Blob fetched and updated");
                *cached = Some(CachedBlob {
                    value: value.clone(),
                    validator,
                    fetched_at: Utc::now(),
                });
                Ok(Some(value))
            }
        }
    }
}
