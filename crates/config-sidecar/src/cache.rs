//! In-memory blob cache with per-key slots
//!
//! The store maps each key to a slot whose mutex serializes the whole
//! read-check-fetch-write sequence for that key. Lookups on distinct keys
//! never contend: the outer map lock is held only to find or insert a slot,
//! never across a remote fetch. Entries are created on first successful
//! fetch and live for the life of the process.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// A cached blob value with its revalidation token.
///
/// `value` and `validator` are only ever written together while the owning
/// slot's mutex is held, so a reader can never see a validator that belongs
/// to a different value.
#[derive(Debug, Clone)]
pub struct CachedBlob {
    pub value: Vec<u8>,
    pub validator: String,
    pub fetched_at: DateTime<Utc>,
}

impl CachedBlob {
    /// True while the blob may be served without contacting the remote API.
    pub fn is_fresh(&self, window: Duration, now: DateTime<Utc>) -> bool {
        now < self.fetched_at + window
    }
}

/// A key's cache slot. `None` until the first successful fetch.
pub type Slot = Arc<Mutex<Option<CachedBlob>>>;

/// Statistics about the cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Process-wide blob cache
#[derive(Default)]
pub struct CacheStore {
    slots: RwLock<HashMap<String, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStore {
    /// Create an empty cache store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the slot for a key, creating an empty one on first use.
    pub async fn slot(&self, key: &str) -> Slot {
        {
            let slots = self.slots.read().await;
            if let Some(slot) = slots.get(key) {
                return slot.clone();
            }
        }

        let mut slots = self.slots.write().await;
        // A racing caller may have inserted the slot between the locks.
        slots.entry(key.to_string()).or_default().clone()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of entry and hit/miss counts.
    pub async fn stats(&self) -> CacheStats {
        let slots = self.slots.read().await;
        let mut entries = 0;
        for slot in slots.values() {
            if slot.lock().await.is_some() {
                entries += 1;
            }
        }
        CacheStats {
            entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
