// Assignment cache with submission-dependent expiry
use crate::application::key_value_store::KeyValueStore;
use crate::domain::assignment::AssignmentData;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::sync::Arc;
use std::time::Duration;

pub const CACHE_KEY_PREFIX: &str = "assignment_";

pub fn cache_key(id: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, id)
}

/// Expiry per TTL class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub default_ttl: Duration,
    pub submitted_ttl: Duration,
}

impl CachePolicy {
    pub fn ttl_for(&self, data: &AssignmentData) -> Duration {
        if data.is_submitted {
            self.submitted_ttl
        } else {
            self.default_ttl
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_millis(60_000),
            submitted_ttl: Duration::from_millis(7 * 24 * 60 * 60 * 1000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(flatten)]
    pub data: AssignmentData,
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl CacheEntry {
    pub fn is_valid_at(&self, policy: &CachePolicy, now_ms: i64) -> bool {
        let ttl_ms = i64::try_from(policy.ttl_for(&self.data).as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(self.timestamp) < ttl_ms
    }
}

#[derive(Clone)]
pub struct AssignmentCache {
    store: Arc<dyn KeyValueStore>,
    policy: CachePolicy,
}

impl AssignmentCache {
    pub fn new(store: Arc<dyn KeyValueStore>, policy: CachePolicy) -> Self {
        Self { store, policy }
    }

    /// Valid entry for `id`, or `None` when absent, expired or unreadable.
    pub async fn get(&self, id: &str) -> Option<CacheEntry> {
        self.get_at(id, Utc::now().timestamp_millis()).await
    }

    pub async fn get_at(&self, id: &str, now_ms: i64) -> Option<CacheEntry> {
        let key = cache_key(id);
        let mut found = match self.store.get(std::slice::from_ref(&key)).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Cache read for {} failed, treating as miss: {}", id, e);
                return None;
            }
        };

        let raw = found.remove(&key)?;
        let entry: CacheEntry = match serde_json::from_value(raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Ignoring undecodable cache entry for {}: {}", id, e);
                return None;
            }
        };

        if entry.is_valid_at(&self.policy, now_ms) {
            Some(entry)
        } else {
            tracing::debug!("Cache entry for {} expired", id);
            None
        }
    }

    /// Overwrite the entry for `id`, stamped with the current time.
    pub async fn put(&self, id: &str, data: &AssignmentData) {
        self.put_at(id, data, Utc::now().timestamp_millis()).await
    }

    pub async fn put_at(&self, id: &str, data: &AssignmentData, now_ms: i64) {
        let entry = CacheEntry {
            data: data.clone(),
            timestamp: now_ms,
        };
        let value = match serde_json::to_value(&entry) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Could not encode cache entry for {}: {}", id, e);
                return;
            }
        };

        let mut entries = Map::new();
        entries.insert(cache_key(id), value);
        if let Err(e) = self.store.set(entries).await {
            tracing::warn!("Cache write for {} failed: {}", id, e);
        }
    }
}
