// Persistent key-value store trait
use async_trait::async_trait;
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backing document exists but is not a JSON object.
    #[error("store is corrupt: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the requested keys. Absent keys are left out of the result.
    async fn get(&self, keys: &[String]) -> Result<Map<String, Value>, StoreError>;

    /// Write every entry of `entries`, replacing existing values.
    async fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError>;
}
