// JSON file backed key-value store
use crate::application::key_value_store::{KeyValueStore, StoreError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Stores every key in a single JSON object on disk.
///
/// Writes are read-modify-write under an async lock so concurrent `set`
/// calls from different fetch tasks never drop each other's keys.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> Result<Map<String, Value>, StoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice::<Value>(&raw)? {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::Corrupt(format!(
                "expected a JSON object in {}, found {}",
                self.path.display(),
                kind_name(&other)
            ))),
        }
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, keys: &[String]) -> Result<Map<String, Value>, StoreError> {
        let mut document = self.read_document().await?;
        Ok(keys
            .iter()
            .filter_map(|key| document.remove(key).map(|value| (key.clone(), value)))
            .collect())
    }

    async fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        document.extend(entries);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let encoded = serde_json::to_vec_pretty(&Value::Object(document))?;
        let staging = self.path.with_extension("tmp");
        tokio::fs::write(&staging, encoded).await?;
        tokio::fs::rename(&staging, &self.path).await?;

        tracing::debug!("Wrote store file {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "assignment-tracker-{}-{}.json",
            name,
            std::process::id()
        ))
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let store = JsonFileStore::new(scratch_path("missing"));
        let result = store.get(&["x".into()]).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_set_merges_keys() {
        let path = scratch_path("merge");
        let store = JsonFileStore::new(&path);

        let mut first = Map::new();
        first.insert("a".into(), json!(true));
        store.set(first).await.unwrap();
        let mut second = Map::new();
        second.insert("b".into(), json!({"timestamp": 1}));
        store.set(second).await.unwrap();

        let result = store.get(&["a".into(), "b".into()]).await.unwrap();
        assert_eq!(result["a"], json!(true));
        assert_eq!(result["b"]["timestamp"], json!(1));

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_non_object_document_is_corrupt() {
        let path = scratch_path("corrupt");
        std::fs::write(&path, "[1, 2]").unwrap();
        let store = JsonFileStore::new(&path);

        let err = store.get(&["a".into()]).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));

        let _ = std::fs::remove_file(path);
    }
}
