// Display settings persistence on top of the key-value store
use crate::application::key_value_store::{KeyValueStore, StoreError};
use crate::domain::settings::{DisplaySettings, ENABLE_SUMMARY_KEY, SHOW_CONTENT_KEY, URGENT_THRESHOLD_KEY};
use serde_json::{Map, Value};

/// Saved settings, with `defaults` filling any key that is absent or of the
/// wrong type. A store failure yields the defaults.
pub async fn load_display_settings(store: &dyn KeyValueStore, defaults: DisplaySettings) -> DisplaySettings {
    let keys = [SHOW_CONTENT_KEY, URGENT_THRESHOLD_KEY, ENABLE_SUMMARY_KEY].map(String::from);
    let saved = match store.get(&keys).await {
        Ok(saved) => saved,
        Err(e) => {
            tracing::warn!("Could not read display settings, using defaults: {}", e);
            return defaults;
        }
    };

    DisplaySettings {
        show_content: saved
            .get(SHOW_CONTENT_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(defaults.show_content),
        urgent_threshold_hours: saved
            .get(URGENT_THRESHOLD_KEY)
            .and_then(Value::as_u64)
            .and_then(|hours| u32::try_from(hours).ok())
            .unwrap_or(defaults.urgent_threshold_hours),
        enable_summary: saved
            .get(ENABLE_SUMMARY_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(defaults.enable_summary),
    }
}

pub async fn save_display_settings(store: &dyn KeyValueStore, settings: &DisplaySettings) -> Result<(), StoreError> {
    let mut entries = Map::new();
    entries.insert(SHOW_CONTENT_KEY.to_string(), Value::from(settings.show_content));
    entries.insert(URGENT_THRESHOLD_KEY.to_string(), Value::from(settings.urgent_threshold_hours));
    entries.insert(ENABLE_SUMMARY_KEY.to_string(), Value::from(settings.enable_summary));
    store.set(entries).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory_store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_absent_keys_fall_back_to_defaults() {
        let mut seeded = Map::new();
        seeded.insert(SHOW_CONTENT_KEY.into(), json!(false));
        seeded.insert(URGENT_THRESHOLD_KEY.into(), json!("soon"));
        let store = MemoryStore::with_entries(seeded);

        let settings = load_display_settings(&store, DisplaySettings::default()).await;
        assert!(!settings.show_content);
        assert_eq!(settings.urgent_threshold_hours, 72);
        assert!(settings.enable_summary);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemoryStore::new();
        let wanted = DisplaySettings {
            show_content: false,
            urgent_threshold_hours: 12,
            enable_summary: false,
        };
        save_display_settings(&store, &wanted).await.unwrap();

        assert_eq!(load_display_settings(&store, DisplaySettings::default()).await, wanted);
        assert_eq!(store.value("enableSummaryAtLecture"), Some(json!(false)));
    }
}
