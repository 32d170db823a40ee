use crate::application::cache::CachePolicy;
use crate::domain::settings::DisplaySettings;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct TrackerConfig {
    #[serde(default = "default_fetch_interval_ms")]
    pub fetch_interval_ms: u64,
    #[serde(default = "default_cache_ttl_default_ms")]
    pub cache_ttl_default_ms: u64,
    #[serde(default = "default_cache_ttl_submitted_ms")]
    pub cache_ttl_submitted_ms: u64,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_urgent_threshold_hours")]
    pub urgent_threshold_hours: u32,
    #[serde(default = "default_true")]
    pub show_body: bool,
    #[serde(default = "default_true")]
    pub enable_summary: bool,

    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    #[serde(default)]
    pub page_path: Option<PathBuf>,
    #[serde(default)]
    pub page_url: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_fetch_interval_ms() -> u64 {
    200
}

fn default_cache_ttl_default_ms() -> u64 {
    60 * 1000
}

fn default_cache_ttl_submitted_ms() -> u64 {
    7 * 24 * 60 * 60 * 1000
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_urgent_threshold_hours() -> u32 {
    72
}

fn default_true() -> bool {
    true
}

fn default_store_path() -> PathBuf {
    PathBuf::from("tracker-store.json")
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            fetch_interval_ms: default_fetch_interval_ms(),
            cache_ttl_default_ms: default_cache_ttl_default_ms(),
            cache_ttl_submitted_ms: default_cache_ttl_submitted_ms(),
            debounce_ms: default_debounce_ms(),
            urgent_threshold_hours: default_urgent_threshold_hours(),
            show_body: true,
            enable_summary: true,
            store_path: default_store_path(),
            page_path: None,
            page_url: None,
            course_id: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl TrackerConfig {
    pub fn fetch_interval(&self) -> Duration {
        Duration::from_millis(self.fetch_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            default_ttl: Duration::from_millis(self.cache_ttl_default_ms),
            submitted_ttl: Duration::from_millis(self.cache_ttl_submitted_ms),
        }
    }

    /// Display settings used until the store provides saved ones.
    pub fn display_defaults(&self) -> DisplaySettings {
        DisplaySettings {
            show_content: self.show_body,
            urgent_threshold_hours: self.urgent_threshold_hours,
            enable_summary: self.enable_summary,
        }
    }
}

/// Load `config/tracker.*` (optional) overlaid with `TRACKER_*` environment
/// variables.
pub fn load_tracker_config() -> anyhow::Result<TrackerConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/tracker").required(false))
        .add_source(config::Environment::with_prefix("TRACKER"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    #[test]
    fn test_defaults_when_empty() {
        let config: TrackerConfig = Config::builder().build().unwrap().try_deserialize().unwrap();

        assert_eq!(config.fetch_interval(), Duration::from_millis(200));
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.cache_policy(), CachePolicy::default());
        assert_eq!(config.display_defaults(), DisplaySettings::default());
        assert_eq!(config.store_path, PathBuf::from("tracker-store.json"));
    }

    #[test]
    fn test_overrides_from_toml() {
        let config: TrackerConfig = Config::builder()
            .add_source(File::from_str(
                "fetch_interval_ms = 50\nurgent_threshold_hours = 24\nshow_body = false\npage_url = \"https://lms/course/view.php?id=5\"",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.fetch_interval_ms, 50);
        assert!(!config.display_defaults().show_content);
        assert_eq!(config.display_defaults().urgent_threshold_hours, 24);
        assert!(config.enable_summary);
        assert_eq!(config.page_url.as_deref(), Some("https://lms/course/view.php?id=5"));
    }
}
