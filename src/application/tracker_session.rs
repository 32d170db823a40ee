// Tracker session - Page scan trigger and settings broadcast for one page
use crate::application::assignment_source::AssignmentSource;
use crate::application::cache::AssignmentCache;
use crate::application::dashboard::Dashboard;
use crate::application::fetch_queue::FetchQueue;
use crate::application::key_value_store::KeyValueStore;
use crate::application::registry::{Registry, Resolution};
use crate::application::settings_store::{load_display_settings, save_display_settings};
use crate::domain::anchor::AssignmentAnchor;
use crate::domain::dashboard::DashboardSummary;
use crate::domain::progress::ProgressSnapshot;
use crate::domain::settings::DisplaySettings;
use crate::infrastructure::config::TrackerConfig;
use crate::infrastructure::page_scanner::query_param;
use crate::presentation::render_target::{DashboardView, RenderTarget};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

/// What one `discover` pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub processed: usize,
    /// Anchors without an id, or seen by an earlier pass.
    pub skipped: usize,
    pub new_ids: usize,
    pub live: usize,
    pub cached: usize,
    pub queued: usize,
}

/// Everything tracked for one loaded course page.
pub struct TrackerSession {
    store: Arc<dyn KeyValueStore>,
    registry: Arc<Registry>,
    settings: Mutex<DisplaySettings>,
    settings_tx: broadcast::Sender<DisplaySettings>,
    seen_anchors: Mutex<HashSet<(String, usize)>>,
}

impl TrackerSession {
    /// Build a session. Saved display settings override the configured
    /// defaults. Must run inside a tokio runtime.
    pub async fn new(
        config: &TrackerConfig,
        store: Arc<dyn KeyValueStore>,
        source: Arc<dyn AssignmentSource>,
        view: Arc<dyn DashboardView>,
    ) -> Self {
        let settings = load_display_settings(store.as_ref(), config.display_defaults()).await;
        tracing::debug!("Display settings: {:?}", settings);

        let dashboard = Arc::new(Dashboard::new(settings, config.debounce(), view));
        let cache = AssignmentCache::new(store.clone(), config.cache_policy());
        let queue = FetchQueue::new(config.fetch_interval());
        let registry = Registry::new(dashboard, cache, queue, source);
        let (settings_tx, _) = broadcast::channel(16);

        Self {
            store,
            registry,
            settings: Mutex::new(settings),
            settings_tx,
            seen_anchors: Mutex::new(HashSet::new()),
        }
    }

    /// Register every anchor, attach a target made by `make_target`, and
    /// resolve each id the first time it shows up.
    pub async fn discover<F>(
        &self,
        anchors: &[AssignmentAnchor],
        course_id: Option<&str>,
        mut make_target: F,
    ) -> DiscoveryReport
    where
        F: FnMut(&AssignmentAnchor) -> Arc<dyn RenderTarget>,
    {
        let mut report = DiscoveryReport::default();

        for anchor in anchors {
            let Some(id) = query_param(&anchor.href, "id") else {
                report.skipped += 1;
                continue;
            };
            let fresh = self
                .seen_anchors
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert((anchor.href.clone(), anchor.offset));
            if !fresh {
                report.skipped += 1;
                continue;
            }
            report.processed += 1;

            let first = self.registry.register(&id, &anchor.href, &anchor.text);
            self.registry
                .add_target(&id, make_target(anchor), &anchor.href, anchor.in_overview);
            if !first {
                continue;
            }

            report.new_ids += 1;
            match self.registry.resolve(&id, course_id).await {
                Resolution::Live => report.live += 1,
                Resolution::Cached => report.cached += 1,
                Resolution::Queued => report.queued += 1,
                Resolution::AlreadyRequested | Resolution::Unregistered => {}
            }
        }

        tracing::info!(
            "Discovered {} assignment links ({} ids, {} cached, {} queued)",
            report.processed,
            report.new_ids,
            report.cached,
            report.queued
        );
        report
    }

    /// Persist and apply new display settings, then redraw every target from
    /// the data it already has and notify subscribers.
    pub async fn change_settings(&self, settings: DisplaySettings) {
        if let Err(e) = save_display_settings(self.store.as_ref(), &settings).await {
            tracing::warn!("Could not save display settings: {}", e);
        }
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner) = settings;

        self.registry.dashboard().apply_settings(&settings);
        self.registry.rerender_all();
        // No subscribers is fine.
        let _ = self.settings_tx.send(settings);
    }

    pub fn subscribe_settings(&self) -> broadcast::Receiver<DisplaySettings> {
        self.settings_tx.subscribe()
    }

    pub fn settings(&self) -> DisplaySettings {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn wait_for_complete(&self) {
        self.registry.dashboard().progress().wait_for_complete().await
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.registry.dashboard().progress().current()
    }

    /// True while some discovered assignment has not finished its first load.
    pub fn is_loading(&self) -> bool {
        self.registry.dashboard().is_loading()
    }

    pub fn summary(&self) -> DashboardSummary {
        self.registry.dashboard().summary_at(Utc::now())
    }

    /// Skip the debounce and draw the dashboard now.
    pub fn render_dashboard_now(&self) {
        self.registry.dashboard().render_now()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}
