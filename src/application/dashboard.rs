// Dashboard - Owns the page-wide state and debounces aggregate renders
use crate::application::aggregator::aggregate;
use crate::application::progress_tracker::ProgressTracker;
use crate::application::update_scheduler::UpdateScheduler;
use crate::domain::dashboard::{DashboardState, DashboardSummary};
use crate::domain::settings::DisplaySettings;
use crate::presentation::render_target::DashboardView;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub type SharedState = Arc<Mutex<DashboardState>>;

pub(crate) fn lock_state(state: &SharedState) -> MutexGuard<'_, DashboardState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One instance per page session.
pub struct Dashboard {
    state: SharedState,
    scheduler: UpdateScheduler,
    progress: ProgressTracker,
    view: Arc<dyn DashboardView>,
    enabled: AtomicBool,
}

impl Dashboard {
    pub fn new(settings: DisplaySettings, debounce: Duration, view: Arc<dyn DashboardView>) -> Self {
        Self {
            state: Arc::new(Mutex::new(DashboardState::new(
                settings.show_content,
                settings.urgent_threshold_hours,
            ))),
            scheduler: UpdateScheduler::new(debounce),
            progress: ProgressTracker::new(),
            view,
            enabled: AtomicBool::new(settings.enable_summary),
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// `(show_content, urgent_threshold_hours)` as currently configured.
    pub fn display(&self) -> (bool, u32) {
        let state = lock_state(&self.state);
        (state.show_content, state.urgent_threshold_hours)
    }

    /// Whether any registered assignment is still waiting for its first load.
    pub fn is_loading(&self) -> bool {
        lock_state(&self.state).is_loading
    }

    /// Recompute progress and arm a debounced render.
    pub fn state_changed(&self) {
        {
            // Publish under the lock so concurrent callers cannot reorder snapshots.
            let state = lock_state(&self.state);
            self.progress.recompute(state.progress());
        }
        self.schedule_render();
    }

    pub fn schedule_render(&self) {
        if !self.is_enabled() {
            return;
        }
        let state = self.state.clone();
        let view = self.view.clone();
        self.scheduler.schedule(move || render_into(&state, view.as_ref()));
    }

    pub fn render_now(&self) {
        if self.is_enabled() {
            self.scheduler.cancel();
            render_into(&self.state, self.view.as_ref());
        }
    }

    pub fn summary_at(&self, now: DateTime<Utc>) -> DashboardSummary {
        let state = lock_state(&self.state);
        aggregate(state.assignments.values(), now, state.urgent_threshold_hours)
    }

    /// Apply new display settings. Turning the summary back on replays the
    /// current aggregation right away.
    pub fn apply_settings(&self, settings: &DisplaySettings) {
        {
            let mut state = lock_state(&self.state);
            state.show_content = settings.show_content;
            state.urgent_threshold_hours = settings.urgent_threshold_hours;
        }

        let was_enabled = self.enabled.swap(settings.enable_summary, Ordering::SeqCst);
        if settings.enable_summary {
            self.render_now();
        } else if was_enabled {
            self.scheduler.cancel();
            self.view.hide();
        }
    }
}

fn render_into(state: &SharedState, view: &dyn DashboardView) {
    let (summary, progress, show_content) = {
        let state = lock_state(state);
        let summary = aggregate(state.assignments.values(), Utc::now(), state.urgent_threshold_hours);
        (summary, state.progress(), state.show_content)
    };
    view.render_dashboard(&summary, &progress, show_content);
}
