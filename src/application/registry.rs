// Registry - One assignment id, many render targets
use crate::application::assignment_source::AssignmentSource;
use crate::application::cache::AssignmentCache;
use crate::application::dashboard::{lock_state, Dashboard};
use crate::application::fetch_queue::FetchQueue;
use crate::domain::assignment::{Assignment, AssignmentData};
use crate::domain::dashboard::LoadOutcome;
use crate::presentation::render_target::{RenderTarget, TargetFrame};
use chrono::Utc;
use futures::FutureExt;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Which tier answered a `resolve` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Live state already had a deadline; fanned out without cache or network.
    Live,
    /// A valid cache entry was fanned out.
    Cached,
    /// One fetch was enqueued.
    Queued,
    /// A cache lookup or fetch for this id was already started.
    AlreadyRequested,
    /// The id was never registered.
    Unregistered,
}

struct TargetSlot {
    target: Arc<dyn RenderTarget>,
    url: String,
    compact: bool,
}

/// Last data fanned out for an id.
#[derive(Clone)]
struct Delivery {
    data: Option<AssignmentData>,
    failed: bool,
}

#[derive(Default)]
struct TargetGroup {
    slots: Vec<TargetSlot>,
    delivered: Option<Delivery>,
}

pub struct Registry {
    dashboard: Arc<Dashboard>,
    cache: AssignmentCache,
    queue: FetchQueue,
    source: Arc<dyn AssignmentSource>,
    targets: Mutex<HashMap<String, TargetGroup>>,
    requested: Mutex<HashSet<String>>,
}

impl Registry {
    pub fn new(
        dashboard: Arc<Dashboard>,
        cache: AssignmentCache,
        queue: FetchQueue,
        source: Arc<dyn AssignmentSource>,
    ) -> Arc<Self> {
        Arc::new(Self {
            dashboard,
            cache,
            queue,
            source,
            targets: Mutex::new(HashMap::new()),
            requested: Mutex::new(HashSet::new()),
        })
    }

    /// Create the assignment on first sight. Returns whether `id` was new;
    /// a repeated id leaves every stored field alone.
    pub fn register(&self, id: &str, link: &str, title: &str) -> bool {
        let first = lock_state(self.dashboard.state()).register(id, link, title);
        if first {
            tracing::debug!("Registered assignment {} ({})", id, title);
        }
        self.dashboard.state_changed();
        first
    }

    /// Attach one more occurrence of `id` and draw it right away, with the
    /// latest data if the id already loaded.
    pub fn add_target(&self, id: &str, target: Arc<dyn RenderTarget>, url: &str, compact: bool) {
        let delivered = {
            let mut targets = self.targets();
            let group = targets.entry(id.to_string()).or_default();
            group.slots.push(TargetSlot {
                target: target.clone(),
                url: url.to_string(),
                compact,
            });
            group.delivered.clone()
        };

        let (show_content, urgent_threshold_hours) = self.dashboard.display();
        let delivery = delivered.unwrap_or(Delivery {
            data: None,
            failed: false,
        });
        target.render(&TargetFrame {
            data: delivery.data.as_ref(),
            failed: delivery.failed,
            url,
            compact,
            show_content,
            urgent_threshold_hours,
            now: Utc::now(),
        });
    }

    /// Decide how `id` gets its data: live state, then cache, then a single
    /// queued fetch.
    pub async fn resolve(self: &Arc<Self>, id: &str, course_id: Option<&str>) -> Resolution {
        let (live, link) = {
            let state = lock_state(self.dashboard.state());
            match state.assignments.get(id) {
                None => {
                    tracing::warn!("Resolve for unregistered assignment {}", id);
                    return Resolution::Unregistered;
                }
                Some(a) => (a.deadline.is_some().then(|| a.snapshot()), a.link.clone()),
            }
        };

        if let Some(data) = live {
            tracing::debug!("Assignment {} already known, skipping cache and network", id);
            self.deliver(id, Some(&data));
            return Resolution::Live;
        }

        if !self.requested().insert(id.to_string()) {
            return Resolution::AlreadyRequested;
        }

        if let Some(entry) = self.cache.get(id).await {
            tracing::debug!("Cache hit for assignment {}", id);
            self.deliver(id, Some(&entry.data));
            return Resolution::Cached;
        }

        tracing::debug!("Queueing fetch for assignment {}", id);
        let registry = Arc::clone(self);
        let id = id.to_string();
        let course_id = course_id.map(str::to_string);
        self.queue.enqueue(async move {
            let fetch = registry
                .source
                .fetch_assignment_details(&link, &id, &link, course_id.as_deref());
            // A panicking source still counts as a failed load.
            let data = match AssertUnwindSafe(fetch).catch_unwind().await {
                Ok(data) => data,
                Err(_) => {
                    tracing::error!("Fetch for assignment {} panicked", id);
                    None
                }
            };
            registry.update(&id, data).await;
        });
        Resolution::Queued
    }

    /// Apply a fetch result. `None` is a failed fetch: fields stay as they
    /// were but the id still counts as loaded. Successful data is written
    /// through to the cache.
    pub async fn update(&self, id: &str, data: Option<AssignmentData>) {
        if self.deliver(id, data.as_ref()).is_none() {
            return;
        }
        if let Some(data) = &data {
            self.cache.put(id, data).await;
        }
    }

    /// Re-render every target that has data, with the current display
    /// settings. Returns how many targets were drawn.
    pub fn rerender_all(&self) -> usize {
        let batches: Vec<(Delivery, Vec<(Arc<dyn RenderTarget>, String, bool)>)> = self
            .targets()
            .values()
            .filter_map(|group| {
                let delivery = group.delivered.clone().filter(|d| d.data.is_some())?;
                Some((delivery, collect_slots(&group.slots)))
            })
            .collect();

        let mut drawn = 0;
        for (delivery, slots) in batches {
            drawn += self.draw(&delivery, &slots);
        }
        tracing::debug!("Re-rendered {} targets after settings change", drawn);
        drawn
    }

    pub fn assignment(&self, id: &str) -> Option<Assignment> {
        lock_state(self.dashboard.state()).assignments.get(id).cloned()
    }

    pub fn dashboard(&self) -> &Arc<Dashboard> {
        &self.dashboard
    }

    pub fn pending_fetches(&self) -> usize {
        self.queue.pending()
    }

    /// Merge into state, then fan out to every target of `id`. State is
    /// consistent before any target is drawn.
    fn deliver(&self, id: &str, data: Option<&AssignmentData>) -> Option<LoadOutcome> {
        let Some(outcome) = lock_state(self.dashboard.state()).apply_result(id, data) else {
            tracing::warn!("Update for unregistered assignment {}", id);
            return None;
        };
        if data.is_none() {
            tracing::warn!("Assignment {} failed to load", id);
        }
        if outcome.first_load {
            self.dashboard.state_changed();
        }

        let delivery = Delivery {
            data: outcome.data.clone(),
            failed: data.is_none(),
        };
        let slots = {
            let mut targets = self.targets();
            let group = targets.entry(id.to_string()).or_default();
            group.delivered = Some(delivery.clone());
            collect_slots(&group.slots)
        };
        let drawn = self.draw(&delivery, &slots);
        tracing::debug!("Fanned out assignment {} to {} targets", id, drawn);

        Some(outcome)
    }

    fn draw(&self, delivery: &Delivery, slots: &[(Arc<dyn RenderTarget>, String, bool)]) -> usize {
        let (show_content, urgent_threshold_hours) = self.dashboard.display();
        let now = Utc::now();
        for (target, url, compact) in slots {
            target.render(&TargetFrame {
                data: delivery.data.as_ref(),
                failed: delivery.failed,
                url,
                compact: *compact,
                show_content,
                urgent_threshold_hours,
                now,
            });
        }
        slots.len()
    }

    fn targets(&self) -> MutexGuard<'_, HashMap<String, TargetGroup>> {
        self.targets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn requested(&self) -> MutexGuard<'_, HashSet<String>> {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn collect_slots(slots: &[TargetSlot]) -> Vec<(Arc<dyn RenderTarget>, String, bool)> {
    slots
        .iter()
        .map(|slot| (slot.target.clone(), slot.url.clone(), slot.compact))
        .collect()
}
