// Update scheduler - Debounces dashboard renders
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::task::AbortHandle;

/// Handle to one armed render.
#[derive(Debug, Clone)]
pub struct ScheduledRender {
    handle: AbortHandle,
}

impl ScheduledRender {
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

/// Collapses bursts of `schedule` calls into a single render that fires once
/// the calls have been quiet for `debounce`.
#[derive(Debug)]
pub struct UpdateScheduler {
    debounce: Duration,
    pending: Mutex<Option<AbortHandle>>,
}

impl UpdateScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: Mutex::new(None),
        }
    }

    /// Cancel the pending render, if any, and arm `render` after the debounce
    /// interval. `render` runs on the tokio runtime and should read whatever
    /// state it needs when it fires.
    pub fn schedule<F>(&self, render: F) -> ScheduledRender
    where
        F: FnOnce() + Send + 'static,
    {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let debounce = self.debounce;
        let task = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            render();
        });
        let handle = task.abort_handle();
        *pending = Some(handle.clone());

        ScheduledRender { handle }
    }

    pub fn cancel(&self) {
        if let Some(previous) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            previous.abort();
        }
    }
}

impl Drop for UpdateScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recorder() -> Arc<Mutex<Vec<u32>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_renders_once_with_latest_state() {
        let scheduler = UpdateScheduler::new(Duration::from_millis(500));
        let state = Arc::new(Mutex::new(0u32));
        let renders = recorder();

        for value in 1..=5 {
            *state.lock().unwrap() = value;
            let (state, renders) = (state.clone(), renders.clone());
            scheduler.schedule(move || {
                let seen = *state.lock().unwrap();
                renders.lock().unwrap().push(seen);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(*renders.lock().unwrap(), vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_reads_state_at_fire_time() {
        let scheduler = UpdateScheduler::new(Duration::from_millis(500));
        let state = Arc::new(Mutex::new(1u32));
        let renders = recorder();

        let (seen_state, seen) = (state.clone(), renders.clone());
        scheduler.schedule(move || seen.lock().unwrap().push(*seen_state.lock().unwrap()));
        *state.lock().unwrap() = 9;
        tokio::time::sleep(Duration::from_millis(501)).await;

        assert_eq!(*renders.lock().unwrap(), vec![9]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_periods_render_separately() {
        let scheduler = UpdateScheduler::new(Duration::from_millis(500));
        let renders = recorder();

        for value in [1, 2] {
            let renders = renders.clone();
            scheduler.schedule(move || renders.lock().unwrap().push(value));
            tokio::time::sleep(Duration::from_millis(700)).await;
        }

        assert_eq!(*renders.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_handle_never_fires() {
        let scheduler = UpdateScheduler::new(Duration::from_millis(500));
        let renders = recorder();

        let inner = renders.clone();
        let handle = scheduler.schedule(move || inner.lock().unwrap().push(1));
        handle.cancel();
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert!(renders.lock().unwrap().is_empty());
    }
}
