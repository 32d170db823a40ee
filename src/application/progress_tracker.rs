// Progress tracker - Publishes loaded/total snapshots as assignments arrive
use crate::domain::progress::{ProgressSnapshot, ProgressState};
use tokio::sync::watch;

pub struct ProgressTracker {
    tx: watch::Sender<ProgressSnapshot>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressSnapshot::default());
        Self { tx }
    }

    /// Publish `snapshot` if it differs from the current one.
    pub fn recompute(&self, snapshot: ProgressSnapshot) {
        self.tx.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            if current.state != snapshot.state {
                tracing::info!(
                    "Progress {:?} -> {:?} ({}/{})",
                    current.state,
                    snapshot.state,
                    snapshot.loaded,
                    snapshot.total
                );
            }
            *current = snapshot;
            true
        });
    }

    pub fn current(&self) -> ProgressSnapshot {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.tx.subscribe()
    }

    /// Resolves once every registered assignment has loaded.
    pub async fn wait_for_complete(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|s| s.state == ProgressState::Complete).await;
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
