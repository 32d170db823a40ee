// Fetch queue - Serializes fetch tasks with a minimum start-to-start spacing
use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

type QueueTask = BoxFuture<'static, ()>;

/// FIFO queue that runs one task at a time.
///
/// Task k+1 starts no earlier than `interval` after task k started, and never
/// before task k finished. Tasks report their own results; the queue only
/// drains and paces.
pub struct FetchQueue {
    tx: mpsc::UnboundedSender<QueueTask>,
    pending: Arc<AtomicUsize>,
}

impl FetchQueue {
    /// Spawns the worker on the current tokio runtime.
    pub fn new(interval: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        tokio::spawn(run_worker(rx, interval, pending.clone()));
        Self { tx, pending }
    }

    pub fn enqueue<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(task.boxed()).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!("Fetch queue worker has stopped; dropping task");
        }
    }

    /// Tasks enqueued but not yet finished.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<QueueTask>,
    interval: Duration,
    pending: Arc<AtomicUsize>,
) {
    while let Some(task) = rx.recv().await {
        let started = Instant::now();
        if AssertUnwindSafe(task).catch_unwind().await.is_err() {
            tracing::error!("Fetch task panicked; continuing with the next task");
        }
        pending.fetch_sub(1, Ordering::SeqCst);

        tokio::time::sleep_until(started + interval).await;
    }
    tracing::debug!("Fetch queue closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> Arc<Mutex<Vec<(usize, Instant)>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    async fn settle(queue: &FetchQueue) {
        while queue.pending() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_tasks_start_at_least_interval_apart() {
        let queue = FetchQueue::new(Duration::from_millis(200));
        let starts = recorder();

        for (index, work_ms) in [0u64, 50, 350, 10, 0].into_iter().enumerate() {
            let starts = starts.clone();
            queue.enqueue(async move {
                starts.lock().unwrap().push((index, Instant::now()));
                tokio::time::sleep(Duration::from_millis(work_ms)).await;
            });
        }
        settle(&queue).await;

        let starts = starts.lock().unwrap();
        let order: Vec<usize> = starts.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        for pair in starts.windows(2) {
            assert!(pair[1].1 - pair[0].1 >= Duration::from_millis(200));
        }
        // Task 2 runs 350ms, so task 3 waits for it to finish.
        assert!(starts[3].1 - starts[2].1 >= Duration::from_millis(350));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_task_does_not_stop_queue() {
        let queue = FetchQueue::new(Duration::from_millis(200));
        let starts = recorder();

        queue.enqueue(async {
            panic!("fetch exploded");
        });
        let later = starts.clone();
        queue.enqueue(async move {
            later.lock().unwrap().push((1, Instant::now()));
        });
        settle(&queue).await;

        assert_eq!(starts.lock().unwrap().len(), 1);
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_queue_still_paces_late_task() {
        let queue = FetchQueue::new(Duration::from_millis(200));
        let starts = recorder();

        let first = starts.clone();
        queue.enqueue(async move { first.lock().unwrap().push((0, Instant::now())) });
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = starts.clone();
        queue.enqueue(async move { second.lock().unwrap().push((1, Instant::now())) });
        settle(&queue).await;

        let starts = starts.lock().unwrap();
        assert!(starts[1].1 - starts[0].1 >= Duration::from_millis(200));
    }
}
