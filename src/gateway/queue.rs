//! Ordered, one-at-a-time execution with a fixed gap between tasks.

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Runs tasks strictly one after another, keeping at least `interval`
/// between the end of one task and the start of the next.
///
/// Waiters are served in arrival order (tokio's mutex is fair), and the
/// gap applies whether the previous task succeeded or failed.
pub struct RateLimitedQueue {
    name: String,
    interval: Duration,
    last_completed: Mutex<Option<Instant>>,
}

impl RateLimitedQueue {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
            last_completed: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn run<F, Fut, T>(&self, task: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut last = self.last_completed.lock().await;

        if let Some(finished) = *last {
            let elapsed = finished.elapsed();
            if elapsed < self.interval {
                let wait = self.interval - elapsed;
                tracing::debug!(gateway = %self.name, wait_ms = wait.as_millis() as u64, "Throttling call");
                tokio::time::sleep(wait).await;
            }
        }

        let output = task().await;
        *last = Some(Instant::now());
        output
    }
}
