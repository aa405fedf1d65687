//! Periodic Expiry Watcher
//!
//! Owns the background task that fires the cache sweep. The task holds a
//! single bound callback, stops on signal with a bounded wait, and is
//! aborted outright if the watcher is dropped without an explicit stop.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

/// How long `stop` waits for the watcher task to wind down
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the periodic sweep task
pub(crate) struct ExpiryWatcher {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ExpiryWatcher {
    /// Spawn the timer task, firing `tick` once per period
    ///
    /// The first firing happens one full period after start.
    pub(crate) fn spawn<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (shutdown, mut signal) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => tick().await,
                    _ = signal.changed() => {
                        debug!("Expiry watcher stopped");
                        break;
                    }
                }
            }
        });

        Self {
            shutdown,
            task: Some(task),
        }
    }

    /// Signal the task and wait briefly for it to finish
    pub(crate) async fn stop(&mut self) {
        let _ = self.shutdown.send(true);

        if let Some(task) = self.task.take() {
            match time::timeout(STOP_TIMEOUT, task).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(error = %err, "Expiry watcher task panicked");
                }
                Err(_) => {
                    warn!("Expiry watcher did not stop in time");
                }
            }
        }
    }
}

impl Drop for ExpiryWatcher {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fires_repeatedly_after_one_full_period() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let mut watcher = ExpiryWatcher::spawn(Duration::from_millis(50), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        // nothing fires before the first period elapses
        time::sleep(Duration::from_millis(20)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_millis(200)).await;
        assert!(fired.load(Ordering::SeqCst) >= 2);

        watcher.stop().await;
    }

    #[tokio::test]
    async fn test_stop_halts_the_timer() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let mut watcher = ExpiryWatcher::spawn(Duration::from_millis(30), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        time::sleep(Duration::from_millis(100)).await;
        watcher.stop().await;

        let after_stop = fired.load(Ordering::SeqCst);
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), after_stop);
    }
}
