use std::future::Future;

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Periodic tick driver.
///
/// The first tick fires one full period after `spawn`. `stop` cancels the
/// token and aborts the task, so no new tick begins once it returns.
pub struct TickScheduler {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl TickScheduler {
    pub fn spawn<F, Fut>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval fires immediately on the first call
            ticker.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => on_tick().await,
                }
            }
            debug!("tick scheduler exited");
        });

        info!(period_ms = period.as_millis() as u64, "tick scheduler started");
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Idempotent.
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("tick scheduler stopped");
        }
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn ticks_until_stopped() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let mut scheduler = TickScheduler::spawn(Duration::from_millis(5), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        scheduler.stop();
        let seen = count.load(Ordering::SeqCst);
        assert!(seen >= 1);
        assert!(!scheduler.is_active());

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);

        scheduler.stop();
    }
}
