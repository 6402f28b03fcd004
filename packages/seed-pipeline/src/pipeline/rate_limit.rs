//! Start-rate limiter for record pipelines.
//!
//! A sliding window over a semaphore of `limit` slots. Each start takes a
//! slot and hands it back `interval` later, so no window of `interval`
//! ever sees more than `limit` starts.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

/// Gates the start of async operations.
///
/// Shared by reference across concurrent tasks; waiters queue in FIFO order
/// on the same window.
pub struct RateLimiter {
    slots: Option<Arc<Semaphore>>,
    limit: u32,
    interval: Duration,
}

impl RateLimiter {
    /// `limit` starts per `interval`. A zero limit or interval disables limiting.
    pub fn new(limit: u32, interval: Duration) -> Self {
        let slots = (limit > 0 && !interval.is_zero())
            .then(|| Arc::new(Semaphore::new(limit as usize)));

        Self {
            slots,
            limit,
            interval,
        }
    }

    /// No limiting at all.
    pub fn unlimited() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn is_limited(&self) -> bool {
        self.slots.is_some()
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for a free slot in the window.
    ///
    /// The slot stays taken for `interval` after this returns.
    pub async fn until_ready(&self) {
        let Some(slots) = &self.slots else {
            return;
        };
        // The semaphore is never closed
        let Ok(permit) = slots.clone().acquire_owned().await else {
            return;
        };

        let interval = self.interval;
        tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            drop(permit);
        });
    }

    /// Wait for a slot, then run `op`.
    ///
    /// Only the start is gated; `op` runs to completion regardless of the window.
    pub async fn run<F, Fut, T>(&self, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.until_ready().await;
        op().await
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("limit", &self.limit)
            .field("interval", &self.interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    /// Largest number of starts falling inside any half-open window of `interval`.
    fn max_in_window(starts: &[Duration], interval: Duration) -> usize {
        starts
            .iter()
            .map(|&from| {
                starts
                    .iter()
                    .filter(|&&at| at >= from && at < from + interval)
                    .count()
            })
            .max()
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_burst_passes_immediately() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let start = Instant::now();
        for _ in 0..5 {
            limiter.until_ready().await;
        }
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_excess_starts_wait_for_the_window() {
        let limiter = RateLimiter::new(2, Duration::from_millis(300));
        let start = Instant::now();
        for _ in 0..3 {
            limiter.until_ready().await;
        }
        // Third start waits for the first slot to leave the window
        assert!(start.elapsed() >= Duration::from_millis(290));
    }

    #[tokio::test]
    async fn test_no_window_exceeds_limit() {
        let interval = Duration::from_millis(300);
        let limiter = RateLimiter::new(3, interval);
        let origin = Instant::now();

        let mut starts = Vec::new();
        for _ in 0..7 {
            limiter.run(|| async {}).await;
            starts.push(origin.elapsed());
        }

        assert_eq!(starts.len(), 7);
        // Starts are timed just after their slot is taken; allow for that lag
        let window = interval - Duration::from_millis(5);
        assert!(max_in_window(&starts, window) <= 3, "starts: {:?}", starts);
        // 7 starts at 3 per window need at least two full windows
        assert!(starts[6] >= interval * 2 - Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_run_returns_op_output() {
        let limiter = RateLimiter::unlimited();
        assert!(!limiter.is_limited());
        assert_eq!(limiter.run(|| async { 41 + 1 }).await, 42);
    }

    #[test]
    fn test_zero_interval_disables() {
        assert!(!RateLimiter::new(7, Duration::ZERO).is_limited());
        assert!(RateLimiter::new(7, Duration::from_secs(10)).is_limited());
    }
}
