//! Time sources for the overlay core

use chrono::Utc;

/// Wall-clock source in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Clock backed by the system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock anchored at a wall-clock origin and advanced by the tokio timer.
///
/// Follows tokio's paused time, so timer-driven behaviour can be exercised
/// with `tokio::time::advance` while epoch timestamps stay realistic.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin_ms: i64,
    start: tokio::time::Instant,
}

impl MonotonicClock {
    pub fn new(origin_ms: i64) -> Self {
        Self {
            origin_ms,
            start: tokio::time::Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> i64 {
        self.origin_ms + self.start.elapsed().as_millis() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn monotonic_clock_follows_tokio_time() {
        let clock = MonotonicClock::new(1_000);
        assert_eq!(clock.now_ms(), 1_000);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(clock.now_ms(), 6_000);
    }
}
