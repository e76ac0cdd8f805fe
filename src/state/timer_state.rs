//! Timer state structure and ETA math

use serde::{Deserialize, Serialize};

/// Countdown state for the trip ETA.
///
/// All timestamps are epoch milliseconds; `0` means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Total trip duration that maps to 100% progress, 0 when no timer is set
    pub baseline_sec: u64,
    pub started_at_ms: i64,
    pub end_at_ms: i64,
    pub paused: bool,
    pub paused_at_ms: i64,
    /// Authoritative remaining time while paused
    pub paused_remaining_ms: i64,
    pub pause_reason: Option<String>,
}

impl TimerState {
    /// Create a timer with no countdown set
    pub fn new() -> Self {
        Self::default()
    }

    fn total_ms(&self) -> i64 {
        (self.baseline_sec.min(i64::MAX as u64) as i64).saturating_mul(1000)
    }

    /// Check if a countdown is configured
    pub fn is_set(&self) -> bool {
        self.baseline_sec > 0
    }

    /// Remaining time in milliseconds, never negative
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        if self.baseline_sec == 0 {
            return 0;
        }
        if self.paused {
            return self.paused_remaining_ms.max(0);
        }
        if self.started_at_ms == 0 {
            return 0;
        }
        self.end_at_ms.saturating_sub(now_ms).max(0)
    }

    /// Remaining whole seconds.
    ///
    /// Rounded up rather than down: a partial second still counts, so the
    /// value reaches 0 exactly when progress reaches 1.0. The arriving-soon
    /// threshold and ETA text therefore flip up to one second later than a
    /// floored reading would.
    pub fn remaining_sec(&self, now_ms: i64) -> u64 {
        (self.remaining_ms(now_ms) as u64).div_ceil(1000)
    }

    /// Fraction of the baseline already travelled, within [0, 1]
    pub fn progress(&self, now_ms: i64) -> f64 {
        let total = self.total_ms();
        if total == 0 {
            return 0.0;
        }
        let done = total.saturating_sub(self.remaining_ms(now_ms)).clamp(0, total);
        done as f64 / total as f64
    }

    /// Whether the 1-second tick loop has anything left to count down
    pub fn is_running(&self, now_ms: i64) -> bool {
        self.is_set() && !self.paused && self.remaining_ms(now_ms) > 0
    }

    /// Check if a set countdown has run out
    pub fn is_exhausted(&self, now_ms: i64) -> bool {
        self.is_set() && self.remaining_ms(now_ms) == 0
    }

    /// Start a fresh countdown of `hours`:`minutes` at `now_ms`
    pub fn set_countdown(&mut self, hours: u64, minutes: u64, now_ms: i64) {
        self.baseline_sec = hours.saturating_mul(3600).saturating_add(minutes.min(59) * 60);
        self.started_at_ms = now_ms;
        self.end_at_ms = now_ms.saturating_add(self.total_ms());
        self.paused = false;
        self.paused_at_ms = 0;
        self.paused_remaining_ms = 0;
        self.pause_reason = None;
    }

    /// Shift both the baseline and the remaining budget by `delta_minutes`
    pub fn add_minutes(&mut self, delta_minutes: i64, now_ms: i64) {
        let delta_sec = delta_minutes.saturating_mul(60);
        let remaining = self.remaining_ms(now_ms);

        self.baseline_sec = (self.total_ms() / 1000).saturating_add(delta_sec).max(0) as u64;

        let shifted = remaining.saturating_add(delta_sec.saturating_mul(1000)).max(0);
        if self.paused {
            self.paused_remaining_ms = shifted;
        } else {
            if self.started_at_ms == 0 && shifted > 0 {
                self.started_at_ms = now_ms;
            }
            self.end_at_ms = now_ms.saturating_add(shifted);
        }
    }

    /// Snap remaining time back to the full baseline
    pub fn reset_countdown(&mut self, now_ms: i64) {
        if self.paused {
            self.paused_remaining_ms = self.total_ms();
        } else {
            if self.started_at_ms == 0 && self.is_set() {
                self.started_at_ms = now_ms;
            }
            self.end_at_ms = now_ms.saturating_add(self.total_ms());
        }
    }

    /// Clear the countdown entirely
    pub fn stop(&mut self) {
        *self = Self::new();
    }

    /// Freeze remaining time. Returns false when already paused.
    pub fn pause(&mut self, reason: Option<String>, now_ms: i64) -> bool {
        if self.paused {
            if reason.is_some() {
                self.pause_reason = reason;
            }
            return false;
        }

        self.paused_remaining_ms = self.remaining_ms(now_ms);
        self.paused_at_ms = now_ms;
        self.paused = true;
        self.pause_reason = reason;
        true
    }

    /// Continue counting down from the frozen remaining time. Returns false when not paused.
    pub fn resume(&mut self, now_ms: i64) -> bool {
        if !self.paused {
            return false;
        }

        let remaining = self.paused_remaining_ms.max(0);
        // time added while paused before any countdown ran starts the trip here
        if self.started_at_ms == 0 && remaining > 0 {
            self.started_at_ms = now_ms;
        }
        self.end_at_ms = now_ms.saturating_add(remaining);
        self.paused = false;
        self.paused_at_ms = 0;
        self.pause_reason = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn unset_timer_reads_zero() {
        let timer = TimerState::new();
        assert_eq!(timer.remaining_ms(T0), 0);
        assert_eq!(timer.progress(T0), 0.0);
        assert!(!timer.is_running(T0));
    }

    #[test]
    fn set_countdown_starts_at_full_baseline() {
        let mut timer = TimerState::new();
        timer.set_countdown(1, 30, T0);

        assert_eq!(timer.baseline_sec, 5400);
        assert_eq!(timer.remaining_sec(T0), 5400);
        assert_eq!(timer.progress(T0), 0.0);
        assert_eq!(timer.end_at_ms, T0 + 5_400_000);
    }

    #[test]
    fn set_countdown_clamps_minutes() {
        let mut timer = TimerState::new();
        timer.set_countdown(0, 90, T0);
        assert_eq!(timer.baseline_sec, 59 * 60);
    }

    #[test]
    fn remaining_strictly_decreases_while_running() {
        let mut timer = TimerState::new();
        timer.set_countdown(0, 2, T0);

        let mut last = timer.remaining_ms(T0);
        for step in 1..=130 {
            let now = T0 + step * 1000;
            let remaining = timer.remaining_ms(now);
            if last > 0 {
                assert!(remaining < last);
            } else {
                assert_eq!(remaining, 0);
            }
            last = remaining;
        }
    }

    #[test]
    fn progress_stays_in_unit_interval() {
        let mut timer = TimerState::new();
        timer.set_countdown(0, 1, T0);

        for now in [T0 - 5_000, T0, T0 + 30_000, T0 + 60_000, T0 + 3_600_000] {
            let progress = timer.progress(now);
            assert!((0.0..=1.0).contains(&progress), "progress {progress} at {now}");
        }
        assert_eq!(timer.progress(T0 + 60_000), 1.0);
        assert_eq!(timer.remaining_sec(T0 + 60_000), 0);
    }

    #[test]
    fn add_minutes_floors_remaining_at_zero() {
        let mut timer = TimerState::new();
        timer.set_countdown(0, 10, T0);
        let now = T0 + 300_000;
        assert_eq!(timer.remaining_sec(now), 300);

        timer.add_minutes(-10, now);
        assert_eq!(timer.remaining_ms(now), 0);
        assert_eq!(timer.baseline_sec, 0);
        assert_eq!(timer.started_at_ms, T0);
    }

    #[test]
    fn add_minutes_while_paused_adjusts_frozen_remaining() {
        let mut timer = TimerState::new();
        timer.set_countdown(0, 20, T0);
        timer.pause(None, T0 + 60_000);

        timer.add_minutes(5, T0 + 120_000);
        assert_eq!(timer.paused_remaining_ms, 19 * 60_000 + 5 * 60_000);
        assert_eq!(timer.baseline_sec, 25 * 60);
    }

    #[test]
    fn add_minutes_keeps_start_time() {
        let mut timer = TimerState::new();
        timer.set_countdown(1, 0, T0);
        timer.add_minutes(15, T0 + 5_000);

        assert_eq!(timer.started_at_ms, T0);
        assert_eq!(timer.remaining_ms(T0 + 5_000), 3_600_000 - 5_000 + 900_000);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut timer = TimerState::new();
        timer.set_countdown(0, 30, T0);
        let now = T0 + 600_000;

        timer.reset_countdown(now);
        let once = timer.remaining_ms(now);
        timer.reset_countdown(now);
        assert_eq!(timer.remaining_ms(now), once);
        assert_eq!(once, 1_800_000);
        assert_eq!(timer.started_at_ms, T0);
    }

    #[test]
    fn pause_resume_round_trip_preserves_remaining() {
        let mut timer = TimerState::new();
        timer.set_countdown(0, 45, T0);
        let now = T0 + 123_456;
        let before = timer.remaining_ms(now);

        assert!(timer.pause(Some("fuel".to_string()), now));
        assert!(timer.resume(now));
        assert_eq!(timer.remaining_ms(now), before);
        assert_eq!(timer.pause_reason, None);
    }

    #[test]
    fn remaining_is_constant_while_paused() {
        let mut timer = TimerState::new();
        timer.set_countdown(0, 45, T0);
        timer.pause(None, T0 + 10_000);

        assert_eq!(timer.remaining_ms(T0 + 10_000), timer.remaining_ms(T0 + 900_000));
    }

    #[test]
    fn repeated_pause_only_updates_reason() {
        let mut timer = TimerState::new();
        timer.set_countdown(0, 45, T0);
        timer.pause(Some("break".to_string()), T0 + 1_000);
        let frozen = timer.paused_remaining_ms;

        assert!(!timer.pause(None, T0 + 50_000));
        assert_eq!(timer.pause_reason.as_deref(), Some("break"));
        assert!(!timer.pause(Some("traffic".to_string()), T0 + 60_000));
        assert_eq!(timer.pause_reason.as_deref(), Some("traffic"));
        assert_eq!(timer.paused_remaining_ms, frozen);
    }

    #[test]
    fn stop_clears_everything() {
        let mut timer = TimerState::new();
        timer.set_countdown(2, 0, T0);
        timer.pause(None, T0 + 1_000);
        timer.stop();

        assert_eq!(timer, TimerState::new());
    }

    #[test]
    fn clock_skew_never_goes_negative() {
        let mut timer = TimerState::new();
        timer.set_countdown(0, 1, T0);
        timer.end_at_ms = T0 - 10_000;

        assert_eq!(timer.remaining_ms(T0), 0);
        assert_eq!(timer.progress(T0), 1.0);
    }

    #[test]
    fn time_added_during_an_early_pause_counts_down_after_resume() {
        let mut timer = TimerState::new();
        timer.pause(None, T0);
        timer.add_minutes(30, T0 + 1_000);
        assert_eq!(timer.paused_remaining_ms, 1_800_000);

        assert!(timer.resume(T0 + 2_000));
        assert_eq!(timer.started_at_ms, T0 + 2_000);
        assert_eq!(timer.remaining_sec(T0 + 2_000), 1800);
        assert!(timer.is_running(T0 + 2_000));
    }

    #[test]
    fn huge_frozen_remaining_saturates() {
        let mut timer = TimerState::new();
        timer.baseline_sec = 60;
        timer.started_at_ms = T0;
        timer.paused = true;
        timer.paused_remaining_ms = i64::MAX;

        assert_eq!(timer.remaining_sec(T0), (i64::MAX as u64).div_ceil(1000));
        assert_eq!(timer.progress(T0), 0.0);

        assert!(timer.resume(T0));
        assert_eq!(timer.end_at_ms, i64::MAX);
        assert!(timer.is_running(T0));
    }

    #[test]
    fn partial_seconds_round_up() {
        let mut timer = TimerState::new();
        timer.set_countdown(0, 1, T0);

        assert_eq!(timer.remaining_sec(T0 + 59_001), 1);
        assert_eq!(timer.remaining_sec(T0 + 59_999), 1);
        assert_eq!(timer.remaining_sec(T0 + 60_000), 0);
    }
}
