//! Status labels and the precedence classifier

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use super::{timer_state::TimerState, vehicle::VehicleKind};

/// Window constants driving classification and transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusWindows {
    /// Grace period after a (re)start during which the trip reads as departing
    pub departing: Duration,
    /// Remaining time under which the trip reads as arriving soon
    pub arriving: Duration,
    /// Hide phase of a status crossfade
    pub crossfade: Duration,
}

impl Default for StatusWindows {
    fn default() -> Self {
        Self {
            departing: Duration::from_secs(10),
            arriving: Duration::from_secs(600),
            crossfade: Duration::from_millis(120),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "kebab-case")]
pub enum StatusLabel {
    Preparing,
    Departing,
    EnRoute,
    InFlight,
    ArrivingSoon,
    Arrived,
    Paused,
    PausedWithReason(String),
}

impl StatusLabel {
    /// Paused label carrying an optional reason
    pub fn paused(reason: Option<&str>) -> Self {
        match reason.map(str::trim) {
            Some(reason) if !reason.is_empty() => Self::PausedWithReason(reason.to_string()),
            _ => Self::Paused,
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused | Self::PausedWithReason(_))
    }

    /// Text shown on the overlay status line
    pub fn text(&self) -> String {
        match self {
            Self::Preparing => "preparing…".to_string(),
            Self::Departing => "departing…".to_string(),
            Self::EnRoute => "en route…".to_string(),
            Self::InFlight => "in flight…".to_string(),
            Self::ArrivingSoon => "arriving soon…".to_string(),
            Self::Arrived => "arrived".to_string(),
            Self::Paused => "paused".to_string(),
            Self::PausedWithReason(reason) => format!("paused — {}", reason),
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Derive the status label, first matching rule wins:
/// paused, arrived, departing, arriving soon, moving, preparing.
pub fn classify(
    now_ms: i64,
    timer: &TimerState,
    vehicle: VehicleKind,
    windows: &StatusWindows,
) -> StatusLabel {
    if timer.paused {
        return StatusLabel::paused(timer.pause_reason.as_deref());
    }
    if !timer.is_set() {
        return StatusLabel::Preparing;
    }

    let remaining_sec = timer.remaining_sec(now_ms);
    if remaining_sec == 0 {
        return StatusLabel::Arrived;
    }

    let since_start_ms = now_ms.saturating_sub(timer.started_at_ms);
    if since_start_ms < windows.departing.as_millis() as i64 {
        return StatusLabel::Departing;
    }

    if remaining_sec <= windows.arriving.as_secs() {
        return StatusLabel::ArrivingSoon;
    }

    match vehicle {
        VehicleKind::Plane => StatusLabel::InFlight,
        VehicleKind::Ground => StatusLabel::EnRoute,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    fn started(hours: u64, minutes: u64) -> TimerState {
        let mut timer = TimerState::new();
        timer.set_countdown(hours, minutes, T0);
        timer
    }

    fn classify_at(timer: &TimerState, now_ms: i64, vehicle: VehicleKind) -> StatusLabel {
        classify(now_ms, timer, vehicle, &StatusWindows::default())
    }

    #[test]
    fn unset_timer_is_preparing() {
        let timer = TimerState::new();
        assert_eq!(classify_at(&timer, T0, VehicleKind::Plane), StatusLabel::Preparing);
    }

    #[test]
    fn trip_walks_through_every_phase() {
        let timer = started(1, 30);

        assert_eq!(classify_at(&timer, T0, VehicleKind::Ground), StatusLabel::Departing);
        assert_eq!(classify_at(&timer, T0 + 9_999, VehicleKind::Ground), StatusLabel::Departing);
        assert_eq!(classify_at(&timer, T0 + 10_000, VehicleKind::Ground), StatusLabel::EnRoute);
        assert_eq!(classify_at(&timer, T0 + 10_000, VehicleKind::Plane), StatusLabel::InFlight);

        let arriving = T0 + (5400 - 600) * 1000;
        assert_eq!(classify_at(&timer, arriving - 1_000, VehicleKind::Ground), StatusLabel::EnRoute);
        assert_eq!(classify_at(&timer, arriving, VehicleKind::Ground), StatusLabel::ArrivingSoon);

        assert_eq!(classify_at(&timer, T0 + 5_400_000, VehicleKind::Ground), StatusLabel::Arrived);
    }

    #[test]
    fn paused_outranks_everything() {
        let mut timer = started(0, 5);
        timer.pause(Some("break".to_string()), T0 + 1_000);
        assert_eq!(
            classify_at(&timer, T0 + 2_000, VehicleKind::Ground),
            StatusLabel::PausedWithReason("break".to_string())
        );

        timer.pause_reason = Some("   ".to_string());
        assert_eq!(classify_at(&timer, T0 + 2_000, VehicleKind::Ground), StatusLabel::Paused);
    }

    #[test]
    fn arrived_outranks_departing() {
        let mut timer = started(0, 1);
        timer.end_at_ms = T0 + 500;
        assert_eq!(classify_at(&timer, T0 + 600, VehicleKind::Ground), StatusLabel::Arrived);
    }

    #[test]
    fn short_trip_goes_straight_to_arriving_soon() {
        let timer = started(0, 5);
        assert_eq!(classify_at(&timer, T0 + 10_000, VehicleKind::Plane), StatusLabel::ArrivingSoon);
    }

    #[test]
    fn custom_windows_are_respected() {
        let timer = started(0, 30);
        let windows = StatusWindows {
            departing: Duration::from_secs(30),
            arriving: Duration::from_secs(1800),
            ..StatusWindows::default()
        };
        assert_eq!(classify(T0 + 20_000, &timer, VehicleKind::Ground, &windows), StatusLabel::Departing);
        assert_eq!(classify(T0 + 40_000, &timer, VehicleKind::Ground, &windows), StatusLabel::ArrivingSoon);
    }

    #[test]
    fn label_text() {
        assert_eq!(StatusLabel::InFlight.to_string(), "in flight…");
        assert_eq!(StatusLabel::paused(Some("fuel")).text(), "paused — fuel");
    }
}
