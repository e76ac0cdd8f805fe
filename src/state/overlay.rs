//! The overlay controller: one owner for timer, labels, vehicle and transitions

use std::time::Duration;

use tracing::{debug, info};

use super::{
    command::{signed_whole, whole, Command},
    snapshot::{format_eta, DisplaySnapshot, OverlayDoc},
    status::{classify, StatusWindows},
    timer_state::TimerState,
    transition::TransitionScheduler,
    vehicle::{VehicleMode, VehicleSettings},
};

pub const EMPTY_LABEL: &str = "—";

/// Upper bound on any duration a command or document can request
const MAX_HOURS: u64 = 9_999;
const MAX_DURATION_MS: i64 = MAX_HOURS as i64 * 3_600_000;

/// Timer work the host has to carry out after a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// (Re)start the 1-second tick loop, replacing any running one
    StartTicking,
    StopTicking,
    ArmAutoResume(Duration),
    CancelAutoResume,
    ArmDepartingRelease(Duration),
    CancelDepartingRelease,
    /// Swap the status text once the hide phase is over
    ArmCrossfade(Duration),
}

/// Single owner of all overlay state.
///
/// Every mutation takes the current time and returns the effects to apply;
/// nothing here sleeps or spawns.
#[derive(Debug, Clone)]
pub struct Overlay {
    timer: TimerState,
    vehicle: VehicleSettings,
    from: String,
    to: String,
    windows: StatusWindows,
    transitions: TransitionScheduler,
    ticking: bool,
    updated_at_ms: i64,
}

impl Overlay {
    pub fn new(windows: StatusWindows) -> Self {
        Self {
            timer: TimerState::new(),
            vehicle: VehicleSettings::default(),
            from: EMPTY_LABEL.to_string(),
            to: EMPTY_LABEL.to_string(),
            windows,
            transitions: TransitionScheduler::new(),
            ticking: false,
            updated_at_ms: 0,
        }
    }

    /// Set the initial route labels
    pub fn with_labels(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.from = non_empty(from.into());
        self.to = non_empty(to.into());
        self
    }

    pub fn with_vehicle(mut self, vehicle: VehicleSettings) -> Self {
        self.vehicle = vehicle;
        self.vehicle.normalize();
        self
    }

    pub fn timer(&self) -> &TimerState {
        &self.timer
    }

    pub fn vehicle(&self) -> &VehicleSettings {
        &self.vehicle
    }

    pub fn transitions(&self) -> &TransitionScheduler {
        &self.transitions
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// Apply a control message
    pub fn apply(&mut self, command: Command, now_ms: i64) -> Vec<Effect> {
        let mut effects = Vec::new();
        if command == Command::Unknown {
            debug!("Ignoring unknown overlay command");
            return effects;
        }

        debug!("Applying overlay command {}", command.name());
        self.updated_at_ms = now_ms;

        match command {
            Command::SetCountdown { hours, minutes } => {
                self.set_countdown(whole(hours).min(MAX_HOURS), whole(minutes).min(59), now_ms, &mut effects);
            }
            Command::AddMinutes { minutes } => {
                let limit = (MAX_HOURS * 60) as i64;
                let delta = signed_whole(minutes).clamp(-limit, limit);
                self.timer.add_minutes(delta, now_ms);
                info!("Adjusted countdown by {} minutes, baseline now {}s", delta, self.timer.baseline_sec);
            }
            Command::ResetCountdown => {
                self.timer.reset_countdown(now_ms);
                info!("Countdown reset to {}s", self.timer.baseline_sec);
            }
            Command::Stop => {
                self.timer.stop();
                self.transitions.release_departing();
                effects.push(Effect::CancelDepartingRelease);
                effects.push(Effect::CancelAutoResume);
                info!("Countdown stopped");
            }
            Command::Pause { reason, minutes } => {
                self.pause(reason, minutes, now_ms, &mut effects);
            }
            Command::Resume => self.resume(now_ms, &mut effects),
            Command::TogglePause { reason } => {
                if self.timer.paused {
                    self.resume(now_ms, &mut effects);
                } else {
                    self.pause(reason, 0.0, now_ms, &mut effects);
                }
            }
            Command::Update { from, to, rv } => {
                if let Some(from) = from {
                    self.from = non_empty(from);
                }
                if let Some(to) = to {
                    self.to = non_empty(to);
                }
                if let Some(rv) = rv.filter(|rv| !rv.trim().is_empty()) {
                    self.vehicle.mode = VehicleMode::Image;
                    self.vehicle.image = rv;
                }
            }
            Command::SelectVehicle { mode, preset } => {
                if let Some(mode) = mode.as_deref().and_then(VehicleMode::parse) {
                    self.vehicle.mode = mode;
                }
                if let Some(preset) = preset {
                    if !self.vehicle.apply_preset(&preset) {
                        debug!("Ignoring unknown vehicle preset: {}", preset);
                    }
                }
            }
            Command::VehicleEmoji { emoji } => {
                if let Some(emoji) = emoji.filter(|e| !e.trim().is_empty()) {
                    self.vehicle.mode = VehicleMode::Emoji;
                    self.vehicle.emoji = emoji;
                }
            }
            Command::VehicleImage { url } => {
                if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
                    self.vehicle.mode = VehicleMode::Image;
                    self.vehicle.image = url;
                }
            }
            Command::Unknown => {}
        }

        self.sync_ticking(now_ms, false, &mut effects);
        self.refresh(now_ms, &mut effects);
        effects
    }

    fn set_countdown(&mut self, hours: u64, minutes: u64, now_ms: i64, effects: &mut Vec<Effect>) {
        self.timer.set_countdown(hours, minutes, now_ms);
        effects.push(Effect::CancelAutoResume);

        if self.timer.is_set() {
            self.transitions.pin_departing();
            effects.push(Effect::ArmDepartingRelease(self.windows.departing));
        } else {
            self.transitions.release_departing();
            effects.push(Effect::CancelDepartingRelease);
        }

        info!("Countdown set to {}h {}m ({}s)", hours, minutes, self.timer.baseline_sec);
        self.sync_ticking(now_ms, true, effects);
    }

    fn pause(&mut self, reason: Option<String>, minutes: f64, now_ms: i64, effects: &mut Vec<Effect>) {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        if self.timer.pause(reason, now_ms) {
            info!(
                "Paused with {}s remaining (reason: {})",
                self.timer.remaining_sec(now_ms),
                self.timer.pause_reason.as_deref().unwrap_or("none")
            );
        }

        if minutes.is_finite() && minutes > 0.0 {
            let delay = Duration::from_secs_f64(minutes.min((MAX_HOURS * 60) as f64) * 60.0);
            info!("Auto-resume scheduled in {:?}", delay);
            effects.push(Effect::ArmAutoResume(delay));
        } else {
            effects.push(Effect::CancelAutoResume);
        }
    }

    fn resume(&mut self, now_ms: i64, effects: &mut Vec<Effect>) {
        if self.timer.resume(now_ms) {
            info!("Resumed with {}s remaining", self.timer.remaining_sec(now_ms));
        }
        effects.push(Effect::CancelAutoResume);
    }

    /// Scheduled resume after a timed pause
    pub fn auto_resume(&mut self, now_ms: i64) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.timer.paused {
            info!("Auto-resume timer elapsed");
            self.updated_at_ms = now_ms;
            self.resume(now_ms, &mut effects);
        }
        self.sync_ticking(now_ms, false, &mut effects);
        self.refresh(now_ms, &mut effects);
        effects
    }

    /// The departing grace period is over, classify normally again
    pub fn release_departing(&mut self, now_ms: i64) -> Vec<Effect> {
        let mut effects = Vec::new();
        debug!("Departing window elapsed");
        self.transitions.release_departing();
        self.refresh(now_ms, &mut effects);
        effects
    }

    /// One-second recompute
    pub fn tick(&mut self, now_ms: i64) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.sync_ticking(now_ms, false, &mut effects);
        if self.timer.is_exhausted(now_ms) && effects.contains(&Effect::StopTicking) {
            info!("Countdown finished, arrived at {}", self.to);
        }
        self.refresh(now_ms, &mut effects);
        effects
    }

    /// The hide phase of a crossfade is over
    pub fn complete_crossfade(&mut self) {
        self.transitions.complete_crossfade();
        debug!("Status text swapped to {}", self.transitions.shown());
    }

    /// Merge a pushed backing-store document over the current state
    pub fn merge_doc(&mut self, doc: OverlayDoc, now_ms: i64) -> Vec<Effect> {
        let mut effects = Vec::new();

        if let Some(from) = doc.from {
            self.from = non_empty(from);
        }
        if let Some(to) = doc.to {
            self.to = non_empty(to);
        }
        if let Some(mut vehicle) = doc.vehicle {
            vehicle.normalize();
            self.vehicle = vehicle;
        }
        if let Some(baseline_sec) = doc.baseline_sec {
            self.timer.baseline_sec = baseline_sec.min(MAX_HOURS * 3600);
        }
        // timestamps may not run further ahead of now than the longest countdown
        let horizon = now_ms.saturating_add(MAX_DURATION_MS);
        if let Some(started_at) = doc.started_at {
            self.timer.started_at_ms = started_at.clamp(0, horizon);
        }
        if let Some(end_at) = doc.end_at {
            self.timer.end_at_ms = end_at.clamp(0, horizon);
        }
        if let Some(paused_at) = doc.paused_at {
            self.timer.paused_at_ms = paused_at.clamp(0, horizon);
        }
        if let Some(paused_remaining) = doc.paused_remaining {
            self.timer.paused_remaining_ms = paused_remaining.clamp(0, MAX_DURATION_MS);
        }
        if let Some(paused) = doc.paused {
            if !paused && self.timer.paused {
                effects.push(Effect::CancelAutoResume);
            }
            self.timer.paused = paused;
        }
        if doc.pause_reason.is_some() {
            self.timer.pause_reason = doc.pause_reason.filter(|r| !r.trim().is_empty());
        }
        if !self.timer.paused {
            self.timer.pause_reason = None;
        }
        self.updated_at_ms = doc.updated_at.unwrap_or(now_ms);

        debug!(
            "Merged overlay document: baseline={}s paused={}",
            self.timer.baseline_sec, self.timer.paused
        );

        self.sync_ticking(now_ms, false, &mut effects);
        self.refresh(now_ms, &mut effects);
        effects
    }

    /// Export the state in backing-store form
    pub fn to_doc(&self) -> OverlayDoc {
        OverlayDoc {
            from: Some(self.from.clone()),
            to: Some(self.to.clone()),
            vehicle: Some(self.vehicle.clone()),
            baseline_sec: Some(self.timer.baseline_sec),
            started_at: Some(self.timer.started_at_ms),
            end_at: Some(self.timer.end_at_ms),
            paused: Some(self.timer.paused),
            paused_at: Some(self.timer.paused_at_ms),
            paused_remaining: Some(self.timer.paused_remaining_ms),
            pause_reason: self.timer.pause_reason.clone(),
            updated_at: Some(self.updated_at_ms),
        }
    }

    /// Derive the frame for the render sink
    pub fn snapshot(&self, now_ms: i64) -> DisplaySnapshot {
        let remaining_sec = self.timer.remaining_sec(now_ms);
        let status = self.transitions.target().clone();

        DisplaySnapshot {
            remaining_sec,
            progress: self.timer.progress(now_ms),
            status_text: status.text(),
            status,
            shown_status: self.transitions.shown().clone(),
            fading: self.transitions.is_fading(),
            eta_text: format_eta(remaining_sec, self.timer.is_set(), self.timer.paused),
            from: self.from.clone(),
            to: self.to.clone(),
            vehicle: self.vehicle.descriptor(),
        }
    }

    fn sync_ticking(&mut self, now_ms: i64, restart: bool, effects: &mut Vec<Effect>) {
        let should_tick = self.timer.is_running(now_ms);
        if should_tick && (restart || !self.ticking) {
            self.ticking = true;
            effects.push(Effect::StartTicking);
        } else if !should_tick && self.ticking {
            self.ticking = false;
            effects.push(Effect::StopTicking);
        }
    }

    fn refresh(&mut self, now_ms: i64, effects: &mut Vec<Effect>) {
        let label = classify(now_ms, &self.timer, self.vehicle.kind(), &self.windows);
        let label = self.transitions.pinned(label);

        if let Some(crossfade) = self.transitions.propose(label) {
            info!("Status changing: {} -> {}", crossfade.from, crossfade.to);
            effects.push(Effect::ArmCrossfade(self.windows.crossfade));
        }
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new(StatusWindows::default())
    }
}

fn non_empty(label: String) -> String {
    if label.trim().is_empty() {
        EMPTY_LABEL.to_string()
    } else {
        label
    }
}
