//! Status crossfade debouncing and the departing pin

use serde::Serialize;

use super::status::StatusLabel;

/// A crossfade that just started; the host arms the text swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crossfade {
    pub from: StatusLabel,
    pub to: StatusLabel,
}

/// Tracks which status is on screen and which one it is fading towards
#[derive(Debug, Clone)]
pub struct TransitionScheduler {
    shown: StatusLabel,
    target: StatusLabel,
    fading: bool,
    departing_pinned: bool,
    crossfades: u64,
}

impl TransitionScheduler {
    pub fn new() -> Self {
        Self {
            shown: StatusLabel::Preparing,
            target: StatusLabel::Preparing,
            fading: false,
            departing_pinned: false,
            crossfades: 0,
        }
    }

    /// Label whose text is currently on screen
    pub fn shown(&self) -> &StatusLabel {
        &self.shown
    }

    /// Label the display is showing or fading towards
    pub fn target(&self) -> &StatusLabel {
        &self.target
    }

    pub fn is_fading(&self) -> bool {
        self.fading
    }

    /// Number of crossfades started so far
    pub fn crossfades(&self) -> u64 {
        self.crossfades
    }

    pub fn is_departing_pinned(&self) -> bool {
        self.departing_pinned
    }

    /// Hold the status at departing until `release_departing` is called
    pub fn pin_departing(&mut self) {
        self.departing_pinned = true;
    }

    pub fn release_departing(&mut self) {
        self.departing_pinned = false;
    }

    /// Apply the departing pin to a freshly classified label.
    ///
    /// Pauses and arrivals pass through; moving labels read as departing.
    pub fn pinned(&self, label: StatusLabel) -> StatusLabel {
        if !self.departing_pinned {
            return label;
        }
        match label {
            StatusLabel::EnRoute | StatusLabel::InFlight | StatusLabel::ArrivingSoon => {
                StatusLabel::Departing
            }
            other => other,
        }
    }

    /// Offer a newly computed label.
    ///
    /// Returns the crossfade to run when one has to start. Repeating the
    /// current target is a no-op, and a change during an in-flight fade
    /// only retargets it.
    pub fn propose(&mut self, label: StatusLabel) -> Option<Crossfade> {
        if label == self.target {
            return None;
        }

        self.target = label;
        if self.fading {
            return None;
        }

        self.fading = true;
        self.crossfades += 1;
        Some(Crossfade {
            from: self.shown.clone(),
            to: self.target.clone(),
        })
    }

    /// Swap the text once the hide phase is over and reveal it
    pub fn complete_crossfade(&mut self) {
        self.shown = self.target.clone();
        self.fading = false;
    }
}

impl Default for TransitionScheduler {
    fn default() -> Self {
        Self::new()
    }
}
