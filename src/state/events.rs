//! Events consumed by the overlay driver

use tokio::sync::oneshot;

use super::{command::Command, snapshot::{DisplaySnapshot, OverlayDoc}};

/// Which scheduled timer fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Tick,
    AutoResume,
    DepartingRelease,
    Crossfade,
}

/// A timer firing, tagged with the generation of the slot that armed it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub kind: TimerKind,
    pub generation: u64,
}

/// Everything that can reach the overlay, applied strictly in arrival order
#[derive(Debug)]
pub enum OverlayEvent {
    Command {
        command: Command,
        reply: Option<oneshot::Sender<DisplaySnapshot>>,
    },
    Document {
        doc: OverlayDoc,
        reply: Option<oneshot::Sender<DisplaySnapshot>>,
    },
    Export {
        reply: oneshot::Sender<OverlayDoc>,
    },
    Timer(TimerFired),
}
