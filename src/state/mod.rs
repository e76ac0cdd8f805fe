//! State management module
//!
//! This module contains the overlay core (timer math, status classification,
//! transitions) and the shared application state that fronts it.

pub mod app_state;
pub mod clock;
pub mod command;
pub mod events;
pub mod overlay;
pub mod snapshot;
pub mod status;
pub mod timer_state;
pub mod transition;
pub mod vehicle;

// Re-export main types
pub use app_state::AppState;
pub use clock::{Clock, MonotonicClock, SystemClock};
pub use command::Command;
pub use events::{OverlayEvent, TimerFired, TimerKind};
pub use overlay::{Effect, Overlay};
pub use snapshot::{DisplaySnapshot, OverlayDoc};
pub use status::{classify, StatusLabel, StatusWindows};
pub use timer_state::TimerState;
pub use transition::{Crossfade, TransitionScheduler};
pub use vehicle::{VehicleDescriptor, VehicleKind, VehicleMode, VehicleSettings};
