//! Background tasks module
//!
//! This module contains the overlay driver task and the cancellable timers
//! it schedules.

pub mod overlay_driver;
pub mod scheduled;

// Re-export main functions
pub use overlay_driver::{spawn_overlay, OverlayHandle, TICK_PERIOD};
pub use scheduled::{ScheduledTask, TaskSlot};
