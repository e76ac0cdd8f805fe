//! ETA Overlay - A state-managed HTTP server driving a live "vehicle en route" overlay
//!
//! This library provides the ETA countdown, progress and status state machine
//! behind a stream overlay, plus the HTTP surface that feeds it commands and
//! serves the derived frames.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, Overlay};
pub use api::create_router;
pub use tasks::spawn_overlay;
pub use utils::signals::shutdown_signal;
