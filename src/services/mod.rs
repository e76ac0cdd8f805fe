//! External collaborators module
//!
//! This module contains the render sinks that present overlay frames.

pub mod render_sink;

// Re-export main types
pub use render_sink::{RenderSink, TracingSink};
