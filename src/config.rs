//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::state::{StatusWindows, VehicleSettings};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "eta-overlay")]
#[command(about = "A state-managed HTTP server driving a live vehicle ETA overlay")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Overlay room this server drives
    #[arg(short, long, default_value = "marathon-pill-tracker")]
    pub room: String,

    /// Initial origin label
    #[arg(long, default_value = "—")]
    pub from: String,

    /// Initial destination label
    #[arg(long, default_value = "—")]
    pub to: String,

    /// Initial vehicle image reference
    #[arg(long, default_value = "assets/bus.png")]
    pub rv: String,

    /// Seconds a fresh countdown reads as departing
    #[arg(long, default_value = "10")]
    pub departing_secs: u64,

    /// Remaining seconds under which the trip reads as arriving soon
    #[arg(long, default_value = "600")]
    pub arriving_secs: u64,

    /// Hide phase of a status crossfade in milliseconds
    #[arg(long, default_value = "120")]
    pub crossfade_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn status_windows(&self) -> StatusWindows {
        StatusWindows {
            departing: Duration::from_secs(self.departing_secs),
            arriving: Duration::from_secs(self.arriving_secs),
            crossfade: Duration::from_millis(self.crossfade_ms),
        }
    }

    pub fn vehicle(&self) -> VehicleSettings {
        VehicleSettings::image(self.rv.clone())
    }
}
