//! Main application state management

use std::{sync::Mutex, time::Instant};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use super::{Command, DisplaySnapshot, OverlayDoc};
use crate::tasks::OverlayHandle;

/// Application state shared by the HTTP handlers
#[derive(Debug)]
pub struct AppState {
    /// Front door to the overlay driver task
    pub overlay: OverlayHandle,
    /// Overlay room this server drives
    pub room: String,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(overlay: OverlayHandle, room: String, port: u16, host: String) -> Self {
        Self {
            overlay,
            room,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Submit a control command and return the frame it produced
    pub async fn submit_command(&self, command: Command) -> Result<DisplaySnapshot, String> {
        if command == Command::Unknown {
            warn!("Ignoring unknown command in room {}", self.room);
        } else {
            info!("Command {} for room {}", command.name(), self.room);
            self.record_action(command.name());
        }
        self.overlay.command(command).await
    }

    /// Merge a document pushed by the backing store
    pub async fn merge_document(&self, doc: OverlayDoc) -> Result<DisplaySnapshot, String> {
        info!("Merging pushed state document for room {}", self.room);
        self.record_action("state:merge");
        self.overlay.merge(doc).await
    }

    pub async fn export_document(&self) -> Result<OverlayDoc, String> {
        self.overlay.export().await
    }

    /// Latest painted frame
    pub fn get_display(&self) -> DisplaySnapshot {
        self.overlay.display()
    }

    pub fn subscribe_display(&self) -> watch::Receiver<DisplaySnapshot> {
        self.overlay.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
