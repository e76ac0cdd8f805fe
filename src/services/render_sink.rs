//! Render sinks consuming display snapshots

use tokio::sync::watch;
use tracing::{debug, info};

use crate::state::{DisplaySnapshot, StatusLabel};

/// Anything that presents overlay frames
pub trait RenderSink: Send {
    fn paint(&mut self, snapshot: &DisplaySnapshot);
}

/// Publishes the latest frame to HTTP readers and event streams
impl RenderSink for watch::Sender<DisplaySnapshot> {
    fn paint(&mut self, snapshot: &DisplaySnapshot) {
        self.send_replace(snapshot.clone());
    }
}

/// Logs status changes at info and ETA changes at debug
#[derive(Debug, Default)]
pub struct TracingSink {
    last_status: Option<StatusLabel>,
    last_eta: String,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSink for TracingSink {
    fn paint(&mut self, snapshot: &DisplaySnapshot) {
        if self.last_status.as_ref() != Some(&snapshot.status) {
            info!(
                "Overlay {} -> {}: {} | {} | {:.1}%",
                snapshot.from,
                snapshot.to,
                snapshot.status_text,
                snapshot.eta_text,
                snapshot.progress * 100.0
            );
            self.last_status = Some(snapshot.status.clone());
        } else if self.last_eta != snapshot.eta_text {
            debug!("Overlay {} ({:.1}%)", snapshot.eta_text, snapshot.progress * 100.0);
        }
        self.last_eta = snapshot.eta_text.clone();
    }
}
