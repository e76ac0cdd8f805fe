//! Derived display snapshots and the backing-store document

use serde::{Deserialize, Serialize};

use super::{
    status::StatusLabel,
    vehicle::{VehicleDescriptor, VehicleSettings},
};

/// Everything the render sink needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub remaining_sec: u64,
    pub progress: f64,
    /// Classified status, what the status line is showing or fading towards
    pub status: StatusLabel,
    /// Status whose text is on screen right now
    pub shown_status: StatusLabel,
    /// True while a crossfade hides the old text
    pub fading: bool,
    pub status_text: String,
    pub eta_text: String,
    pub from: String,
    pub to: String,
    pub vehicle: VehicleDescriptor,
}

/// Format the ETA line the way the overlay prints it
pub fn format_eta(remaining_sec: u64, baseline_set: bool, paused: bool) -> String {
    if paused {
        return "ETA paused".to_string();
    }
    if !baseline_set {
        return "ETA --:--".to_string();
    }

    let hours = remaining_sec / 3600;
    let minutes = (remaining_sec % 3600) / 60;
    if hours > 0 {
        format!("ETA {}h {}m", hours, minutes)
    } else {
        format!("ETA {}m", minutes)
    }
}

/// Overlay state as a realtime backing store holds it.
///
/// Every field is optional on input; a pushed document is merged field by
/// field over the current state, last write wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<VehicleSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_sec: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_remaining: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eta_formats() {
        assert_eq!(format_eta(5400, true, false), "ETA 1h 30m");
        assert_eq!(format_eta(719, true, false), "ETA 11m");
        assert_eq!(format_eta(0, true, false), "ETA 0m");
        assert_eq!(format_eta(0, false, false), "ETA --:--");
        assert_eq!(format_eta(300, true, true), "ETA paused");
    }

    #[test]
    fn partial_document_parses() {
        let doc: OverlayDoc = serde_json::from_str(
            r#"{"from":"Austin","baselineSec":3600,"startedAt":1000,"vehicle":{"mode":"emoji"}}"#,
        )
        .unwrap();

        assert_eq!(doc.from.as_deref(), Some("Austin"));
        assert_eq!(doc.baseline_sec, Some(3600));
        assert_eq!(doc.to, None);
        let vehicle = doc.vehicle.unwrap();
        assert_eq!(vehicle.emoji, "✈️");
        assert_eq!(vehicle.image, "assets/bus.png");
    }
}
