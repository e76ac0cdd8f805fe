//! Vehicle settings and plane/ground classification

use serde::{Deserialize, Serialize};

const PLANE_GLYPHS: [char; 4] = ['✈', '🛩', '🛫', '🛬'];
const PLANE_ASSET_PATTERNS: [&str; 3] = ["plane", "jet", "flight"];

pub const DEFAULT_EMOJI: &str = "✈️";
pub const DEFAULT_IMAGE: &str = "assets/bus.png";
pub const RV_IMAGE: &str = "assets/rv.png";

/// How the vehicle is drawn on the lane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleMode {
    Emoji,
    #[default]
    Image,
}

impl VehicleMode {
    /// Lenient parse, unknown modes yield None
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "emoji" => Some(Self::Emoji),
            "image" | "img" => Some(Self::Image),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    Plane,
    Ground,
}

/// Vehicle settings as stored in the overlay document.
///
/// Both the glyph and the image are kept so switching mode loses neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSettings {
    #[serde(default)]
    pub mode: VehicleMode,
    #[serde(default = "default_emoji")]
    pub emoji: String,
    #[serde(default = "default_image")]
    pub image: String,
}

fn default_emoji() -> String {
    DEFAULT_EMOJI.to_string()
}

fn default_image() -> String {
    DEFAULT_IMAGE.to_string()
}

impl Default for VehicleSettings {
    fn default() -> Self {
        Self {
            mode: VehicleMode::Image,
            emoji: default_emoji(),
            image: default_image(),
        }
    }
}

/// What the render sink needs to draw the vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDescriptor {
    pub kind: VehicleKind,
    pub mode: VehicleMode,
    /// Emoji glyph or image reference, depending on mode
    pub reference: String,
}

impl VehicleSettings {
    /// Settings drawing an image
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            mode: VehicleMode::Image,
            image: url.into(),
            ..Self::default()
        }
    }

    /// Apply a named preset. Returns false for unknown presets.
    pub fn apply_preset(&mut self, preset: &str) -> bool {
        match preset.trim().to_ascii_lowercase().as_str() {
            "plane" | "flight" => {
                self.mode = VehicleMode::Emoji;
                self.emoji = DEFAULT_EMOJI.to_string();
            }
            "bus" | "car" | "drive" => {
                self.mode = VehicleMode::Image;
                self.image = DEFAULT_IMAGE.to_string();
            }
            "rv" => {
                self.mode = VehicleMode::Image;
                self.image = RV_IMAGE.to_string();
            }
            _ => return false,
        }
        true
    }

    /// Fill in blanks left by a partial document
    pub fn normalize(&mut self) {
        if self.emoji.trim().is_empty() {
            self.emoji = default_emoji();
        }
        if self.image.trim().is_empty() {
            self.image = default_image();
        }
    }

    pub fn kind(&self) -> VehicleKind {
        let plane = match self.mode {
            VehicleMode::Emoji => self.emoji.chars().any(|c| PLANE_GLYPHS.contains(&c)),
            VehicleMode::Image => is_plane_asset(&self.image),
        };
        if plane {
            VehicleKind::Plane
        } else {
            VehicleKind::Ground
        }
    }

    pub fn descriptor(&self) -> VehicleDescriptor {
        let reference = match self.mode {
            VehicleMode::Emoji => self.emoji.clone(),
            VehicleMode::Image => self.image.clone(),
        };
        VehicleDescriptor {
            kind: self.kind(),
            mode: self.mode,
            reference,
        }
    }
}

/// Match the file name of an image reference against plane asset names
fn is_plane_asset(reference: &str) -> bool {
    let path = reference.split(['?', '#']).next().unwrap_or_default();
    let file_name = path.rsplit('/').next().unwrap_or_default().to_lowercase();
    PLANE_ASSET_PATTERNS
        .iter()
        .any(|pattern| file_name.contains(pattern))
}
