//! Control messages accepted by the overlay

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A discrete control message, tagged by `type`.
///
/// Numeric fields are lenient: numbers, numeric strings, null and garbage
/// are all accepted, anything unreadable counts as 0.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    #[serde(rename = "eta:setCountdown")]
    SetCountdown {
        #[serde(default, deserialize_with = "lenient_number")]
        hours: f64,
        #[serde(default, deserialize_with = "lenient_number")]
        minutes: f64,
    },
    #[serde(rename = "eta:addMinutes")]
    AddMinutes {
        #[serde(default, deserialize_with = "lenient_number")]
        minutes: f64,
    },
    #[serde(rename = "eta:resetCountdown")]
    ResetCountdown,
    #[serde(rename = "eta:stop")]
    Stop,
    #[serde(rename = "rv:pause")]
    Pause {
        #[serde(default, deserialize_with = "lenient_string")]
        reason: Option<String>,
        #[serde(default, deserialize_with = "lenient_number")]
        minutes: f64,
    },
    #[serde(rename = "rv:resume")]
    Resume,
    #[serde(rename = "rv:togglePause")]
    TogglePause {
        #[serde(default, deserialize_with = "lenient_string")]
        reason: Option<String>,
    },
    #[serde(rename = "rv:update")]
    Update {
        #[serde(default, deserialize_with = "lenient_string")]
        from: Option<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        to: Option<String>,
        #[serde(default, alias = "vehicle", deserialize_with = "lenient_string")]
        rv: Option<String>,
    },
    #[serde(rename = "vehicle:select")]
    SelectVehicle {
        #[serde(default, deserialize_with = "lenient_string")]
        mode: Option<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        preset: Option<String>,
    },
    #[serde(rename = "vehicle:emoji")]
    VehicleEmoji {
        #[serde(default, deserialize_with = "lenient_string")]
        emoji: Option<String>,
    },
    #[serde(rename = "vehicle:image")]
    VehicleImage {
        #[serde(default, deserialize_with = "lenient_string")]
        url: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl Command {
    /// Interpret an arbitrary JSON message; anything unrecognised is `Unknown`
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or(Self::Unknown)
    }

    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetCountdown { .. } => "eta:setCountdown",
            Self::AddMinutes { .. } => "eta:addMinutes",
            Self::ResetCountdown => "eta:resetCountdown",
            Self::Stop => "eta:stop",
            Self::Pause { .. } => "rv:pause",
            Self::Resume => "rv:resume",
            Self::TogglePause { .. } => "rv:togglePause",
            Self::Update { .. } => "rv:update",
            Self::SelectVehicle { .. } => "vehicle:select",
            Self::VehicleEmoji { .. } => "vehicle:emoji",
            Self::VehicleImage { .. } => "vehicle:image",
            Self::Unknown => "unknown",
        }
    }
}

/// Non-negative whole amount, negatives and non-finite values become 0
pub fn whole(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.trunc() as u64
    } else {
        0
    }
}

/// Signed whole amount, non-finite values become 0
pub fn signed_whole(value: f64) -> i64 {
    if value.is_finite() {
        value.trunc() as i64
    } else {
        0
    }
}

fn number_from_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = value.as_ref().map(number_from_value).unwrap_or(0.0);
    Ok(if number.is_finite() { number } else { 0.0 })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}
