//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::DisplaySnapshot;

/// API response structure for command and document endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub display: DisplaySnapshot,
}

impl CommandResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, display: DisplaySnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            display,
        }
    }

    /// Create an applied response
    pub fn applied(message: String, display: DisplaySnapshot) -> Self {
        Self::new("applied".to_string(), message, display)
    }

    /// Create an ignored response
    pub fn ignored(message: String, display: DisplaySnapshot) -> Self {
        Self::new("ignored".to_string(), message, display)
    }
}

/// Server status with the current overlay frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub room: String,
    pub display: DisplaySnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
