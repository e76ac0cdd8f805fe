//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use serde_json::Value;
use tracing::error;

use crate::state::{AppState, Command, DisplaySnapshot, OverlayDoc};
use super::responses::{CommandResponse, HealthResponse, StatusResponse};

/// Handle POST /command - Apply a control message
pub async fn command_handler(
    State(state): State<Arc<AppState>>,
    Json(message): Json<Value>,
) -> Result<Json<CommandResponse>, StatusCode> {
    let command = Command::from_value(message);
    let known = command != Command::Unknown;
    let name = command.name();

    match state.submit_command(command).await {
        Ok(display) if known => Ok(Json(CommandResponse::applied(
            format!("Command {} applied", name),
            display,
        ))),
        Ok(display) => Ok(Json(CommandResponse::ignored(
            "Unknown command ignored".to_string(),
            display,
        ))),
        Err(e) => {
            error!("Failed to apply command {}: {}", name, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle PUT /state - Merge a pushed state document
pub async fn merge_state_handler(
    State(state): State<Arc<AppState>>,
    Json(doc): Json<OverlayDoc>,
) -> Result<Json<CommandResponse>, StatusCode> {
    match state.merge_document(doc).await {
        Ok(display) => Ok(Json(CommandResponse::applied(
            "State document merged".to_string(),
            display,
        ))),
        Err(e) => {
            error!("Failed to merge state document: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /state - Export the state document
pub async fn get_state_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OverlayDoc>, StatusCode> {
    state.export_document().await.map(Json).map_err(|e| {
        error!("Failed to export state document: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Handle GET /display - Return the latest frame
pub async fn display_handler(State(state): State<Arc<AppState>>) -> Json<DisplaySnapshot> {
    Json(state.get_display())
}

/// Handle GET /events - Stream every painted frame
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe_display();

    let frames = stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first {
            rx.changed().await.ok()?;
        }
        let snapshot = rx.borrow_and_update().clone();
        let event = Event::default()
            .event("display")
            .json_data(&snapshot)
            .unwrap_or_else(|e| Event::default().comment(format!("encode failed: {}", e)));
        Some((Ok(event), (rx, false)))
    });

    Sse::new(frames).keep_alive(KeepAlive::default())
}

/// Handle GET /status - Return current server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        room: state.room.clone(),
        display: state.get_display(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
