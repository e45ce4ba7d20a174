//! HTTP endpoints next to the relay socket.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::infrastructure::dto::http::QueueStatusDto;

use super::super::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current round state and queued players (non-mutating read)
pub async fn queue_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<QueueStatusDto>, StatusCode> {
    match state.coordinator.queue_status().await {
        Some(status) => Ok(Json(status.into())),
        // Coordinator task is gone; nothing sensible to report
        None => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}
