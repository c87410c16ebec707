//! Read-only HTTP endpoints.
//!
//! Lets a client check a lobby code before opening the join flow.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub lobbies: usize,
    pub connections: usize,
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        lobbies: state.lobby_count().await,
        connections: state.connections.count().await,
    })
}

/// GET /api/lobbies/{id}
///
/// Returns phase and player count only; rosters go over the socket.
pub async fn get_lobby(
    State(state): State<Arc<AppState>>,
    Path(lobby_id): Path<String>,
) -> Response {
    match state.lobby_summary(&lobby_id).await {
        Some(summary) => Json(summary).into_response(),
        None => (StatusCode::NOT_FOUND, "Lobby not found").into_response(),
    }
}
