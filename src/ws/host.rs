//! Host-only command handlers
//!
//! The lobby checks the caller against its host connection; anyone else gets
//! an `UNAUTHORIZED` error back.

use crate::protocol::ServerMessage;
use crate::state::AppState;
use std::sync::Arc;

pub async fn handle_save_settings(
    state: &Arc<AppState>,
    connection_id: &str,
    lobby_id: String,
    words: Vec<String>,
    imposter_count: usize,
) -> Option<ServerMessage> {
    tracing::info!("Saving settings for lobby {}", lobby_id);
    match state
        .save_settings(&lobby_id, connection_id, words, imposter_count)
        .await
    {
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("Settings for lobby {} rejected: {}", lobby_id, e);
            Some(e.into())
        }
    }
}

pub async fn handle_start_game(
    state: &Arc<AppState>,
    connection_id: &str,
    lobby_id: String,
) -> Option<ServerMessage> {
    tracing::info!("Start requested for lobby {}", lobby_id);
    match state.start_game(&lobby_id, connection_id).await {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!("Start of lobby {} rejected: {}", lobby_id, e);
            Some(e.into())
        }
    }
}
