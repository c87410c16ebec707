//! WebSocket message dispatch
//!
//! Entry point for inbound frames. Replies returned from here go to the
//! requesting connection only; lobby-wide traffic is broadcast by `AppState`.

use crate::error::LobbyError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

use super::{host, lobby, player};

/// Parse a text frame and handle it. Malformed frames get `INVALID_REQUEST`.
pub async fn handle_text(
    text: &str,
    connection_id: &str,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => handle_message(msg, connection_id, state).await,
        Err(e) => {
            tracing::warn!("Failed to parse client message: {}", e);
            Some(LobbyError::InvalidRequest(format!("Invalid message format: {}", e)).into())
        }
    }
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    connection_id: &str,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::CreateLobby => lobby::handle_create_lobby(state, connection_id).await,

        ClientMessage::JoinLobby {
            lobby_id,
            name,
            device_id,
        } => player::handle_join_lobby(state, connection_id, lobby_id, name, device_id).await,

        ClientMessage::VotePlayer {
            lobby_id,
            target_name,
        } => player::handle_vote(state, connection_id, lobby_id, target_name).await,

        // Host-only commands (host identity checked per lobby)
        ClientMessage::SaveSettings {
            lobby_id,
            words,
            imposter_count,
        } => host::handle_save_settings(state, connection_id, lobby_id, words, imposter_count).await,

        ClientMessage::StartGame { lobby_id } => {
            host::handle_start_game(state, connection_id, lobby_id).await
        }
    }
}
