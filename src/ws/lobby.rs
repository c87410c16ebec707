//! Lobby creation

use crate::protocol::ServerMessage;
use crate::state::AppState;
use std::sync::Arc;

pub async fn handle_create_lobby(
    state: &Arc<AppState>,
    connection_id: &str,
) -> Option<ServerMessage> {
    let lobby_id = state.create_lobby(connection_id).await;
    Some(ServerMessage::LobbyCreated { lobby_id })
}
