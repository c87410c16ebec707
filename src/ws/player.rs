//! Player message handlers
//!
//! Joining a lobby and voting. Successful calls reply with nothing: the
//! requester is a lobby member and sees the resulting broadcast.

use crate::protocol::ServerMessage;
use crate::state::AppState;
use std::sync::Arc;

pub async fn handle_join_lobby(
    state: &Arc<AppState>,
    connection_id: &str,
    lobby_id: String,
    name: String,
    device_id: String,
) -> Option<ServerMessage> {
    tracing::info!("Join request for lobby {} as {:?}", lobby_id, name);
    match state
        .join_lobby(&lobby_id, connection_id, &name, &device_id)
        .await
    {
        Ok(_) => None,
        Err(e) => Some(e.into()),
    }
}

pub async fn handle_vote(
    state: &Arc<AppState>,
    connection_id: &str,
    lobby_id: String,
    target_name: String,
) -> Option<ServerMessage> {
    match state.cast_vote(&lobby_id, connection_id, &target_name).await {
        Ok(()) => None,
        Err(e) => {
            tracing::debug!("Vote from {} rejected: {}", connection_id, e);
            Some(e.into())
        }
    }
}
