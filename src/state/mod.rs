mod membership;
mod registry;
pub mod roles;
mod session;
pub mod vote;

use crate::broadcast::Connections;
use crate::protocol::ServerMessage;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use registry::normalize_lobby_id;

/// Shared application state
///
/// Every handler takes the `lobbies` write lock for its whole run, so each
/// inbound event is applied to a lobby atomically. Lock order is always
/// `lobbies` before the connection registry.
#[derive(Clone)]
pub struct AppState {
    pub lobbies: Arc<RwLock<HashMap<LobbyId, Lobby>>>,
    pub connections: Connections,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            lobbies: Arc::new(RwLock::new(HashMap::new())),
            connections: Connections::new(),
        }
    }

    /// Send a message to every member of a lobby
    async fn broadcast_to_lobby(&self, lobby: &Lobby, msg: ServerMessage) {
        self.connections.broadcast(&lobby.members, msg).await;
    }

    async fn broadcast_player_list(&self, lobby: &Lobby) {
        self.broadcast_to_lobby(
            lobby,
            ServerMessage::PlayerList {
                players: lobby.player_names(),
            },
        )
        .await;
    }

    /// Announce the outcome and tear the lobby down
    async fn end_game(
        &self,
        lobbies: &mut HashMap<LobbyId, Lobby>,
        lobby_id: &str,
        outcome: GameOutcome,
    ) {
        let Some(mut lobby) = lobbies.remove(lobby_id) else {
            return;
        };
        lobby.phase = LobbyPhase::Ended;

        tracing::info!(
            "Lobby {} ended after {} rounds: {}",
            lobby.id,
            lobby.round_no,
            outcome.message()
        );

        self.broadcast_to_lobby(
            &lobby,
            ServerMessage::GameOver {
                outcome,
                message: outcome.message().to_string(),
                imposters: lobby.imposters.clone(),
                word: lobby.secret_word.clone(),
            },
        )
        .await;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
