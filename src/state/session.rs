//! Disconnect reconciliation

use super::AppState;
use crate::protocol::ServerMessage;
use crate::types::*;
use std::collections::HashMap;

/// What dropping a connection changed in one lobby
#[derive(Debug, Default, PartialEq)]
pub struct Departure {
    pub player: Option<Player>,
    pub had_ballot: bool,
    pub was_host: bool,
    /// Name of the player promoted to host, if any
    pub new_host: Option<String>,
}

impl Lobby {
    /// Forget a connection: roster slot, ballot, membership, host seat.
    /// A departing host hands over to the earliest-joined remaining player.
    pub fn remove_connection(&mut self, connection_id: &str) -> Departure {
        let mut departure = Departure::default();

        self.members.retain(|m| m != connection_id);
        if let Some(i) = self
            .players
            .iter()
            .position(|p| p.connection_id == connection_id)
        {
            departure.player = Some(self.players.remove(i));
        }
        departure.had_ballot = self.ballots.retract(connection_id);

        if self.is_host(connection_id) {
            departure.was_host = true;
            if let Some(next) = self.players.first() {
                self.host = next.connection_id.clone();
                departure.new_host = Some(next.name.clone());
            }
        }
        departure
    }

    /// No players left and nobody to host it
    pub fn is_abandoned(&self) -> bool {
        self.players.is_empty() && !self.members.contains(&self.host)
    }
}

impl AppState {
    /// Remove a closed connection from every lobby it touched
    pub async fn disconnect(&self, connection_id: &str) {
        let mut lobbies = self.lobbies.write().await;
        let affected: Vec<LobbyId> = lobbies
            .values()
            .filter(|l| l.is_host(connection_id) || l.members.iter().any(|m| m == connection_id))
            .map(|l| l.id.clone())
            .collect();

        for lobby_id in affected {
            self.reconcile(&mut lobbies, &lobby_id, connection_id).await;
        }
    }

    async fn reconcile(
        &self,
        lobbies: &mut HashMap<LobbyId, Lobby>,
        lobby_id: &str,
        connection_id: &str,
    ) {
        let Some(lobby) = lobbies.get_mut(lobby_id) else {
            return;
        };
        let departure = lobby.remove_connection(connection_id);

        if let Some(ref player) = departure.player {
            tracing::info!(
                "{:?} disconnected from lobby {} ({} players left)",
                player.name,
                lobby_id,
                lobby.players.len()
            );
        }

        if lobby.players.is_empty() && (departure.player.is_some() || lobby.is_abandoned()) {
            lobbies.remove(lobby_id);
            tracing::info!("Lobby {} destroyed: no players left", lobby_id);
            return;
        }

        if let Some(name) = departure.new_host {
            tracing::info!("Lobby {}: host left, {:?} promoted", lobby_id, name);
            self.broadcast_to_lobby(lobby, ServerMessage::HostChanged { name })
                .await;
        }

        if lobby.phase != LobbyPhase::InProgress {
            if departure.player.is_some() {
                self.broadcast_player_list(lobby).await;
            }
            return;
        }

        if departure.player.is_none() && !departure.had_ballot {
            return;
        }

        // Losing a player can end the game or complete the open round
        if lobby.outcome().is_some() {
            self.check_game_over(lobbies, lobby_id).await;
        } else if lobby.has_quorum() {
            self.settle_round(lobbies, lobby_id).await;
        } else {
            self.broadcast_player_list(lobby).await;
        }
    }
}
