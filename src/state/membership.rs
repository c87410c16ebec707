//! Join validation: name and device uniqueness within a lobby

use super::{normalize_lobby_id, AppState};
use crate::error::{LobbyError, LobbyResult};
use crate::types::*;

/// Trim and sanity-check a display name
fn clean_name(raw: &str) -> LobbyResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(LobbyError::InvalidRequest("name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(LobbyError::InvalidRequest(format!(
            "name must be at most {} characters",
            MAX_NAME_CHARS
        )));
    }
    Ok(name.to_string())
}

fn clean_device_id(raw: &str) -> LobbyResult<String> {
    let device_id = raw.trim();
    if device_id.is_empty() {
        return Err(LobbyError::InvalidRequest(
            "device id must not be empty".to_string(),
        ));
    }
    Ok(device_id.to_string())
}

impl Lobby {
    /// Append a player if the lobby is open and name and device are free
    pub fn admit(&mut self, connection_id: &str, name: &str, device_id: &str) -> LobbyResult<()> {
        if !self.phase.is_joinable() {
            return Err(LobbyError::GameAlreadyStarted);
        }
        if self.players.iter().any(|p| p.answers_to(name)) {
            return Err(LobbyError::NameTaken(name.to_string()));
        }
        if self
            .players
            .iter()
            .any(|p| p.device_id == device_id || p.connection_id == connection_id)
        {
            return Err(LobbyError::DeviceAlreadyJoined);
        }

        self.players.push(Player {
            connection_id: connection_id.to_string(),
            name: name.to_string(),
            device_id: device_id.to_string(),
            role: Role::Unassigned,
        });
        self.add_member(connection_id);
        Ok(())
    }
}

impl AppState {
    /// Join a lobby as a player and broadcast the new roster
    pub async fn join_lobby(
        &self,
        lobby_id: &str,
        connection_id: &str,
        name: &str,
        device_id: &str,
    ) -> LobbyResult<Vec<String>> {
        let name = clean_name(name)?;
        let device_id = clean_device_id(device_id)?;
        let lobby_id = normalize_lobby_id(lobby_id);

        let mut lobbies = self.lobbies.write().await;
        let lobby = lobbies
            .get_mut(&lobby_id)
            .ok_or_else(|| LobbyError::LobbyNotFound(lobby_id.clone()))?;

        if let Err(e) = lobby.admit(connection_id, &name, &device_id) {
            tracing::info!("Join to {} rejected for {:?}: {}", lobby_id, name, e);
            return Err(e);
        }

        tracing::info!(
            "{:?} joined lobby {} ({} players)",
            name,
            lobby_id,
            lobby.players.len()
        );

        self.broadcast_player_list(lobby).await;
        Ok(lobby.player_names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ServerMessage;
    use crate::state::test_support::drain;

    fn open_lobby() -> Lobby {
        Lobby::new("ABCDE".to_string(), "host".to_string())
    }

    #[test]
    fn test_admit_appends_unassigned_player() {
        let mut lobby = open_lobby();
        lobby.admit("c1", "Alice", "d1").unwrap();

        assert_eq!(lobby.players.len(), 1);
        assert_eq!(lobby.players[0].role, Role::Unassigned);
        assert!(lobby.members.contains(&"c1".to_string()));
    }

    #[test]
    fn test_admit_rejects_case_insensitive_name_collision() {
        let mut lobby = open_lobby();
        lobby.admit("c1", "Alice", "d1").unwrap();

        let err = lobby.admit("c2", "aLiCe", "d2").unwrap_err();
        assert_eq!(err, LobbyError::NameTaken("aLiCe".to_string()));
        assert_eq!(lobby.players.len(), 1);
    }

    #[test]
    fn test_admit_rejects_same_device() {
        let mut lobby = open_lobby();
        lobby.admit("c1", "Alice", "d1").unwrap();

        let err = lobby.admit("c2", "Bob", "d1").unwrap_err();
        assert_eq!(err, LobbyError::DeviceAlreadyJoined);
    }

    #[test]
    fn test_admit_rejects_second_slot_for_same_connection() {
        let mut lobby = open_lobby();
        lobby.admit("c1", "Alice", "d1").unwrap();

        let err = lobby.admit("c1", "Bob", "d2").unwrap_err();
        assert_eq!(err, LobbyError::DeviceAlreadyJoined);
    }

    #[test]
    fn test_admit_rejects_after_start() {
        let mut lobby = open_lobby();
        lobby.phase = LobbyPhase::InProgress;

        let err = lobby.admit("c1", "Alice", "d1").unwrap_err();
        assert_eq!(err, LobbyError::GameAlreadyStarted);
    }

    #[test]
    fn test_started_check_precedes_name_check() {
        let mut lobby = open_lobby();
        lobby.admit("c1", "Alice", "d1").unwrap();
        lobby.phase = LobbyPhase::InProgress;

        let err = lobby.admit("c2", "Alice", "d1").unwrap_err();
        assert_eq!(err, LobbyError::GameAlreadyStarted);
    }

    #[test]
    fn test_clean_name_validation() {
        assert_eq!(clean_name("  Bob ").unwrap(), "Bob");
        assert!(matches!(
            clean_name("   "),
            Err(LobbyError::InvalidRequest(_))
        ));
        assert!(matches!(
            clean_name(&"x".repeat(MAX_NAME_CHARS + 1)),
            Err(LobbyError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_join_unknown_lobby() {
        let state = AppState::new();
        let err = state
            .join_lobby("NOPE1", "c1", "Alice", "d1")
            .await
            .unwrap_err();
        assert_eq!(err, LobbyError::LobbyNotFound("NOPE1".to_string()));
    }

    #[tokio::test]
    async fn test_join_broadcasts_roster_to_lobby() {
        let state = AppState::new();
        let mut host_rx = state.connections.register("host").await;
        let mut alice_rx = state.connections.register("c1").await;
        let lobby_id = state.create_lobby("host").await;

        let names = state
            .join_lobby(&lobby_id, "c1", " Alice ", "d1")
            .await
            .unwrap();
        assert_eq!(names, vec!["Alice".to_string()]);

        let expected = ServerMessage::PlayerList {
            players: vec!["Alice".to_string()],
        };
        assert_eq!(drain(&mut host_rx), vec![expected.clone()]);
        assert_eq!(drain(&mut alice_rx), vec![expected]);
    }

    #[tokio::test]
    async fn test_rejected_join_is_not_broadcast() {
        let state = AppState::new();
        let mut host_rx = state.connections.register("host").await;
        let lobby_id = state.create_lobby("host").await;
        state.join_lobby(&lobby_id, "c1", "Alice", "d1").await.unwrap();
        drain(&mut host_rx);

        assert!(state.join_lobby(&lobby_id, "c2", "ALICE", "d2").await.is_err());
        assert!(drain(&mut host_rx).is_empty());
    }
}
