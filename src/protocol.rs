use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateLobby,
    JoinLobby {
        lobby_id: LobbyId,
        name: String,
        device_id: DeviceId,
    },
    // Host-only messages
    SaveSettings {
        lobby_id: LobbyId,
        words: Vec<String>,
        imposter_count: usize,
    },
    StartGame {
        lobby_id: LobbyId,
    },
    VotePlayer {
        lobby_id: LobbyId,
        target_name: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        connection_id: ConnectionId,
    },
    LobbyCreated {
        lobby_id: LobbyId,
    },
    /// Current roster of living players, in join order
    PlayerList {
        players: Vec<String>,
    },
    SettingsSaved {
        words: Vec<String>,
        imposter_count: usize,
    },
    /// Sent privately to each player at game start
    RoleAssigned {
        role: Role,
        word: Option<String>,
    },
    GameStarted,
    /// Sent to the lobby after each accepted ballot (no targets revealed)
    VoteProgress {
        votes: usize,
        needed: usize,
    },
    PlayerVotedOut {
        name: String,
    },
    /// Sent privately to the eliminated player
    VotedOut,
    /// The round's winning target matched nobody in the roster
    NoElimination {
        name: String,
    },
    HostChanged {
        name: String,
    },
    GameOver {
        outcome: GameOutcome,
        message: String,
        imposters: Vec<String>,
        word: Option<String>,
    },
    Error {
        code: String,
        msg: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_wire_format() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"t":"join_lobby","lobby_id":"ABCDE","name":"Alice","device_id":"dev-1"}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::JoinLobby {
                lobby_id,
                name,
                device_id,
            } => {
                assert_eq!(lobby_id, "ABCDE");
                assert_eq!(name, "Alice");
                assert_eq!(device_id, "dev-1");
            }
            _ => panic!("Expected JoinLobby"),
        }
    }

    #[test]
    fn test_missing_fields_fail_to_parse() {
        let result = serde_json::from_str::<ClientMessage>(r#"{"t":"vote_player","lobby_id":"X"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_role_assigned_serializes_null_word_for_imposters() {
        let json = serde_json::to_value(ServerMessage::RoleAssigned {
            role: Role::Imposter,
            word: None,
        })
        .unwrap();
        assert_eq!(json["t"], "role_assigned");
        assert_eq!(json["role"], "imposter");
        assert!(json["word"].is_null());
    }
}
