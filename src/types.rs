use serde::{Deserialize, Serialize};

use crate::state::vote::Ballots;

/// Opaque ID types for type safety
pub type ConnectionId = String;
pub type LobbyId = String;
pub type DeviceId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LobbyPhase {
    Lobby,
    InProgress,
    Ended,
}

impl LobbyPhase {
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Lobby)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Unassigned,
    Normal,
    Imposter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbySettings {
    pub words: Vec<String>,
    pub imposter_count: usize,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            words: Vec::new(),
            imposter_count: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub connection_id: ConnectionId,
    pub name: String,
    pub device_id: DeviceId,
    pub role: Role,
}

impl Player {
    /// Case-insensitive name comparison used for uniqueness and vote targets
    pub fn answers_to(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// An isolated game session.
///
/// `members` are the connections that receive lobby broadcasts: the creator
/// plus everyone who joined as a player. Eliminated players stay members so
/// they can follow the rest of the game. Membership in `players` is aliveness.
#[derive(Debug, Clone)]
pub struct Lobby {
    pub id: LobbyId,
    pub host: ConnectionId,
    pub members: Vec<ConnectionId>,
    pub players: Vec<Player>,
    pub settings: LobbySettings,
    pub phase: LobbyPhase,
    /// Word handed to every normal player, fixed at game start
    pub secret_word: Option<String>,
    /// Everyone dealt the imposter role, revealed at game over
    pub imposters: Vec<String>,
    pub ballots: Ballots,
    pub round_no: u32,
    pub created_at: String,
}

impl Lobby {
    pub fn new(id: LobbyId, host: ConnectionId) -> Self {
        Self {
            id,
            members: vec![host.clone()],
            host,
            players: Vec::new(),
            settings: LobbySettings::default(),
            phase: LobbyPhase::Lobby,
            secret_word: None,
            imposters: Vec::new(),
            ballots: Ballots::default(),
            round_no: 0,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn player_names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name.clone()).collect()
    }

    pub fn is_player(&self, connection_id: &str) -> bool {
        self.players.iter().any(|p| p.connection_id == connection_id)
    }

    pub fn is_host(&self, connection_id: &str) -> bool {
        self.host == connection_id
    }

    pub fn add_member(&mut self, connection_id: &str) {
        if !self.members.iter().any(|m| m == connection_id) {
            self.members.push(connection_id.to_string());
        }
    }
}

/// Public lobby summary (no roles, no word)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbySummary {
    pub id: LobbyId,
    pub phase: LobbyPhase,
    pub player_count: usize,
    pub created_at: String,
}

impl From<&Lobby> for LobbySummary {
    fn from(lobby: &Lobby) -> Self {
        Self {
            id: lobby.id.clone(),
            phase: lobby.phase,
            player_count: lobby.players.len(),
            created_at: lobby.created_at.clone(),
        }
    }
}

/// Terminal result of a game
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    AllEliminated,
    ImpostersWin,
}

impl GameOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            Self::AllEliminated => "all eliminated",
            Self::ImpostersWin => "imposters win",
        }
    }
}

/// Names longer than this are rejected on join
pub const MAX_NAME_CHARS: usize = 32;
