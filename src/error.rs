use crate::protocol::ServerMessage;
use crate::types::LobbyId;

/// Result type for lobby operations
pub type LobbyResult<T> = Result<T, LobbyError>;

/// Validation failures reported back to the requesting connection only
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    #[error("Lobby {0} not found")]
    LobbyNotFound(LobbyId),

    #[error("Game has already started")]
    GameAlreadyStarted,

    #[error("Name {0:?} is already taken")]
    NameTaken(String),

    #[error("This device has already joined the lobby")]
    DeviceAlreadyJoined,

    #[error("Only the host can {0}")]
    Unauthorized(&'static str),

    #[error("Only players still in the game can vote")]
    NotAPlayer,

    #[error("At least one player is required to start")]
    NotEnoughPlayers,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl LobbyError {
    /// Stable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::LobbyNotFound(_) => "LOBBY_NOT_FOUND",
            Self::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            Self::NameTaken(_) => "NAME_TAKEN",
            Self::DeviceAlreadyJoined => "DEVICE_ALREADY_JOINED",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotAPlayer => "NOT_A_PLAYER",
            Self::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }
}

impl From<LobbyError> for ServerMessage {
    fn from(err: LobbyError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}
