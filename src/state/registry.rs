use super::AppState;
use crate::types::*;
use rand::Rng;

/// Safe character set for lobby codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 5;

/// Generate a random lobby code (5 characters)
fn generate_lobby_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Codes are typed by humans; accept surrounding whitespace and lowercase
pub fn normalize_lobby_id(raw: &str) -> LobbyId {
    raw.trim().to_uppercase()
}

impl AppState {
    /// Open a new empty lobby hosted by `host`
    pub async fn create_lobby(&self, host: &str) -> LobbyId {
        let mut lobbies = self.lobbies.write().await;

        // Generate a unique code (check for collisions against open lobbies)
        let lobby_id = loop {
            let code = generate_lobby_code();
            if !lobbies.contains_key(&code) {
                break code;
            }
            // Collision - try again (rare with 28M combinations)
        };

        lobbies.insert(
            lobby_id.clone(),
            Lobby::new(lobby_id.clone(), host.to_string()),
        );
        tracing::info!("Lobby {} created by {}", lobby_id, host);
        lobby_id
    }

    /// Snapshot of a lobby
    pub async fn get_lobby(&self, lobby_id: &str) -> Option<Lobby> {
        self.lobbies
            .read()
            .await
            .get(&normalize_lobby_id(lobby_id))
            .cloned()
    }

    /// Remove a lobby. Destroying an unknown id is a no-op.
    pub async fn destroy_lobby(&self, lobby_id: &str) -> bool {
        let removed = self
            .lobbies
            .write()
            .await
            .remove(&normalize_lobby_id(lobby_id))
            .is_some();
        if removed {
            tracing::info!("Lobby {} destroyed", lobby_id);
        }
        removed
    }

    pub async fn lobby_count(&self) -> usize {
        self.lobbies.read().await.len()
    }

    pub async fn lobby_summary(&self, lobby_id: &str) -> Option<LobbySummary> {
        self.lobbies
            .read()
            .await
            .get(&normalize_lobby_id(lobby_id))
            .map(LobbySummary::from)
    }
}
