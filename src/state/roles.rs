//! Role assignment and the Lobby -> InProgress transition

use super::{normalize_lobby_id, AppState};
use crate::error::{LobbyError, LobbyResult};
use crate::protocol::ServerMessage;
use crate::types::*;
use rand::seq::{index, IndexedRandom};
use rand::Rng;
use std::collections::HashSet;

/// One player's private deal
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub connection_id: ConnectionId,
    pub role: Role,
    pub word: Option<String>,
}

/// Never hand out more imposter slots than `players - 1`
pub fn effective_imposter_count(requested: usize, players: usize) -> usize {
    requested.min(players.saturating_sub(1))
}

/// Trim words, drop blanks and duplicates (first spelling wins, order kept)
pub fn normalize_words(words: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .into_iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty() && seen.insert(w.clone()))
        .collect()
}

/// Partition `players` into imposters and normals.
///
/// Imposter seats are a uniform sample without replacement; a single word is
/// drawn from the pool and shared by every normal player.
pub fn assign_roles<R: Rng + ?Sized>(
    players: &[Player],
    imposter_count: usize,
    words: &[String],
    rng: &mut R,
) -> Vec<Assignment> {
    let n = players.len();
    let k = effective_imposter_count(imposter_count, n);
    let imposter_seats: HashSet<usize> = index::sample(rng, n, k).into_iter().collect();
    let word = words.choose(rng).cloned();

    players
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if imposter_seats.contains(&i) {
                Assignment {
                    connection_id: p.connection_id.clone(),
                    role: Role::Imposter,
                    word: None,
                }
            } else {
                Assignment {
                    connection_id: p.connection_id.clone(),
                    role: Role::Normal,
                    word: word.clone(),
                }
            }
        })
        .collect()
}

impl Lobby {
    pub fn save_settings(
        &mut self,
        by: &str,
        words: Vec<String>,
        imposter_count: usize,
    ) -> LobbyResult<&LobbySettings> {
        if !self.is_host(by) {
            return Err(LobbyError::Unauthorized("change settings"));
        }
        if !self.phase.is_joinable() {
            return Err(LobbyError::GameAlreadyStarted);
        }
        self.settings = LobbySettings {
            words: normalize_words(words),
            imposter_count,
        };
        Ok(&self.settings)
    }

    /// Deal roles exactly once and move to InProgress
    pub fn start<R: Rng + ?Sized>(&mut self, by: &str, rng: &mut R) -> LobbyResult<Vec<Assignment>> {
        if !self.is_host(by) {
            return Err(LobbyError::Unauthorized("start the game"));
        }
        if self.phase != LobbyPhase::Lobby {
            return Err(LobbyError::GameAlreadyStarted);
        }
        if self.players.is_empty() {
            return Err(LobbyError::NotEnoughPlayers);
        }

        let assignments = assign_roles(
            &self.players,
            self.settings.imposter_count,
            &self.settings.words,
            rng,
        );

        for (player, assignment) in self.players.iter_mut().zip(&assignments) {
            player.role = assignment.role;
        }
        self.secret_word = assignments.iter().find_map(|a| a.word.clone());
        self.imposters = self
            .players
            .iter()
            .filter(|p| p.role == Role::Imposter)
            .map(|p| p.name.clone())
            .collect();
        self.ballots.clear();
        self.round_no = 1;
        self.phase = LobbyPhase::InProgress;

        Ok(assignments)
    }
}

impl AppState {
    /// Host-only: replace the word pool and imposter count, then broadcast
    pub async fn save_settings(
        &self,
        lobby_id: &str,
        connection_id: &str,
        words: Vec<String>,
        imposter_count: usize,
    ) -> LobbyResult<LobbySettings> {
        let lobby_id = normalize_lobby_id(lobby_id);
        let mut lobbies = self.lobbies.write().await;
        let lobby = lobbies
            .get_mut(&lobby_id)
            .ok_or_else(|| LobbyError::LobbyNotFound(lobby_id.clone()))?;

        let settings = lobby.save_settings(connection_id, words, imposter_count)?.clone();
        tracing::info!(
            "Lobby {} settings saved: {} words, {} imposters",
            lobby_id,
            settings.words.len(),
            settings.imposter_count
        );

        self.broadcast_to_lobby(
            lobby,
            ServerMessage::SettingsSaved {
                words: settings.words.clone(),
                imposter_count: settings.imposter_count,
            },
        )
        .await;
        Ok(settings)
    }

    /// Host-only: deal roles privately, then announce the start
    pub async fn start_game(&self, lobby_id: &str, connection_id: &str) -> LobbyResult<()> {
        let lobby_id = normalize_lobby_id(lobby_id);
        let mut lobbies = self.lobbies.write().await;
        let lobby = lobbies
            .get_mut(&lobby_id)
            .ok_or_else(|| LobbyError::LobbyNotFound(lobby_id.clone()))?;

        let assignments = lobby.start(connection_id, &mut rand::rng())?;
        tracing::info!(
            "Lobby {} started with {} players, {} imposters",
            lobby_id,
            lobby.players.len(),
            lobby.imposters.len()
        );

        for assignment in assignments {
            self.connections
                .send_to(
                    &assignment.connection_id,
                    ServerMessage::RoleAssigned {
                        role: assignment.role,
                        word: assignment.word,
                    },
                )
                .await;
        }
        self.broadcast_to_lobby(lobby, ServerMessage::GameStarted).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{drain, lobby_with_players};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn roster(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player {
                connection_id: format!("c{}", i),
                name: format!("P{}", i),
                device_id: format!("d{}", i),
                role: Role::Unassigned,
            })
            .collect()
    }

    fn words() -> Vec<String> {
        vec!["apple".to_string(), "banana".to_string(), "cherry".to_string()]
    }

    #[test]
    fn test_imposter_count_is_clamped() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 1..8 {
            for requested in 0..10 {
                let assignments = assign_roles(&roster(n), requested, &words(), &mut rng);
                let imposters = assignments
                    .iter()
                    .filter(|a| a.role == Role::Imposter)
                    .count();
                assert_eq!(imposters, requested.min(n - 1), "n={} m={}", n, requested);
            }
        }
    }

    #[test]
    fn test_normals_share_one_word_and_imposters_get_none() {
        let mut rng = StdRng::seed_from_u64(42);
        let assignments = assign_roles(&roster(6), 2, &words(), &mut rng);

        let normal_words: HashSet<_> = assignments
            .iter()
            .filter(|a| a.role == Role::Normal)
            .map(|a| a.word.clone())
            .collect();
        assert_eq!(normal_words.len(), 1);
        assert!(normal_words.iter().next().unwrap().is_some());
        assert!(assignments
            .iter()
            .filter(|a| a.role == Role::Imposter)
            .all(|a| a.word.is_none()));
    }

    #[test]
    fn test_empty_word_pool_deals_no_word() {
        let mut rng = StdRng::seed_from_u64(1);
        let assignments = assign_roles(&roster(3), 1, &[], &mut rng);
        assert!(assignments.iter().all(|a| a.word.is_none()));
        assert_eq!(
            assignments.iter().filter(|a| a.role == Role::Normal).count(),
            2
        );
    }

    #[test]
    fn test_every_seat_can_be_imposter() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut hits: HashMap<String, usize> = HashMap::new();
        for _ in 0..400 {
            for a in assign_roles(&roster(4), 1, &words(), &mut rng) {
                if a.role == Role::Imposter {
                    *hits.entry(a.connection_id).or_insert(0) += 1;
                }
            }
        }
        // Uniform over 4 seats: each should land near 100
        assert_eq!(hits.len(), 4);
        assert!(hits.values().all(|&h| h > 50), "{:?}", hits);
    }

    #[test]
    fn test_normalize_words() {
        let words = normalize_words(vec![
            " cat ".to_string(),
            "".to_string(),
            "dog".to_string(),
            "cat".to_string(),
        ]);
        assert_eq!(words, vec!["cat".to_string(), "dog".to_string()]);
    }

    #[test]
    fn test_start_requires_host_and_lobby_phase() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut lobby = Lobby::new("ABCDE".to_string(), "host".to_string());
        assert_eq!(
            lobby.start("host", &mut rng).unwrap_err(),
            LobbyError::NotEnoughPlayers
        );

        lobby.admit("c1", "Alice", "d1").unwrap();
        assert_eq!(
            lobby.start("c1", &mut rng).unwrap_err(),
            LobbyError::Unauthorized("start the game")
        );

        lobby.start("host", &mut rng).unwrap();
        assert_eq!(lobby.phase, LobbyPhase::InProgress);
        assert!(lobby.players.iter().all(|p| p.role != Role::Unassigned));
        assert_eq!(
            lobby.start("host", &mut rng).unwrap_err(),
            LobbyError::GameAlreadyStarted
        );
    }

    #[test]
    fn test_settings_locked_after_start() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut lobby = Lobby::new("ABCDE".to_string(), "host".to_string());
        lobby.admit("c1", "Alice", "d1").unwrap();
        assert_eq!(
            lobby.save_settings("c1", words(), 1).unwrap_err(),
            LobbyError::Unauthorized("change settings")
        );
        lobby.start("host", &mut rng).unwrap();
        assert_eq!(
            lobby.save_settings("host", words(), 1).unwrap_err(),
            LobbyError::GameAlreadyStarted
        );
    }

    #[tokio::test]
    async fn test_start_game_deals_private_roles() {
        let state = AppState::new();
        let mut host_rx = state.connections.register("host").await;
        let (lobby_id, mut outboxes) =
            lobby_with_players(&state, "host", &["A", "B", "C", "D"]).await;
        state
            .save_settings(&lobby_id, "host", words(), 1)
            .await
            .unwrap();
        for rx in outboxes.iter_mut() {
            drain(rx);
        }
        drain(&mut host_rx);

        state.start_game(&lobby_id, "host").await.unwrap();

        let mut imposters = 0;
        let mut dealt_words = HashSet::new();
        for rx in outboxes.iter_mut() {
            let msgs = drain(rx);
            assert_eq!(msgs.len(), 2);
            match &msgs[0] {
                ServerMessage::RoleAssigned { role, word } => match role {
                    Role::Imposter => {
                        imposters += 1;
                        assert!(word.is_none());
                    }
                    Role::Normal => {
                        dealt_words.insert(word.clone().unwrap());
                    }
                    Role::Unassigned => panic!("unassigned role dealt"),
                },
                other => panic!("Expected RoleAssigned, got {:?}", other),
            }
            assert_eq!(msgs[1], ServerMessage::GameStarted);
        }
        assert_eq!(imposters, 1);
        assert_eq!(dealt_words.len(), 1);

        // The non-playing host only sees the start signal
        assert_eq!(drain(&mut host_rx), vec![ServerMessage::GameStarted]);
    }

    #[tokio::test]
    async fn test_non_host_start_is_unauthorized() {
        let state = AppState::new();
        let (lobby_id, _outboxes) = lobby_with_players(&state, "host", &["A", "B"]).await;

        let err = state.start_game(&lobby_id, "conn-A").await.unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
        let lobby = state.get_lobby(&lobby_id).await.unwrap();
        assert_eq!(lobby.phase, LobbyPhase::Lobby);
    }
}
