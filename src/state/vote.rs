//! Ballot collection, tallying, elimination and win conditions

use super::{normalize_lobby_id, AppState};
use crate::error::{LobbyError, LobbyResult};
use crate::protocol::ServerMessage;
use crate::types::*;
use std::collections::HashMap;

/// One ballot per voter for the current round, kept in casting order.
/// Re-casting replaces the voter's ballot and moves it to the end.
#[derive(Debug, Clone, Default)]
pub struct Ballots {
    entries: Vec<(ConnectionId, String)>,
}

/// Votes received by one target. `target` keeps the first spelling used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub target: String,
    pub votes: usize,
}

impl Ballots {
    pub fn cast(&mut self, voter: &str, target: &str) {
        self.retract(voter);
        self.entries.push((voter.to_string(), target.to_string()));
    }

    /// Drop a voter's ballot, returning whether one existed
    pub fn retract(&mut self, voter: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(v, _)| v != voter);
        self.entries.len() != before
    }

    pub fn target_of(&self, voter: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(v, _)| v == voter)
            .map(|(_, t)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Count votes per target (case-insensitive), in order of first nomination
    pub fn tally(&self) -> Vec<Tally> {
        let mut order: Vec<Tally> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (_, target) in &self.entries {
            let key = target.to_lowercase();
            match index.get(&key) {
                Some(&i) => order[i].votes += 1,
                None => {
                    index.insert(key, order.len());
                    order.push(Tally {
                        target: target.clone(),
                        votes: 1,
                    });
                }
            }
        }
        order
    }
}

/// Pick the most-voted target. Ties go to the target nominated first.
pub fn select_target(tally: &[Tally]) -> Option<&Tally> {
    tally.iter().fold(None, |best: Option<&Tally>, t| match best {
        Some(b) if b.votes >= t.votes => Some(b),
        _ => Some(t),
    })
}

/// What a resolved round did to the roster
#[derive(Debug, Clone, PartialEq)]
pub enum RoundResult {
    Eliminated(Player),
    /// The winning name matched nobody still in the game
    NoElimination(String),
}

impl Lobby {
    /// Record or overwrite a living player's ballot
    pub fn record_vote(&mut self, voter: &str, target: &str) -> LobbyResult<()> {
        if !self.is_player(voter) {
            return Err(LobbyError::NotAPlayer);
        }
        let target = target.trim();
        if target.is_empty() {
            return Err(LobbyError::InvalidRequest(
                "vote target must not be empty".to_string(),
            ));
        }
        self.ballots.cast(voter, target);
        Ok(())
    }

    /// Every living player has a ballot in
    pub fn has_quorum(&self) -> bool {
        !self.players.is_empty() && self.ballots.len() >= self.players.len()
    }

    /// Tally, remove the winner and open the next round.
    /// Returns `None` if there were no ballots to resolve.
    pub fn resolve_round(&mut self) -> Option<RoundResult> {
        let tally = self.ballots.tally();
        let winner = select_target(&tally)?.target.clone();
        self.ballots.clear();
        self.round_no += 1;

        match self.players.iter().position(|p| p.answers_to(&winner)) {
            Some(i) => Some(RoundResult::Eliminated(self.players.remove(i))),
            None => Some(RoundResult::NoElimination(winner)),
        }
    }

    /// Win conditions, checked in order: empty roster, then all imposters
    pub fn outcome(&self) -> Option<GameOutcome> {
        if self.players.is_empty() {
            Some(GameOutcome::AllEliminated)
        } else if self.players.iter().all(|p| p.role == Role::Imposter) {
            Some(GameOutcome::ImpostersWin)
        } else {
            None
        }
    }
}

impl AppState {
    /// Cast a ballot. Resolves the round once every living player has voted.
    pub async fn cast_vote(
        &self,
        lobby_id: &str,
        voter: &str,
        target_name: &str,
    ) -> LobbyResult<()> {
        let lobby_id = normalize_lobby_id(lobby_id);
        let mut lobbies = self.lobbies.write().await;
        let lobby = lobbies
            .get_mut(&lobby_id)
            .ok_or_else(|| LobbyError::LobbyNotFound(lobby_id.clone()))?;

        if lobby.phase != LobbyPhase::InProgress {
            tracing::debug!("Vote in lobby {} outside of a game, ignoring", lobby_id);
            return Ok(());
        }

        lobby.record_vote(voter, target_name)?;
        tracing::debug!(
            "Lobby {} round {}: {}/{} ballots",
            lobby_id,
            lobby.round_no,
            lobby.ballots.len(),
            lobby.players.len()
        );

        self.broadcast_to_lobby(
            lobby,
            ServerMessage::VoteProgress {
                votes: lobby.ballots.len(),
                needed: lobby.players.len(),
            },
        )
        .await;

        if lobby.has_quorum() {
            self.settle_round(&mut lobbies, &lobby_id).await;
        }
        Ok(())
    }

    /// Resolve the open round and either end the game or continue
    pub(super) async fn settle_round(
        &self,
        lobbies: &mut HashMap<LobbyId, Lobby>,
        lobby_id: &str,
    ) {
        let Some(lobby) = lobbies.get_mut(lobby_id) else {
            return;
        };
        let Some(result) = lobby.resolve_round() else {
            return;
        };

        match result {
            RoundResult::Eliminated(player) => {
                tracing::info!("Lobby {}: {:?} voted out", lobby_id, player.name);
                self.broadcast_to_lobby(
                    lobby,
                    ServerMessage::PlayerVotedOut {
                        name: player.name.clone(),
                    },
                )
                .await;
                self.connections
                    .send_to(&player.connection_id, ServerMessage::VotedOut)
                    .await;
            }
            RoundResult::NoElimination(name) => {
                tracing::info!(
                    "Lobby {}: top vote {:?} matches no player, nobody removed",
                    lobby_id,
                    name
                );
                self.broadcast_to_lobby(lobby, ServerMessage::NoElimination { name })
                    .await;
            }
        }

        self.check_game_over(lobbies, lobby_id).await;
    }

    /// End the game if a win condition holds, otherwise refresh the roster
    pub(super) async fn check_game_over(
        &self,
        lobbies: &mut HashMap<LobbyId, Lobby>,
        lobby_id: &str,
    ) {
        let Some(outcome) = lobbies.get(lobby_id).map(Lobby::outcome) else {
            return;
        };
        match outcome {
            Some(outcome) => self.end_game(lobbies, lobby_id, outcome).await,
            None => {
                if let Some(lobby) = lobbies.get(lobby_id) {
                    self.broadcast_player_list(lobby).await;
                }
            }
        }
    }
}
