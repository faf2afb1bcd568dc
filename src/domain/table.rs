use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::domain::{Player, PlayerRole};
use crate::shared::DEFAULT_MAX_PLAYERS;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    InProgress,
    Completed,
}

/// One Uno table. The order of `players` is the seating order and therefore
/// the turn order; it is fixed once a game starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub id: Uuid,
    pub name: String,
    pub players: Vec<Player>,
    pub spectators: Vec<Player>,
    pub max_players: usize,
    pub status: GameStatus,
    pub creator_id: Option<Uuid>,
}

impl Table {
    pub fn new(name: impl Into<String>, max_players: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            players: Vec::new(),
            spectators: Vec::new(),
            max_players: max_players.clamp(crate::shared::MIN_PLAYERS, DEFAULT_MAX_PLAYERS),
            status: GameStatus::Waiting,
            creator_id: None,
        }
    }

    /// Seats a player if the table is still waiting and has room.
    pub fn add_player(&mut self, player: Player) -> bool {
        if self.status == GameStatus::Waiting && self.players.len() < self.max_players {
            self.players.push(player);
            true
        } else {
            false
        }
    }

    pub fn add_spectator(&mut self, player: Player) {
        self.spectators.push(player);
    }

    pub fn remove_player(&mut self, player_id: Uuid) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != player_id);
        self.players.len() != before
    }

    pub fn remove_spectator(&mut self, player_id: Uuid) -> bool {
        let before = self.spectators.len();
        self.spectators.retain(|p| p.id != player_id);
        self.spectators.len() != before
    }

    /// Looks up a player or spectator by id, seated players first.
    pub fn find_player(&self, player_id: Uuid) -> Option<&Player> {
        self.players
            .iter()
            .chain(self.spectators.iter())
            .find(|p| p.id == player_id)
    }

    pub fn find_player_mut(&mut self, player_id: Uuid) -> Option<&mut Player> {
        self.players
            .iter_mut()
            .chain(self.spectators.iter_mut())
            .find(|p| p.id == player_id)
    }

    /// Seat index of a seated player, if they are seated at all.
    pub fn seat_of(&self, player_id: Uuid) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    pub fn seat_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_spectator(&self, player_id: Uuid) -> bool {
        self.find_player(player_id)
            .map(|p| p.role == PlayerRole::Spectator)
            .unwrap_or(false)
    }
}
