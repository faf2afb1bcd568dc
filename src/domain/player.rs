use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::domain::Card;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerRole {
    Player,
    Spectator,
}

/// UNO declaration lifecycle: `Pending` the moment a play leaves one card,
/// `Declared` after the player calls it, `Penalized` after a lost challenge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnoDeclaration {
    NotRequired,
    Pending,
    Declared,
    Penalized,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub username: String,
    pub hand: Vec<Card>,
    pub role: PlayerRole,
    pub is_bot: bool,
    pub is_online: bool,
    pub uno_declaration: UnoDeclaration,
}

impl Player {
    pub fn new(username: impl Into<String>, role: PlayerRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            hand: Vec::new(),
            role,
            is_bot: false,
            is_online: true,
            uno_declaration: UnoDeclaration::NotRequired,
        }
    }

    pub fn bot(username: impl Into<String>) -> Self {
        let mut player = Self::new(username, PlayerRole::Player);
        player.is_bot = true;
        player
    }

    pub fn hand_size(&self) -> usize {
        self.hand.len()
    }

    pub fn add_cards(&mut self, cards: Vec<Card>) {
        self.hand.extend(cards);
    }

    /// Removes and returns the card at `index`, preserving the order of the
    /// rest of the hand (hands are index-addressed by play requests).
    pub fn play_card(&mut self, index: usize) -> Option<Card> {
        if index < self.hand.len() {
            Some(self.hand.remove(index))
        } else {
            None
        }
    }

    pub fn to_public(&self) -> PublicPlayer {
        PublicPlayer {
            id: self.id,
            username: self.username.clone(),
            hand_count: self.hand.len(),
            is_online: self.is_online,
            is_bot: self.is_bot,
            uno_declaration: self.uno_declaration,
            role: self.role,
        }
    }
}

/// What every client may see about a seat: the hand count, never the hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicPlayer {
    pub id: Uuid,
    pub username: String,
    pub hand_count: usize,
    pub is_online: bool,
    pub is_bot: bool,
    pub uno_declaration: UnoDeclaration,
    pub role: PlayerRole,
}
