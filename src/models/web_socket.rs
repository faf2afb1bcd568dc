use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::domain::{Card, CardColor, PublicGameState};

/// Messages a client may send over the websocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum ClientEvent {
    CreateTable { name: String, max_players: Option<usize> },
    Join { table_id: Uuid, username: String },
    Spectate { table_id: Uuid, username: String },
    Resume { token: String },
    AddBot { username: String },
    StartGame,
    PlayCard { card_index: usize, chosen_color: Option<CardColor> },
    DrawCard,
    DeclareUno,
    ChallengeUno { target_id: Uuid },
    LeaveTable,
}

/// Messages the server pushes to clients. Public snapshots never contain
/// hand contents; `YourHand` and `DrawnCards` are delivered privately.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum ServerEvent {
    TableCreated { table_id: Uuid },
    Joined { table_id: Uuid, player_id: Uuid, token: String },
    PlayerJoined { player_id: Uuid, username: String, is_online: bool },
    PlayerLeft { player_id: Uuid, username: String },
    CardPlayed { player_id: Uuid, player_name: String, card: Card, hand_count: usize },
    CardDrawn { player_id: Uuid, player_name: String, count: usize, hand_count: usize },
    DrawnCards { cards: Vec<Card>, new_hand_size: usize },
    TurnChanged { player_id: Uuid, player_name: String },
    UnoDeclared { player_id: Uuid, player_name: String },
    UnoPenalty {
        target_player_id: Uuid,
        target_player_name: String,
        challenger_id: Uuid,
        challenger_name: String,
        cards_drawn: usize,
    },
    UnoChallengeFailed { challenger_id: Uuid, challenger_name: String, cards_drawn: usize },
    PlayerOneCard { player_id: Uuid, player_name: String },
    GameState(PublicGameState),
    YourHand(Vec<Card>),
    GameOver { winner_id: Uuid, winner_name: String },
    Error { message: String },
}

/// Who an outbound event is for. Private payloads ride the same per-table
/// channel as broadcasts so every connection observes authoritative
/// snapshots in the same relative order; connection tasks drop `Only`
/// events addressed to someone else.
#[derive(Debug, Clone, PartialEq)]
pub enum Audience {
    Everyone,
    Only(Uuid),
}

#[derive(Debug, Clone)]
pub struct Outbound {
    pub audience: Audience,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn broadcast(event: ServerEvent) -> Self {
        Self { audience: Audience::Everyone, event }
    }

    pub fn to_player(player_id: Uuid, event: ServerEvent) -> Self {
        Self { audience: Audience::Only(player_id), event }
    }
}
