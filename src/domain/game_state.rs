use rand::rngs::StdRng;
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::domain::{deck, Card, CardColor, GameStatus, Player, PublicPlayer, Table};
use crate::shared::INITIAL_HAND_SIZE;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameDirection {
    Clockwise,
    CounterClockwise,
}

/// Audit record of the most recent mutation, kept so a late-joining
/// observer can render what just happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastAction {
    pub kind: String,
    pub player_id: Option<Uuid>,
    pub card: Option<Card>,
    pub timestamp_ms: u64,
}

impl LastAction {
    pub fn now(kind: &str, player_id: Option<Uuid>, card: Option<Card>) -> Self {
        let timestamp_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self { kind: kind.to_string(), player_id, card, timestamp_ms }
    }
}

/// Authoritative per-table game state. Exactly one exists per running game
/// and it is only ever mutated by that table's actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub table_id: Uuid,
    pub draw_pile: Vec<Card>,
    /// Top of the discard is the last element.
    pub discard_pile: Vec<Card>,
    pub current_player_index: usize,
    pub direction: GameDirection,
    pub status: GameStatus,
    pub winner: Option<Uuid>,
    pub last_action: Option<LastAction>,
}

impl GameState {
    pub fn new(table_id: Uuid) -> Self {
        Self {
            table_id,
            draw_pile: Vec::new(),
            discard_pile: Vec::new(),
            current_player_index: 0,
            direction: GameDirection::Clockwise,
            status: GameStatus::Waiting,
            winner: None,
            last_action: None,
        }
    }

    /// Starts a fresh game: shuffled deck, seven cards to every seated
    /// player in seating order, then a non-wild seed card on the discard.
    /// Callers must have verified there are at least two seated players.
    pub fn initialize(&mut self, table: &mut Table, rng: &mut StdRng) {
        self.status = GameStatus::InProgress;
        self.winner = None;
        self.current_player_index = 0;
        self.direction = GameDirection::Clockwise;

        let mut pile = deck::create_deck();
        deck::shuffle(&mut pile, rng);
        self.draw_pile = pile;

        for player in &mut table.players {
            player.hand = deck::draw(&mut self.draw_pile, INITIAL_HAND_SIZE);
            player.uno_declaration = crate::domain::UnoDeclaration::NotRequired;
        }

        // Seed the discard with a concrete color; wilds go back-of-mind by
        // drawing past them. Falls back to a synthetic red zero so
        // initialization can never fail.
        self.discard_pile.clear();
        loop {
            match deck::draw(&mut self.draw_pile, 1).pop() {
                Some(card) if !card.is_wild() => {
                    self.discard_pile.push(card);
                    break;
                }
                Some(_) => continue,
                None => {
                    self.discard_pile.push(Card::number(CardColor::Red, 0));
                    break;
                }
            }
        }

        table.status = GameStatus::InProgress;
    }

    /// The only primitive for turn movement; every skip or multi-advance
    /// effect is expressed as repeated calls so direction and wraparound
    /// live in one place.
    pub fn next_turn(&mut self, seat_count: usize) -> usize {
        self.current_player_index = self.step_index(self.current_player_index, seat_count);
        self.current_player_index
    }

    /// Peeks at who is next without advancing (forced-draw targets).
    pub fn next_player_index(&self, seat_count: usize) -> usize {
        self.step_index(self.current_player_index, seat_count)
    }

    fn step_index(&self, from: usize, seat_count: usize) -> usize {
        match self.direction {
            GameDirection::Clockwise => (from + 1) % seat_count,
            GameDirection::CounterClockwise => {
                (from as i64 - 1).rem_euclid(seat_count as i64) as usize
            }
        }
    }

    pub fn reverse_direction(&mut self) {
        self.direction = match self.direction {
            GameDirection::Clockwise => GameDirection::CounterClockwise,
            GameDirection::CounterClockwise => GameDirection::Clockwise,
        };
    }

    pub fn current_player<'a>(&self, table: &'a Table) -> Option<&'a Player> {
        table.players.get(self.current_player_index)
    }

    pub fn top_discard(&self) -> Option<&Card> {
        self.discard_pile.last()
    }

    /// Draws up to `count` cards into the player's hand, reshuffling the
    /// discard pile (minus its top card) into the draw pile when short.
    /// Serving fewer than asked is a soft-fail, not an error.
    pub fn draw_cards_for(&mut self, player: &mut Player, count: usize, rng: &mut StdRng) -> Vec<Card> {
        if count == 0 {
            return Vec::new();
        }

        if self.draw_pile.len() < count && self.discard_pile.len() > 1 {
            let top = self.discard_pile.pop();
            self.draw_pile.append(&mut self.discard_pile);
            deck::shuffle(&mut self.draw_pile, rng);
            self.discard_pile.extend(top);
        }

        let drawn = deck::draw(&mut self.draw_pile, count);
        player.add_cards(drawn.clone());
        drawn
    }

    pub fn to_public(&self, table: &Table) -> PublicGameState {
        PublicGameState {
            table_id: self.table_id,
            discard_top: self.top_discard().copied(),
            draw_pile_count: self.draw_pile.len(),
            current_player_id: self.current_player(table).map(|p| p.id),
            direction: self.direction,
            status: self.status,
            winner_id: self.winner,
            players: table.players.iter().map(Player::to_public).collect(),
            spectators: table.spectators.iter().map(Player::to_public).collect(),
            last_action: self.last_action.clone(),
        }
    }
}

/// The full public snapshot broadcast after every mutation. Hands appear
/// only as counts inside `PublicPlayer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicGameState {
    pub table_id: Uuid,
    pub discard_top: Option<Card>,
    pub draw_pile_count: usize,
    pub current_player_id: Option<Uuid>,
    pub direction: GameDirection,
    pub status: GameStatus,
    pub winner_id: Option<Uuid>,
    pub players: Vec<PublicPlayer>,
    pub spectators: Vec<PublicPlayer>,
    pub last_action: Option<LastAction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CardKind, PlayerRole};
    use rand::SeedableRng;

    fn table_with(seats: usize) -> Table {
        let mut table = Table::new("test", 10);
        for i in 0..seats {
            table.add_player(Player::new(format!("p{i}"), PlayerRole::Player));
        }
        table
    }

    fn total_cards(table: &Table, state: &GameState) -> usize {
        table.players.iter().map(|p| p.hand.len()).sum::<usize>()
            + state.draw_pile.len()
            + state.discard_pile.len()
    }

    #[test]
    fn initialize_deals_seven_each_and_seeds_non_wild() {
        for seats in 2..=5 {
            let mut rng = StdRng::seed_from_u64(seats as u64);
            let mut table = table_with(seats);
            let mut state = GameState::new(table.id);
            state.initialize(&mut table, &mut rng);

            assert_eq!(state.status, GameStatus::InProgress);
            for player in &table.players {
                assert_eq!(player.hand.len(), 7);
            }
            // Wild seeds are redrawn, so the draw pile may be short a few
            // more than one card; conservation still holds.
            assert_eq!(state.discard_pile.len(), 1);
            assert!(!state.discard_pile[0].is_wild());
            assert!(state.draw_pile.len() <= 108 - 7 * seats - 1);
            assert_eq!(total_cards(&table, &state), 108);
        }
    }

    #[test]
    fn initialize_never_deals_to_spectators() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut table = table_with(2);
        table.add_spectator(Player::new("watcher", PlayerRole::Spectator));
        let mut state = GameState::new(table.id);
        state.initialize(&mut table, &mut rng);
        assert!(table.spectators[0].hand.is_empty());
    }

    #[test]
    fn next_turn_wraps_in_both_directions() {
        let mut state = GameState::new(Uuid::new_v4());
        state.status = GameStatus::InProgress;

        for seats in 2..=4 {
            state.current_player_index = 0;
            state.direction = GameDirection::Clockwise;
            for _ in 0..seats {
                state.next_turn(seats);
            }
            assert_eq!(state.current_player_index, 0);

            state.direction = GameDirection::CounterClockwise;
            assert_eq!(state.next_turn(seats), seats - 1);
            for _ in 0..seats - 1 {
                state.next_turn(seats);
            }
            assert_eq!(state.current_player_index, 0);
        }
    }

    #[test]
    fn reverse_flips_direction_only() {
        let mut state = GameState::new(Uuid::new_v4());
        state.current_player_index = 2;
        state.reverse_direction();
        assert_eq!(state.direction, GameDirection::CounterClockwise);
        assert_eq!(state.current_player_index, 2);
        state.reverse_direction();
        assert_eq!(state.direction, GameDirection::Clockwise);
    }

    #[test]
    fn draw_reshuffles_discard_keeping_its_top() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut player = Player::new("a", PlayerRole::Player);
        let mut state = GameState::new(Uuid::new_v4());
        let top = Card::special(CardColor::Blue, CardKind::Skip);
        state.draw_pile = vec![Card::number(CardColor::Red, 1)];
        state.discard_pile = vec![
            Card::number(CardColor::Green, 2),
            Card::number(CardColor::Yellow, 3),
            top,
        ];

        let drawn = state.draw_cards_for(&mut player, 3, &mut rng);
        assert_eq!(drawn.len(), 3);
        assert_eq!(player.hand.len(), 3);
        assert_eq!(state.discard_pile, vec![top]);
        assert!(state.draw_pile.is_empty());
    }

    #[test]
    fn draw_serves_what_it_can_when_supply_is_exhausted() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut player = Player::new("a", PlayerRole::Player);
        let mut state = GameState::new(Uuid::new_v4());
        state.draw_pile = vec![Card::number(CardColor::Red, 9)];
        state.discard_pile = vec![Card::number(CardColor::Blue, 1)];

        // Only the top discard remains, which is never recycled.
        let drawn = state.draw_cards_for(&mut player, 4, &mut rng);
        assert_eq!(drawn.len(), 1);
        assert_eq!(state.discard_pile.len(), 1);
    }
}
