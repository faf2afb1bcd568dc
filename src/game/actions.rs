use rand::rngs::StdRng;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    Card, CardColor, CardKind, GameState, GameStatus, LastAction, Table, UnoDeclaration,
};
use crate::infrastructure::StorageError;
use crate::models::{Outbound, ServerEvent};
use crate::shared::MIN_PLAYERS;

/// Validation failures are reported to the requester only; they never
/// mutate state and are never broadcast.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("game is not currently in progress")]
    GameNotInProgress,
    #[error("game already in progress")]
    GameAlreadyStarted,
    #[error("spectators cannot perform game actions")]
    SpectatorsCannotAct,
    #[error("player is not seated at this table")]
    PlayerNotAtTable,
    #[error("not your turn")]
    NotYourTurn,
    #[error("invalid card index")]
    InvalidCardIndex,
    #[error("that card cannot be played on the current discard")]
    CardNotPlayable,
    #[error("wild card requires a color choice")]
    WildNeedsColor,
    #[error("need at least 2 players to start")]
    NotEnoughPlayers,
    #[error("can only declare UNO with exactly 1 card")]
    MustHoldOneCard,
    #[error("target player not found")]
    TargetNotFound,
    #[error("no cards to draw")]
    NoCardsToDraw,
    #[error("table is full")]
    TableFull,
    #[error("seats are kept while a game is in progress")]
    CannotLeaveMidGame,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result of an accepted action: the ordered notification fan-out plus the
/// effect fields echoed back to the requester.
#[derive(Debug, Default)]
pub struct ActionOutcome {
    pub notifications: Vec<Outbound>,
    pub drawn_count: usize,
    pub penalty_applied: Option<bool>,
    pub game_over: bool,
}

impl ActionOutcome {
    fn push_broadcast(&mut self, event: ServerEvent) {
        self.notifications.push(Outbound::broadcast(event));
    }

    fn push_private(&mut self, player_id: Uuid, event: ServerEvent) {
        self.notifications.push(Outbound::to_player(player_id, event));
    }
}

/// How a played special card shapes the rest of the transaction.
struct CardEffect {
    /// 0 when the game just ended, 1 for a plain advance, 2 when the next
    /// seat is skipped.
    turn_advances: usize,
    forced_draw_target: Option<Uuid>,
}

pub fn play_card(
    table: &mut Table,
    state: &mut GameState,
    player_id: Uuid,
    card_index: usize,
    chosen_color: Option<CardColor>,
    rng: &mut StdRng,
) -> Result<ActionOutcome, ActionError> {
    if state.status != GameStatus::InProgress {
        return Err(ActionError::GameNotInProgress);
    }
    if table.is_spectator(player_id) {
        return Err(ActionError::SpectatorsCannotAct);
    }
    let seat = table.seat_of(player_id).ok_or(ActionError::PlayerNotAtTable)?;
    if seat != state.current_player_index {
        return Err(ActionError::NotYourTurn);
    }

    let card = *table.players[seat]
        .hand
        .get(card_index)
        .ok_or(ActionError::InvalidCardIndex)?;
    if let Some(top) = state.top_discard() {
        if !card.is_playable_on(top) {
            return Err(ActionError::CardNotPlayable);
        }
    }
    if card.is_wild() && !matches!(chosen_color, Some(c) if c != CardColor::Wild) {
        return Err(ActionError::WildNeedsColor);
    }

    // Validation passed; everything below mutates.
    let player = &mut table.players[seat];
    let mut played = match player.play_card(card_index) {
        Some(card) => card,
        None => return Err(ActionError::InvalidCardIndex),
    };
    if played.is_wild() {
        if let Some(color) = chosen_color {
            played.color = color;
        }
    }
    state.discard_pile.push(played);
    player.uno_declaration = UnoDeclaration::NotRequired;
    state.last_action = Some(LastAction::now("card_played", Some(player_id), Some(played)));

    let mut outcome = ActionOutcome::default();
    let actor_name = table.players[seat].username.clone();
    let actor_hand_count = table.players[seat].hand_size();
    outcome.push_broadcast(ServerEvent::CardPlayed {
        player_id,
        player_name: actor_name.clone(),
        card: played,
        hand_count: actor_hand_count,
    });

    let effect = resolve_special_card(table, state, &played, rng);

    let mut turn_advances = effect.turn_advances;
    if table.players[seat].hand.is_empty() {
        state.status = GameStatus::Completed;
        table.status = GameStatus::Completed;
        state.winner = Some(player_id);
        turn_advances = 0;
        outcome.game_over = true;
        outcome.push_broadcast(ServerEvent::GameOver {
            winner_id: player_id,
            winner_name: actor_name,
        });
    } else if table.players[seat].hand_size() == 1 {
        table.players[seat].uno_declaration = UnoDeclaration::Pending;
        outcome.push_broadcast(ServerEvent::PlayerOneCard {
            player_id,
            player_name: actor_name,
        });
    }

    for _ in 0..turn_advances {
        state.next_turn(table.seat_count());
    }

    outcome.push_private(player_id, ServerEvent::YourHand(table.players[seat].hand.clone()));
    if let Some(target_id) = effect.forced_draw_target {
        if let Some(target) = table.find_player(target_id) {
            outcome.push_private(target_id, ServerEvent::YourHand(target.hand.clone()));
        }
    }
    outcome.push_broadcast(ServerEvent::GameState(state.to_public(table)));
    if state.status == GameStatus::InProgress {
        if let Some(current) = state.current_player(table) {
            outcome.push_broadcast(ServerEvent::TurnChanged {
                player_id: current.id,
                player_name: current.username.clone(),
            });
        }
    }

    Ok(outcome)
}

/// Applies the played card's effect to direction and forced draws, and
/// reports how far the turn pointer should move. Reverse in a two-seat
/// game behaves as a skip; the state machine itself never special-cases
/// that, so it is handled here.
fn resolve_special_card(
    table: &mut Table,
    state: &mut GameState,
    card: &Card,
    rng: &mut StdRng,
) -> CardEffect {
    match card.kind {
        CardKind::Skip => CardEffect { turn_advances: 2, forced_draw_target: None },
        CardKind::Reverse => {
            state.reverse_direction();
            let turn_advances = if table.seat_count() == 2 { 2 } else { 1 };
            CardEffect { turn_advances, forced_draw_target: None }
        }
        CardKind::DrawTwo | CardKind::WildDrawFour => {
            let draw_count = if card.kind == CardKind::DrawTwo { 2 } else { 4 };
            // The next seat (by current direction, not yet advanced) draws
            // and is skipped.
            let target_seat = state.next_player_index(table.seat_count());
            let target = &mut table.players[target_seat];
            let target_id = target.id;
            state.draw_cards_for(target, draw_count, rng);
            CardEffect { turn_advances: 2, forced_draw_target: Some(target_id) }
        }
        CardKind::Number | CardKind::Wild => {
            CardEffect { turn_advances: 1, forced_draw_target: None }
        }
    }
}

/// Drawing is always a full turn in this ruleset: one card, then play
/// passes on regardless of what was drawn.
pub fn draw_card(
    table: &mut Table,
    state: &mut GameState,
    player_id: Uuid,
    rng: &mut StdRng,
) -> Result<ActionOutcome, ActionError> {
    if state.status != GameStatus::InProgress {
        return Err(ActionError::GameNotInProgress);
    }
    if table.is_spectator(player_id) {
        return Err(ActionError::SpectatorsCannotAct);
    }
    let seat = table.seat_of(player_id).ok_or(ActionError::PlayerNotAtTable)?;
    if seat != state.current_player_index {
        return Err(ActionError::NotYourTurn);
    }

    let player = &mut table.players[seat];
    let drawn = state.draw_cards_for(player, 1, rng);
    if drawn.is_empty() {
        return Err(ActionError::NoCardsToDraw);
    }
    state.last_action = Some(LastAction::now("card_drawn", Some(player_id), None));

    let mut outcome = ActionOutcome::default();
    outcome.drawn_count = drawn.len();
    let player_name = table.players[seat].username.clone();
    let hand_count = table.players[seat].hand_size();
    outcome.push_broadcast(ServerEvent::CardDrawn {
        player_id,
        player_name,
        count: drawn.len(),
        hand_count,
    });
    outcome.push_private(
        player_id,
        ServerEvent::DrawnCards { cards: drawn, new_hand_size: hand_count },
    );

    state.next_turn(table.seat_count());
    if let Some(current) = state.current_player(table) {
        outcome.push_broadcast(ServerEvent::TurnChanged {
            player_id: current.id,
            player_name: current.username.clone(),
        });
    }
    outcome.push_broadcast(ServerEvent::GameState(state.to_public(table)));

    Ok(outcome)
}

pub fn declare_uno(
    table: &mut Table,
    state: &mut GameState,
    player_id: Uuid,
) -> Result<ActionOutcome, ActionError> {
    if table.is_spectator(player_id) {
        return Err(ActionError::SpectatorsCannotAct);
    }
    let seat = table.seat_of(player_id).ok_or(ActionError::PlayerNotAtTable)?;
    if table.players[seat].hand_size() != 1 {
        return Err(ActionError::MustHoldOneCard);
    }

    table.players[seat].uno_declaration = UnoDeclaration::Declared;
    state.last_action = Some(LastAction::now("uno_declared", Some(player_id), None));

    let mut outcome = ActionOutcome::default();
    outcome.push_broadcast(ServerEvent::UnoDeclared {
        player_id,
        player_name: table.players[seat].username.clone(),
    });
    Ok(outcome)
}

/// A challenge either catches a one-card player who failed to declare
/// (target draws two, marked penalized) or backfires on the challenger
/// (challenger draws two). Neither outcome moves the turn.
pub fn challenge_uno(
    table: &mut Table,
    state: &mut GameState,
    challenger_id: Uuid,
    target_id: Uuid,
    rng: &mut StdRng,
) -> Result<ActionOutcome, ActionError> {
    if table.is_spectator(challenger_id) {
        return Err(ActionError::SpectatorsCannotAct);
    }
    let challenger_seat = table.seat_of(challenger_id).ok_or(ActionError::PlayerNotAtTable)?;
    let target_seat = table.seat_of(target_id).ok_or(ActionError::TargetNotFound)?;

    let mut outcome = ActionOutcome::default();
    let target = &table.players[target_seat];
    let caught = target.hand_size() == 1 && target.uno_declaration != UnoDeclaration::Declared;

    if caught {
        let target = &mut table.players[target_seat];
        let drawn = state.draw_cards_for(target, 2, rng);
        target.uno_declaration = UnoDeclaration::Penalized;
        state.last_action = Some(LastAction::now("uno_penalty", Some(target_id), None));
        outcome.drawn_count = drawn.len();
        outcome.penalty_applied = Some(true);
        outcome.push_broadcast(ServerEvent::UnoPenalty {
            target_player_id: target_id,
            target_player_name: table.players[target_seat].username.clone(),
            challenger_id,
            challenger_name: table.players[challenger_seat].username.clone(),
            cards_drawn: outcome.drawn_count,
        });
        outcome.push_private(
            target_id,
            ServerEvent::YourHand(table.players[target_seat].hand.clone()),
        );
    } else {
        let challenger = &mut table.players[challenger_seat];
        let drawn = state.draw_cards_for(challenger, 2, rng);
        state.last_action =
            Some(LastAction::now("uno_challenge_failed", Some(challenger_id), None));
        outcome.drawn_count = drawn.len();
        outcome.penalty_applied = Some(false);
        outcome.push_broadcast(ServerEvent::UnoChallengeFailed {
            challenger_id,
            challenger_name: table.players[challenger_seat].username.clone(),
            cards_drawn: outcome.drawn_count,
        });
        outcome.push_private(
            challenger_id,
            ServerEvent::YourHand(table.players[challenger_seat].hand.clone()),
        );
    }

    outcome.push_broadcast(ServerEvent::GameState(state.to_public(table)));
    Ok(outcome)
}

pub fn start_game(
    table: &mut Table,
    state: &mut GameState,
    player_id: Uuid,
    rng: &mut StdRng,
) -> Result<ActionOutcome, ActionError> {
    if table.is_spectator(player_id) {
        return Err(ActionError::SpectatorsCannotAct);
    }
    if table.seat_of(player_id).is_none() {
        return Err(ActionError::PlayerNotAtTable);
    }
    if state.status == GameStatus::InProgress {
        return Err(ActionError::GameAlreadyStarted);
    }
    if table.seat_count() < MIN_PLAYERS {
        return Err(ActionError::NotEnoughPlayers);
    }

    state.initialize(table, rng);
    state.current_player_index = 0;
    state.last_action = Some(LastAction::now("game_started", Some(player_id), None));

    let mut outcome = ActionOutcome::default();
    outcome.push_broadcast(ServerEvent::GameState(state.to_public(table)));
    for player in &table.players {
        outcome.push_private(player.id, ServerEvent::YourHand(player.hand.clone()));
    }
    if let Some(current) = state.current_player(table) {
        outcome.push_broadcast(ServerEvent::TurnChanged {
            player_id: current.id,
            player_name: current.username.clone(),
        });
    }
    Ok(outcome)
}
