use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::domain::{Card, CardColor, CardKind};

/// Builds the standard 108-card deck: per color one 0, two each of 1-9,
/// two each of skip/reverse/draw-two, plus four wilds and four wild-draw-fours.
pub fn create_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(crate::shared::DECK_SIZE);

    for color in CardColor::CONCRETE {
        deck.push(Card::number(color, 0));
        for value in 1..=9 {
            deck.push(Card::number(color, value));
            deck.push(Card::number(color, value));
        }
        for kind in [CardKind::Skip, CardKind::Reverse, CardKind::DrawTwo] {
            deck.push(Card::special(color, kind));
            deck.push(Card::special(color, kind));
        }
    }

    for _ in 0..4 {
        deck.push(Card::wild(CardKind::Wild));
        deck.push(Card::wild(CardKind::WildDrawFour));
    }

    deck
}

pub fn shuffle(deck: &mut Vec<Card>, rng: &mut StdRng) {
    deck.shuffle(rng);
}

/// Removes and returns up to `count` cards from the front of the pile.
/// A short pile serves fewer; the caller decides whether to reshuffle.
pub fn draw(pile: &mut Vec<Card>, count: usize) -> Vec<Card> {
    let count = count.min(pile.len());
    pile.drain(..count).collect()
}
