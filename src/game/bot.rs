use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::domain::{Card, CardColor};

/// What a bot wants to do with its turn. Produced by a pure scan of the
/// hand; the table actor feeds it through the same validators as a human
/// request.
#[derive(Debug, Clone, PartialEq)]
pub enum BotDecision {
    Play {
        card_index: usize,
        chosen_color: Option<CardColor>,
        /// Set when this play leaves exactly one card, so the actor can
        /// schedule the UNO declaration shortly after.
        declare_uno_after: bool,
    },
    Draw,
}

/// Scans the hand in index order and plays the first card legal on `top`;
/// draws otherwise. Wilds pick the color the bot holds most of.
pub fn decide(hand: &[Card], top: &Card, rng: &mut StdRng) -> BotDecision {
    for (index, card) in hand.iter().enumerate() {
        if card.is_playable_on(top) {
            let chosen_color = card.is_wild().then(|| best_color(hand, rng));
            return BotDecision::Play {
                card_index: index,
                chosen_color,
                declare_uno_after: hand.len() == 2,
            };
        }
    }
    BotDecision::Draw
}

/// The color the hand holds most of, ties broken by the fixed
/// red/yellow/green/blue order; random when the hand is all wilds.
fn best_color(hand: &[Card], rng: &mut StdRng) -> CardColor {
    let mut counts = [0usize; 4];
    for card in hand {
        if let Some(slot) = CardColor::CONCRETE.iter().position(|c| *c == card.color) {
            counts[slot] += 1;
        }
    }

    if counts.iter().all(|&n| n == 0) {
        return *CardColor::CONCRETE
            .choose(rng)
            .unwrap_or(&CardColor::Red);
    }

    let best = counts
        .iter()
        .enumerate()
        .max_by_key(|&(slot, &n)| (n, std::cmp::Reverse(slot)))
        .map(|(slot, _)| slot)
        .unwrap_or(0);
    CardColor::CONCRETE[best]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CardKind;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(9)
    }

    #[test]
    fn plays_first_playable_card_by_index() {
        let top = Card::number(CardColor::Red, 5);
        let hand = vec![
            Card::number(CardColor::Blue, 2),
            Card::number(CardColor::Red, 9),
            Card::number(CardColor::Red, 3),
        ];
        let decision = decide(&hand, &top, &mut rng());
        assert_eq!(
            decision,
            BotDecision::Play { card_index: 1, chosen_color: None, declare_uno_after: false }
        );
    }

    #[test]
    fn draws_when_nothing_is_playable() {
        let top = Card::number(CardColor::Red, 5);
        let hand = vec![Card::number(CardColor::Blue, 2), Card::number(CardColor::Green, 7)];
        assert_eq!(decide(&hand, &top, &mut rng()), BotDecision::Draw);
    }

    #[test]
    fn wild_picks_the_majority_color() {
        let top = Card::number(CardColor::Red, 5);
        let hand = vec![
            Card::wild(CardKind::Wild),
            Card::number(CardColor::Green, 1),
            Card::number(CardColor::Green, 2),
            Card::number(CardColor::Blue, 3),
        ];
        match decide(&hand, &top, &mut rng()) {
            BotDecision::Play { chosen_color, .. } => {
                assert_eq!(chosen_color, Some(CardColor::Green));
            }
            other => panic!("expected a play, got {other:?}"),
        }
    }

    #[test]
    fn wild_color_ties_break_in_fixed_order() {
        let top = Card::number(CardColor::Red, 5);
        let hand = vec![
            Card::wild(CardKind::Wild),
            Card::number(CardColor::Blue, 1),
            Card::number(CardColor::Yellow, 2),
        ];
        // Yellow and blue tie at one each; yellow comes first in the order.
        match decide(&hand, &top, &mut rng()) {
            BotDecision::Play { chosen_color, .. } => {
                assert_eq!(chosen_color, Some(CardColor::Yellow));
            }
            other => panic!("expected a play, got {other:?}"),
        }
    }

    #[test]
    fn all_wild_hand_still_yields_a_concrete_color() {
        let top = Card::number(CardColor::Red, 5);
        let hand = vec![Card::wild(CardKind::Wild), Card::wild(CardKind::WildDrawFour)];
        match decide(&hand, &top, &mut rng()) {
            BotDecision::Play { chosen_color: Some(color), .. } => {
                assert_ne!(color, CardColor::Wild);
            }
            other => panic!("expected a colored play, got {other:?}"),
        }
    }

    #[test]
    fn flags_uno_followup_when_play_leaves_one_card() {
        let top = Card::number(CardColor::Red, 5);
        let hand = vec![Card::number(CardColor::Red, 1), Card::number(CardColor::Blue, 2)];
        match decide(&hand, &top, &mut rng()) {
            BotDecision::Play { declare_uno_after, .. } => assert!(declare_uno_after),
            other => panic!("expected a play, got {other:?}"),
        }
    }
}
