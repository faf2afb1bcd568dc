use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CardColor {
    Red,
    Yellow,
    Green,
    Blue,
    Wild,
}

impl CardColor {
    /// The four concrete colors, in the fixed order used for bot tie-breaks.
    pub const CONCRETE: [CardColor; 4] = [
        CardColor::Red,
        CardColor::Yellow,
        CardColor::Green,
        CardColor::Blue,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Number,
    Skip,
    Reverse,
    DrawTwo,
    Wild,
    WildDrawFour,
}

/// A single Uno card. Pure value: duplicates are legal (the deck holds two
/// of most ranks), so cards carry no identity beyond their fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub color: CardColor,
    pub kind: CardKind,
    /// Present iff `kind == Number`, in 0..=9.
    pub number: Option<u8>,
}

impl Card {
    pub fn number(color: CardColor, number: u8) -> Self {
        Self { color, kind: CardKind::Number, number: Some(number) }
    }

    pub fn special(color: CardColor, kind: CardKind) -> Self {
        Self { color, kind, number: None }
    }

    pub fn wild(kind: CardKind) -> Self {
        Self { color: CardColor::Wild, kind, number: None }
    }

    pub fn is_wild(&self) -> bool {
        matches!(self.kind, CardKind::Wild | CardKind::WildDrawFour)
    }

    /// Single source of truth for play legality: a card may land on `top`
    /// iff it is a wild variant, matches the color, or matches the kind
    /// (number cards additionally requiring equal numbers).
    pub fn is_playable_on(&self, top: &Card) -> bool {
        if self.is_wild() {
            return true;
        }
        if self.color == top.color {
            return true;
        }
        if self.kind == top.kind {
            return self.kind != CardKind::Number || self.number == top.number;
        }
        false
    }
}
