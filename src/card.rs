use std::fmt;

use serde::{Deserialize, Serialize};

/// Card colors. The ordering is used for display sorting and for breaking
/// ties when picking the dominant color of a laid color group.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    pub fn name(&self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::Blue => "Blue",
            Color::Green => "Green",
            Color::Yellow => "Yellow",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Representation of a single physical card.
///
/// Two cards with the same variant, rank and color are interchangeable for
/// every rule; removing one from a hand removes exactly one instance.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Card {
    /// Numbered card between 1 and 12.
    Number { rank: u8, color: Color },
    /// Wild card. Substitutes for any rank or color inside a meld.
    Wild(Color),
    /// Skip card. Never part of a meld; discarding it skips a turn.
    Skip(Color),
}

pub const MIN_RANK: u8 = 1;
pub const MAX_RANK: u8 = 12;
pub const COPIES_PER_NUMBER: usize = 2;
pub const WILDS_PER_COLOR: usize = 2;
pub const SKIPS_PER_COLOR: usize = 1;
pub const DECK_SIZE: usize = 108;
pub const HAND_SIZE: usize = 10;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

impl Card {
    /// Numbered card shorthand. Panics in debug builds on an out-of-range rank.
    #[inline]
    pub fn number(rank: u8, color: Color) -> Self {
        debug_assert!((MIN_RANK..=MAX_RANK).contains(&rank));
        Card::Number { rank, color }
    }

    #[inline]
    pub fn is_wild(&self) -> bool {
        matches!(self, Card::Wild(_))
    }

    #[inline]
    pub fn is_skip(&self) -> bool {
        matches!(self, Card::Skip(_))
    }

    /// Returns the rank for numbered cards.
    #[inline]
    pub fn rank(&self) -> Option<u8> {
        match self {
            Card::Number { rank, .. } => Some(*rank),
            Card::Wild(_) | Card::Skip(_) => None,
        }
    }

    #[inline]
    pub fn color(&self) -> Color {
        match self {
            Card::Number { color, .. } | Card::Wild(color) | Card::Skip(color) => *color,
        }
    }

    /// Penalty value of the card when it is left in a hand at round end.
    pub fn points(&self) -> u32 {
        match self {
            Card::Wild(_) => 25,
            Card::Skip(_) => 15,
            Card::Number { rank, .. } if *rank >= 10 => 10,
            Card::Number { .. } => 5,
        }
    }

    /// Checks whether the card can stand in for the requested rank.
    #[inline]
    pub fn can_substitute(&self, rank: u8) -> bool {
        self.is_wild() || self.rank() == Some(rank)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Number { rank, color } => write!(f, "{rank} {color}"),
            Card::Wild(_) => f.write_str("Wild"),
            Card::Skip(_) => f.write_str("Skip"),
        }
    }
}

/// Builds the full 108-card deck in deterministic order (unshuffled).
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for rank in MIN_RANK..=MAX_RANK {
        for color in Color::ALL {
            for _ in 0..COPIES_PER_NUMBER {
                deck.push(Card::Number { rank, color });
            }
        }
    }
    for color in Color::ALL {
        deck.extend(std::iter::repeat(Card::Wild(color)).take(WILDS_PER_COLOR));
    }
    for color in Color::ALL {
        deck.extend(std::iter::repeat(Card::Skip(color)).take(SKIPS_PER_COLOR));
    }
    deck
}

/// Sum of penalty points of a collection of cards.
pub fn total_points<'a>(cards: impl IntoIterator<Item = &'a Card>) -> u32 {
    cards.into_iter().map(Card::points).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_deck_composition() {
        let deck = full_deck();
        assert_eq!(deck.len(), DECK_SIZE);
        assert_eq!(deck.iter().filter(|c| c.rank().is_some()).count(), 96);
        assert_eq!(deck.iter().filter(|c| c.is_wild()).count(), 8);
        assert_eq!(deck.iter().filter(|c| c.is_skip()).count(), 4);
        let red_sevens = deck
            .iter()
            .filter(|c| **c == Card::number(7, Color::Red))
            .count();
        assert_eq!(red_sevens, 2);
    }

    #[test]
    fn point_values() {
        assert_eq!(Card::Wild(Color::Blue).points(), 25);
        assert_eq!(Card::Skip(Color::Red).points(), 15);
        assert_eq!(Card::number(10, Color::Green).points(), 10);
        assert_eq!(Card::number(12, Color::Green).points(), 10);
        assert_eq!(Card::number(9, Color::Yellow).points(), 5);
        assert_eq!(Card::number(1, Color::Yellow).points(), 5);
    }

    #[test]
    fn substitution_eligibility() {
        assert!(Card::Wild(Color::Red).can_substitute(4));
        assert!(Card::number(4, Color::Blue).can_substitute(4));
        assert!(!Card::number(5, Color::Blue).can_substitute(4));
        assert!(!Card::Skip(Color::Blue).can_substitute(4));
    }

    #[test]
    fn display_matches_table_talk() {
        assert_eq!(Card::number(5, Color::Red).to_string(), "5 Red");
        assert_eq!(Card::Wild(Color::Green).to_string(), "Wild");
        assert_eq!(Card::Skip(Color::Green).to_string(), "Skip");
    }
}
