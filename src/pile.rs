use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::card::{Card, full_deck};

/// Face-down draw pile. The top of the deck is the end of the vector.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// A fresh 108-card deck shuffled with `rng`.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards = full_deck();
        cards.shuffle(rng);
        Self { cards }
    }

    /// Deck in exactly the given order (last element drawn first).
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn peek(&self) -> Option<&Card> {
        self.cards.last()
    }

    pub fn cards_remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Moves every discard except the current top back into the deck and
    /// shuffles. Returns the number of cards recycled.
    pub fn replenish_from<R: Rng + ?Sized>(
        &mut self,
        discard: &mut DiscardPile,
        rng: &mut R,
    ) -> usize {
        let recycled = discard.take_all_but_top();
        let moved = recycled.len();
        self.cards.extend(recycled);
        self.cards.shuffle(rng);
        moved
    }
}

/// Face-up discard stack; the top is the most recently discarded card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardPile {
    cards: Vec<Card>,
}

impl DiscardPile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Removes the top card. Whether a Skip may be taken is decided by the caller.
    pub fn take_top(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn peek_top(&self) -> Option<&Card> {
        self.cards.last()
    }

    pub fn size(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    fn take_all_but_top(&mut self) -> Vec<Card> {
        match self.cards.pop() {
            Some(top) => {
                let rest = std::mem::take(&mut self.cards);
                self.cards.push(top);
                rest
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::card::{Color, DECK_SIZE};

    #[test]
    fn draw_takes_from_the_end() {
        let mut deck = Deck::from_cards(vec![
            Card::number(1, Color::Red),
            Card::number(2, Color::Red),
        ]);
        assert_eq!(deck.peek(), Some(&Card::number(2, Color::Red)));
        assert_eq!(deck.draw(), Some(Card::number(2, Color::Red)));
        assert_eq!(deck.cards_remaining(), 1);
    }

    #[test]
    fn replenish_keeps_discard_top() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut deck = Deck::default();
        let mut discard = DiscardPile::from_cards(vec![
            Card::number(3, Color::Blue),
            Card::number(4, Color::Blue),
            Card::Skip(Color::Red),
        ]);
        let moved = deck.replenish_from(&mut discard, &mut rng);
        assert_eq!(moved, 2);
        assert_eq!(deck.cards_remaining(), 2);
        assert_eq!(discard.size(), 1);
        assert_eq!(discard.peek_top(), Some(&Card::Skip(Color::Red)));
    }

    #[test]
    fn replenish_from_empty_discard_is_noop() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut deck = Deck::default();
        let mut discard = DiscardPile::new();
        assert_eq!(deck.replenish_from(&mut discard, &mut rng), 0);
        assert!(deck.is_empty());
        assert!(discard.is_empty());
    }

    #[test]
    fn shuffled_deck_is_full() {
        let mut rng = StdRng::seed_from_u64(1);
        let deck = Deck::shuffled(&mut rng);
        assert_eq!(deck.cards_remaining(), DECK_SIZE);
    }
}
