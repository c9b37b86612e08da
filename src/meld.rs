//! Meld validation.
//!
//! Everything here is a pure function over card slices. A Skip card never
//! belongs to any meld; a meld made only of Wilds is never valid because no
//! natural card anchors its rank or color.

use std::collections::BTreeMap;

use crate::card::{Card, Color, MAX_RANK, MIN_RANK};
use crate::phase::{MeldKind, Phase, PhaseRequirement};

/// Wild count and natural (numbered) cards of a slice, or `None` if it holds a Skip.
fn split_naturals(cards: &[Card]) -> Option<(usize, Vec<Card>)> {
    let mut wilds = 0;
    let mut naturals = Vec::with_capacity(cards.len());
    for card in cards {
        match card {
            Card::Wild(_) => wilds += 1,
            Card::Skip(_) => return None,
            Card::Number { .. } => naturals.push(*card),
        }
    }
    Some((wilds, naturals))
}

/// `count` cards where every non-Wild shares one rank.
pub fn is_valid_set(cards: &[Card], count: usize) -> bool {
    if count == 0 || cards.len() != count {
        return false;
    }
    let Some((_, naturals)) = split_naturals(cards) else {
        return false;
    };
    let Some(anchor) = naturals.first().and_then(Card::rank) else {
        return false;
    };
    cards.iter().all(|card| card.can_substitute(anchor))
}

/// `count` cards that cover a window of consecutive ranks, Wilds filling gaps.
pub fn is_valid_run(cards: &[Card], count: usize) -> bool {
    if count == 0 || cards.len() != count || count > usize::from(MAX_RANK) {
        return false;
    }
    let Some((wilds, naturals)) = split_naturals(cards) else {
        return false;
    };
    if naturals.is_empty() {
        return false;
    }
    let mut ranks: Vec<u8> = naturals.iter().filter_map(Card::rank).collect();
    ranks.sort_unstable();

    let last_start = MAX_RANK as usize - count + 1;
    (usize::from(MIN_RANK)..=last_start).any(|start| {
        let mut next = 0;
        let mut gaps = 0;
        for position in start..start + count {
            if ranks.get(next).map(|&r| usize::from(r)) == Some(position) {
                next += 1;
            } else {
                gaps += 1;
            }
        }
        next == ranks.len() && gaps <= wilds
    })
}

/// `count` cards of a single color, Wilds counting toward any color.
pub fn is_valid_color_requirement(cards: &[Card], count: usize) -> bool {
    if count == 0 || cards.len() != count {
        return false;
    }
    let Some((wilds, naturals)) = split_naturals(cards) else {
        return false;
    };
    if wilds >= count {
        return false;
    }
    Color::ALL.iter().any(|color| {
        let matching = naturals.iter().filter(|card| card.color() == *color).count();
        matching + wilds >= count
    })
}

/// Whether `cards` alone satisfy one clause.
pub fn satisfies(requirement: &PhaseRequirement, cards: &[Card]) -> bool {
    match requirement.kind {
        MeldKind::Set => is_valid_set(cards, requirement.count),
        MeldKind::Run => is_valid_run(cards, requirement.count),
        MeldKind::Color => is_valid_color_requirement(cards, requirement.count),
    }
}

/// Splits `cards` into one group per clause of `phase`, if any assignment works.
///
/// Two-clause phases are searched exhaustively over every subset of the
/// first clause's size; hands are at most nine cards so the search is small.
pub fn partition_phase(cards: &[Card], phase: &Phase) -> Option<Vec<Vec<Card>>> {
    if cards.len() != phase.card_count() {
        return None;
    }
    match phase.requirements {
        [only] => satisfies(only, cards).then(|| vec![cards.to_vec()]),
        [first, second] => {
            let total = cards.len();
            if total >= u32::BITS as usize {
                return None;
            }
            (0u32..(1 << total))
                .filter(|mask| mask.count_ones() as usize == first.count)
                .find_map(|mask| {
                    let (left, right) = split_by_mask(cards, mask);
                    (satisfies(first, &left) && satisfies(second, &right))
                        .then(|| vec![left, right])
                })
        }
        _ => None,
    }
}

fn split_by_mask(cards: &[Card], mask: u32) -> (Vec<Card>, Vec<Card>) {
    let mut left = Vec::with_capacity(cards.len());
    let mut right = Vec::with_capacity(cards.len());
    for (idx, card) in cards.iter().enumerate() {
        if mask & (1 << idx) != 0 {
            left.push(*card);
        } else {
            right.push(*card);
        }
    }
    (left, right)
}

/// Whether `cards` complete `phase`.
pub fn validate_phase(cards: &[Card], phase: &Phase) -> bool {
    partition_phase(cards, phase).is_some()
}

/// Finds a selection of cards from `hand` that completes `phase`.
///
/// Hands larger than 24 cards are not searched.
pub fn find_phase_in_hand(hand: &[Card], phase: &Phase) -> Option<Vec<Card>> {
    let needed = phase.card_count();
    if hand.len() < needed || hand.len() > 24 {
        return None;
    }
    (0u32..(1 << hand.len()))
        .filter(|mask| mask.count_ones() as usize == needed)
        .map(|mask| split_by_mask(hand, mask).0)
        .find(|selection| validate_phase(selection, phase))
}

/// Whether `card` may be hit onto `laid`, the cards already laid down for `phase`.
///
/// Only the aggregate of the laid cards is inspected: for two-set phases any
/// rank already present is accepted, and set-plus-run phases accept any
/// Wild or numbered card.
pub fn can_extend(card: &Card, laid: &[Card], phase: &Phase) -> bool {
    match card {
        Card::Skip(_) => false,
        Card::Wild(_) => true,
        Card::Number { rank, color } => {
            if phase.is_two_sets() {
                laid.iter().any(|existing| existing.rank() == Some(*rank))
            } else if phase.is_set_and_run() {
                true
            } else if phase.is_single_run() {
                extends_run(*rank, laid)
            } else if phase.is_color() {
                dominant_color(laid).is_none_or(|dominant| dominant == *color)
            } else {
                false
            }
        }
    }
}

fn extends_run(rank: u8, laid: &[Card]) -> bool {
    let mut ranks = laid.iter().filter_map(Card::rank);
    let Some(first) = ranks.next() else {
        return true;
    };
    let (low, high) = ranks.fold((first, first), |(lo, hi), r| (lo.min(r), hi.max(r)));
    rank + 1 == low || rank == high + 1
}

/// Most frequent color among the laid numbered cards; ties go to the
/// greatest color in [`Color`] order.
pub fn dominant_color(laid: &[Card]) -> Option<Color> {
    let mut counts: BTreeMap<Color, usize> = BTreeMap::new();
    for card in laid.iter().filter(|card| card.rank().is_some()) {
        *counts.entry(card.color()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|(color, count)| (*count, *color))
        .map(|(color, _)| color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Color::{Blue, Green, Red, Yellow};
    use crate::phase::phase;

    fn n(rank: u8, color: Color) -> Card {
        Card::number(rank, color)
    }

    fn wild() -> Card {
        Card::Wild(Red)
    }

    #[test]
    fn set_rules() {
        assert!(is_valid_set(&[n(5, Red), n(5, Blue), n(5, Green)], 3));
        assert!(is_valid_set(&[n(5, Red), wild(), wild()], 3));
        assert!(!is_valid_set(&[wild(), wild(), wild()], 3));
        assert!(!is_valid_set(&[n(5, Red), n(6, Blue), n(5, Green)], 3));
        assert!(!is_valid_set(&[n(5, Red), n(5, Blue)], 3));
        assert!(!is_valid_set(&[n(5, Red), n(5, Blue), Card::Skip(Red)], 3));
        assert!(!is_valid_set(&[], 0));
    }

    #[test]
    fn run_rules() {
        assert!(is_valid_run(&[n(3, Red), n(4, Blue), n(5, Green), n(6, Red)], 4));
        assert!(is_valid_run(&[n(6, Red), n(3, Blue), n(5, Green), n(4, Red)], 4));
        assert!(is_valid_run(&[n(3, Red), wild(), n(5, Green), n(6, Red)], 4));
        assert!(is_valid_run(&[n(12, Red), wild(), wild(), wild()], 4));
        assert!(is_valid_run(&[n(1, Red), wild(), wild(), wild()], 4));
        assert!(!is_valid_run(&[n(3, Red), n(3, Blue), n(5, Green), n(6, Red)], 4));
        assert!(!is_valid_run(&[n(3, Red), n(4, Blue), n(5, Green), n(8, Red)], 4));
        assert!(!is_valid_run(&[wild(), wild(), wild(), wild()], 4));
        assert!(!is_valid_run(&[n(3, Red), n(4, Blue), Card::Skip(Red), n(6, Red)], 4));
    }

    #[test]
    fn run_of_nine_edges() {
        let low: Vec<Card> = (1..=9).map(|r| n(r, Red)).collect();
        let high: Vec<Card> = (4..=12).map(|r| n(r, Blue)).collect();
        assert!(is_valid_run(&low, 9));
        assert!(is_valid_run(&high, 9));
        let mut gapped: Vec<Card> = (1..=8).map(|r| n(r, Red)).collect();
        gapped.push(n(12, Red));
        assert!(!is_valid_run(&gapped, 9));
    }

    #[test]
    fn color_rules() {
        let reds: Vec<Card> = (1..=7).map(|r| n(r, Red)).collect();
        assert!(is_valid_color_requirement(&reds, 7));
        let mut with_wilds: Vec<Card> = (1..=5).map(|r| n(r, Red)).collect();
        with_wilds.extend([wild(), Card::Wild(Blue)]);
        assert!(is_valid_color_requirement(&with_wilds, 7));
        let mut mixed: Vec<Card> = (1..=6).map(|r| n(r, Red)).collect();
        mixed.push(n(2, Yellow));
        assert!(!is_valid_color_requirement(&mixed, 7));
        assert!(!is_valid_color_requirement(&vec![wild(); 7], 7));
    }

    #[test]
    fn phase_one_examples() {
        let p1 = phase(1).unwrap();
        let good = [n(5, Red), n(5, Blue), n(5, Green), n(8, Red), n(8, Blue), n(8, Yellow)];
        let bad = [n(5, Red), n(5, Blue), n(6, Green), n(8, Red), n(8, Blue), n(8, Yellow)];
        assert!(validate_phase(&good, p1));
        assert!(!validate_phase(&bad, p1));
    }

    #[test]
    fn wild_must_land_in_the_right_group() {
        // The only valid split places the Wild with the lone 9.
        let p9 = phase(9).unwrap();
        let cards = [
            n(4, Red),
            n(4, Blue),
            n(4, Green),
            n(4, Yellow),
            n(4, Red),
            n(9, Blue),
            wild(),
        ];
        assert!(validate_phase(&cards, p9));
        let groups = partition_phase(&cards, p9).unwrap();
        assert_eq!(groups[0].len(), 5);
        assert!(groups[1].contains(&n(9, Blue)));
    }

    #[test]
    fn set_and_run_phase() {
        let p2 = phase(2).unwrap();
        let cards = [
            n(7, Red),
            n(7, Blue),
            wild(),
            n(2, Red),
            n(3, Green),
            n(4, Yellow),
            n(5, Red),
        ];
        assert!(validate_phase(&cards, p2));
        let broken = [
            n(7, Red),
            n(7, Blue),
            n(8, Red),
            n(2, Red),
            n(3, Green),
            n(4, Yellow),
            n(9, Red),
        ];
        assert!(!validate_phase(&broken, p2));
    }

    #[test]
    fn wrong_card_count_fails() {
        let p4 = phase(4).unwrap();
        let six: Vec<Card> = (1..=6).map(|r| n(r, Red)).collect();
        assert!(!validate_phase(&six, p4));
        let seven: Vec<Card> = (1..=7).map(|r| n(r, Red)).collect();
        assert!(validate_phase(&seven, p4));
    }

    #[test]
    fn finds_phase_inside_larger_hand() {
        let p1 = phase(1).unwrap();
        let hand = [
            n(2, Red),
            n(8, Blue),
            n(5, Red),
            Card::Skip(Red),
            n(8, Red),
            n(5, Blue),
            wild(),
            Card::Wild(Blue),
        ];
        let found = find_phase_in_hand(&hand, p1).unwrap();
        assert_eq!(found.len(), 6);
        assert!(validate_phase(&found, p1));
        assert!(!found.contains(&Card::Skip(Red)));
        assert!(find_phase_in_hand(&hand[..5], p1).is_none());
    }

    #[test]
    fn hitting_on_sets_uses_laid_ranks() {
        let p1 = phase(1).unwrap();
        let laid = [n(5, Red), n(5, Blue), n(5, Green), n(8, Red), n(8, Blue), n(8, Yellow)];
        assert!(can_extend(&n(5, Yellow), &laid, p1));
        assert!(can_extend(&n(8, Green), &laid, p1));
        assert!(!can_extend(&n(9, Green), &laid, p1));
        assert!(can_extend(&wild(), &laid, p1));
        assert!(!can_extend(&Card::Skip(Red), &laid, p1));
    }

    #[test]
    fn hitting_on_runs_extends_ends() {
        let p4 = phase(4).unwrap();
        let laid: Vec<Card> = (3..=9).map(|r| n(r, Red)).collect();
        assert!(can_extend(&n(2, Blue), &laid, p4));
        assert!(can_extend(&n(10, Blue), &laid, p4));
        assert!(!can_extend(&n(5, Blue), &laid, p4));
        assert!(!can_extend(&n(12, Blue), &laid, p4));
        let from_one: Vec<Card> = (1..=7).map(|r| n(r, Red)).collect();
        assert!(can_extend(&n(8, Green), &from_one, p4));
    }

    #[test]
    fn hitting_on_color_uses_dominant_color() {
        let p8 = phase(8).unwrap();
        let mut laid: Vec<Card> = (1..=6).map(|r| n(r, Green)).collect();
        laid.push(wild());
        assert!(can_extend(&n(11, Green), &laid, p8));
        assert!(!can_extend(&n(11, Red), &laid, p8));
    }

    #[test]
    fn dominant_color_ties_prefer_greatest_color() {
        let laid = [n(1, Red), n(2, Yellow), wild()];
        assert_eq!(dominant_color(&laid), Some(Yellow));
        assert_eq!(dominant_color(&[wild()]), None);
    }

    #[test]
    fn hitting_on_set_and_run_is_permissive() {
        let p3 = phase(3).unwrap();
        let laid = [
            n(7, Red),
            n(7, Blue),
            n(7, Green),
            n(7, Yellow),
            n(2, Red),
            n(3, Red),
            n(4, Red),
            n(5, Red),
        ];
        assert!(can_extend(&n(11, Blue), &laid, p3));
        assert!(!can_extend(&Card::Skip(Blue), &laid, p3));
    }
}
