//! Property tests for phase validation against a brute-force reference.

use phaseten::card::{Card, Color};
use phaseten::{MeldKind, PHASES, Phase, PhaseRequirement, is_valid_run, phase, validate_phase};
use proptest::prelude::*;

fn naturals(cards: &[Card]) -> Option<Vec<(u8, Color)>> {
    let mut out = Vec::new();
    for card in cards {
        match card {
            Card::Skip(_) => return None,
            Card::Wild(_) => {}
            Card::Number { rank, color } => out.push((*rank, *color)),
        }
    }
    Some(out)
}

/// Clause check written from the rules rather than from the engine.
fn reference_clause(requirement: &PhaseRequirement, cards: &[Card]) -> bool {
    if cards.len() != requirement.count {
        return false;
    }
    let Some(naturals) = naturals(cards) else {
        return false;
    };
    let Some(&(first_rank, first_color)) = naturals.first() else {
        return false;
    };
    match requirement.kind {
        MeldKind::Set => naturals.iter().all(|&(rank, _)| rank == first_rank),
        MeldKind::Color => naturals.iter().all(|&(_, color)| color == first_color),
        MeldKind::Run => {
            let mut ranks: Vec<u8> = naturals.iter().map(|&(rank, _)| rank).collect();
            ranks.sort_unstable();
            let distinct = ranks.windows(2).all(|pair| pair[0] != pair[1]);
            let span = usize::from(ranks[ranks.len() - 1] - ranks[0]) + 1;
            distinct && span <= requirement.count && requirement.count <= 12
        }
    }
}

/// Tries every labelling of cards into the phase's groups.
fn reference_phase(cards: &[Card], phase: &Phase) -> bool {
    fn assign(
        cards: &[Card],
        requirements: &[PhaseRequirement],
        groups: &mut Vec<Vec<Card>>,
    ) -> bool {
        match cards.split_first() {
            None => requirements
                .iter()
                .zip(groups.iter())
                .all(|(req, group)| reference_clause(req, group)),
            Some((card, rest)) => (0..requirements.len()).any(|slot| {
                if groups[slot].len() >= requirements[slot].count {
                    return false;
                }
                groups[slot].push(*card);
                let found = assign(rest, requirements, groups);
                groups[slot].pop();
                found
            }),
        }
    }
    if cards.len() != phase.card_count() {
        return false;
    }
    let mut groups = vec![Vec::new(); phase.requirements.len()];
    assign(cards, phase.requirements, &mut groups)
}

fn color() -> impl Strategy<Value = Color> + Clone {
    prop::sample::select(Color::ALL.to_vec())
}

fn card() -> impl Strategy<Value = Card> + Clone {
    prop_oneof![
        8 => (1u8..=12, color()).prop_map(|(rank, color)| Card::number(rank, color)),
        2 => color().prop_map(Card::Wild),
        1 => color().prop_map(Card::Skip),
    ]
}

/// Cards drawn from a narrow rank band so that random hands are often valid.
fn clustered_card() -> impl Strategy<Value = Card> + Clone {
    prop_oneof![
        6 => (3u8..=6, color()).prop_map(|(rank, color)| Card::number(rank, color)),
        2 => color().prop_map(Card::Wild),
        1 => color().prop_map(Card::Skip),
    ]
}

fn phase_and_cards(
    cards: impl Strategy<Value = Card> + Clone,
) -> impl Strategy<Value = (u8, Vec<Card>)> {
    (1u8..=10).prop_flat_map(move |number| {
        let len = PHASES[usize::from(number) - 1].card_count();
        (Just(number), prop::collection::vec(cards.clone(), len))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_validate_matches_reference((number, cards) in phase_and_cards(card())) {
        let phase = phase(number).unwrap();
        prop_assert_eq!(validate_phase(&cards, phase), reference_phase(&cards, phase));
    }

    #[test]
    fn prop_validate_matches_reference_clustered(
        (number, cards) in phase_and_cards(clustered_card()),
    ) {
        let phase = phase(number).unwrap();
        prop_assert_eq!(validate_phase(&cards, phase), reference_phase(&cards, phase));
    }

    /// Any window of ranks with some positions replaced by Wilds is a run.
    #[test]
    fn prop_window_with_wilds_is_run(
        (len, start) in (1usize..=9).prop_flat_map(|len| (Just(len), 1usize..=(12 - len + 1))),
        colors in prop::collection::vec(color(), 9),
        wild_mask in any::<u16>(),
        order in any::<u64>(),
    ) {
        let mut cards: Vec<Card> = (0..len)
            .map(|offset| {
                if wild_mask & (1 << offset) != 0 {
                    Card::Wild(colors[offset])
                } else {
                    Card::number((start + offset) as u8, colors[offset])
                }
            })
            .collect();
        // Keep at least one natural card.
        if cards.iter().all(Card::is_wild) {
            cards[0] = Card::number(start as u8, colors[0]);
        }
        cards.rotate_left((order % len as u64) as usize);
        prop_assert!(is_valid_run(&cards, len));
    }

    /// Repeating a rank inside an all-natural run breaks it.
    #[test]
    fn prop_repeated_rank_breaks_run(
        (len, start) in (2usize..=9).prop_flat_map(|len| (Just(len), 1usize..=(12 - len + 1))),
        victim in 0usize..9,
        copy in 0usize..9,
    ) {
        let victim = victim % len;
        let copy = copy % len;
        prop_assume!(victim != copy);
        let mut cards: Vec<Card> = (0..len)
            .map(|offset| Card::number((start + offset) as u8, Color::Red))
            .collect();
        cards[victim] = Card::number((start + copy) as u8, Color::Blue);
        prop_assert!(!is_valid_run(&cards, len));
    }

    /// Seven cards of one color with fewer than seven Wilds complete phase 8.
    #[test]
    fn prop_single_color_completes_phase_eight(
        base in color(),
        ranks in prop::collection::vec(1u8..=12, 7),
        wilds in 0usize..7,
    ) {
        let cards: Vec<Card> = ranks
            .iter()
            .enumerate()
            .map(|(idx, &rank)| {
                if idx < wilds { Card::Wild(base) } else { Card::number(rank, base) }
            })
            .collect();
        prop_assert!(validate_phase(&cards, phase(8).unwrap()));
    }
}

#[test]
fn all_wilds_never_complete_a_phase() {
    for phase in PHASES.iter() {
        let cards = vec![Card::Wild(Color::Green); phase.card_count()];
        assert!(!validate_phase(&cards, phase), "{phase}");
    }
}

#[test]
fn phase_four_needs_seven_in_a_row() {
    let run: Vec<Card> = (3..=9).map(|rank| Card::number(rank, Color::Yellow)).collect();
    assert!(validate_phase(&run, phase(4).unwrap()));

    let mut gap = run.clone();
    gap[3] = Card::number(12, Color::Yellow);
    assert!(!validate_phase(&gap, phase(4).unwrap()));

    gap[3] = Card::Wild(Color::Red);
    assert!(validate_phase(&gap, phase(4).unwrap()));
}

#[test]
fn phase_six_edges_of_rank_range() {
    let low: Vec<Card> = (1..=9).map(|rank| Card::number(rank, Color::Blue)).collect();
    let high: Vec<Card> = (4..=12).map(|rank| Card::number(rank, Color::Green)).collect();
    assert!(validate_phase(&low, phase(6).unwrap()));
    assert!(validate_phase(&high, phase(6).unwrap()));

    // 1 and 12 cannot share a nine-card window.
    let mut wrapped = low.clone();
    wrapped[0] = Card::number(12, Color::Blue);
    wrapped[1] = Card::Wild(Color::Blue);
    assert!(!validate_phase(&wrapped, phase(6).unwrap()));
}

#[test]
fn phase_nine_and_ten_split_sets_by_size() {
    let nine = [
        Card::number(4, Color::Red), Card::number(4, Color::Blue), Card::number(4, Color::Green),
        Card::Wild(Color::Yellow), Card::number(4, Color::Yellow),
        Card::number(11, Color::Red), Card::number(11, Color::Blue),
    ];
    assert!(validate_phase(&nine, phase(9).unwrap()));

    let ten = [
        Card::number(7, Color::Red), Card::number(2, Color::Red), Card::number(7, Color::Blue),
        Card::number(2, Color::Blue), Card::number(7, Color::Green), Card::Wild(Color::Red),
        Card::number(7, Color::Yellow), Card::number(2, Color::Green),
    ];
    assert!(validate_phase(&ten, phase(10).unwrap()));

    let mut skip = ten;
    skip[1] = Card::Skip(Color::Red);
    assert!(!validate_phase(&skip, phase(10).unwrap()));
}
