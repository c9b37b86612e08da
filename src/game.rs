use std::collections::HashSet;

use log::{debug, info};
use rand::rngs::StdRng;

use crate::action::{Action, DrawSource, PlayerId};
use crate::card::{Card, DECK_SIZE};
use crate::error::{GameError, InvalidAction};
use crate::meld::find_phase_in_hand;
use crate::pile::{Deck, DiscardPile};
use crate::player::Player;
use crate::score::{RoundSummary, pick_game_winner, round_points};
use crate::seed::shuffle_rng;
use crate::state::{GameSettings, GameStateView, GameStatus, PlayerPublicState, TurnPhase};

const DEFAULT_SEED: u64 = 0x5EED_5EED_5EED_5EED;

/// Builder that enables deterministic deck injection for testing.
pub struct GameBuilder {
    names: Vec<String>,
    seed: u64,
    deck: Option<Vec<Card>>,
    hand_size: Option<usize>,
}

impl GameBuilder {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            seed: DEFAULT_SEED,
            deck: None,
            hand_size: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Use `deck` (last element on top) for the first round instead of a
    /// shuffled one. Later rounds are shuffled from the seed as usual.
    pub fn with_deck(mut self, deck: Vec<Card>) -> Self {
        self.deck = Some(deck);
        self
    }

    /// Override the number of cards dealt to each player (default 10).
    pub fn with_hand_size(mut self, hand_size: usize) -> Self {
        self.hand_size = Some(hand_size);
        self
    }

    pub fn build(self) -> Result<Game, GameError> {
        Game::from_builder(self)
    }
}

/// Round and turn orchestrator for one game.
///
/// A game is an owned aggregate: every transition takes `&mut self`, and an
/// `Err` return leaves the game exactly as it was, except that a rejected
/// phase selection uses up the turn's attempt.
pub struct Game {
    pub(crate) settings: GameSettings,
    pub(crate) seed: u64,
    pub(crate) shuffles: u64,
    pub(crate) players: Vec<Player>,
    pub(crate) deck: Deck,
    pub(crate) discard: DiscardPile,
    pub(crate) current_player: PlayerId,
    pub(crate) round_number: u32,
    pub(crate) turn_phase: TurnPhase,
    /// Set once the current player's phase attempt has been rejected this turn.
    pub(crate) phase_attempted: bool,
    pub(crate) winner: Option<PlayerId>,
    pub(crate) last_round: Option<RoundSummary>,
}

/// Names must be non-empty and distinct.
pub(crate) fn ensure_unique_names<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(), GameError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() || !seen.insert(name) {
            return Err(GameError::DuplicatePlayerName(name.to_string()));
        }
    }
    Ok(())
}

/// Construct a game with default settings.
pub fn new_game<I, S>(names: I) -> Result<Game, GameError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    GameBuilder::new(names).build()
}

impl Game {
    pub fn builder<I, S>(names: I) -> GameBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GameBuilder::new(names)
    }

    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn status(&self) -> GameStatus {
        match self.winner {
            Some(winner) => GameStatus::Finished { winner },
            None => GameStatus::Ongoing,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn turn_phase(&self) -> TurnPhase {
        self.turn_phase
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, GameError> {
        self.players.get(id).ok_or(GameError::InvalidPlayer(id))
    }

    pub fn player_by_name(&self, name: &str) -> Option<PlayerId> {
        self.players.iter().position(|player| player.name() == name)
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn discard_pile(&self) -> &DiscardPile {
        &self.discard
    }

    pub fn discard_top(&self) -> Option<Card> {
        self.discard.peek_top().copied()
    }

    pub fn last_round(&self) -> Option<&RoundSummary> {
        self.last_round.as_ref()
    }

    /// Whether the current player has already used this turn's phase attempt.
    pub fn phase_attempted(&self) -> bool {
        self.phase_attempted
    }

    /// Hand of `id` in display order.
    pub fn sorted_hand(&self, id: PlayerId) -> Result<Vec<Card>, GameError> {
        Ok(self.player(id)?.sorted_hand())
    }

    /// Players whose laid phase `id` may hit, including `id` itself.
    pub fn available_hit_targets(&self, id: PlayerId) -> Result<Vec<PlayerId>, GameError> {
        if !self.player(id)?.has_completed_phase() {
            return Ok(Vec::new());
        }
        Ok(self
            .players
            .iter()
            .enumerate()
            .filter(|(_, player)| player.has_completed_phase())
            .map(|(target, _)| target)
            .collect())
    }

    /// Every card currently in the deck, discard pile, hands and laid phases.
    pub fn cards_in_play(&self) -> usize {
        self.deck.cards_remaining()
            + self.discard.size()
            + self
                .players
                .iter()
                .map(|player| player.hand_size() + player.completed_phase_cards().len())
                .sum::<usize>()
    }

    pub fn status_view(&self) -> GameStateView {
        let players = self
            .players
            .iter()
            .enumerate()
            .map(|(id, player)| PlayerPublicState {
                id,
                name: player.name().to_string(),
                phase: player.current_phase(),
                hand_size: player.hand_size(),
                score: player.score(),
                completed_phase: player.has_completed_phase(),
                laid_cards: player.completed_phase_cards().to_vec(),
                is_current: id == self.current_player,
            })
            .collect();

        GameStateView {
            settings: self.settings,
            round_number: self.round_number,
            turn_phase: self.turn_phase,
            status: self.status(),
            current_player: self.current_player,
            players,
            discard_top: self.discard_top(),
            discard_size: self.discard.size(),
            deck_size: self.deck.cards_remaining(),
            game_over: self.is_finished(),
            winner: self.winner.map(|id| self.players[id].name().to_string()),
        }
    }

    pub fn legal_actions(&self, player: PlayerId) -> Result<Vec<Action>, GameError> {
        if matches!(self.turn_phase, TurnPhase::GameOver | TurnPhase::RoundOver) {
            return Ok(Vec::new());
        }
        if player >= self.players.len() {
            return Err(GameError::InvalidPlayer(player));
        }
        if player != self.current_player {
            return Err(GameError::NotPlayersTurn);
        }
        let state = &self.players[player];
        let mut actions = Vec::new();

        if self.turn_phase == TurnPhase::AwaitingDraw {
            if !self.deck.is_empty() || self.discard.size() > 1 {
                actions.push(Action::Draw(DrawSource::Deck));
            }
            if self.discard_top().is_some_and(|top| !top.is_skip()) {
                actions.push(Action::Draw(DrawSource::Discard));
            }
            return Ok(actions);
        }

        let mut distinct: Vec<Card> = Vec::with_capacity(state.hand_size());
        for card in state.hand() {
            if !distinct.contains(card) {
                distinct.push(*card);
            }
        }

        if self.turn_phase == TurnPhase::AwaitingPhaseAttempt && !self.phase_attempted {
            let selection = state
                .phase()
                .and_then(|current| find_phase_in_hand(state.hand(), current))
                .filter(|cards| cards.len() < state.hand_size());
            if let Some(cards) = selection {
                actions.push(Action::CompletePhase(cards));
            }
        }
        if self.turn_phase == TurnPhase::AwaitingHits && state.hand_size() > 1 {
            for target in self.available_hit_targets(player)? {
                for card in &distinct {
                    if self.players[target].accepts_hit(card) {
                        actions.push(Action::Hit {
                            card: *card,
                            target,
                        });
                    }
                }
            }
        }
        if matches!(
            self.turn_phase,
            TurnPhase::AwaitingPhaseAttempt | TurnPhase::AwaitingHits
        ) {
            actions.push(Action::Pass);
        }
        actions.extend(distinct.into_iter().map(Action::Discard));
        Ok(actions)
    }

    pub fn apply_action(&mut self, player: PlayerId, action: Action) -> Result<(), GameError> {
        match action {
            Action::Draw(source) => self.draw(player, source).map(|_| ()),
            Action::CompletePhase(cards) => self.complete_phase(player, &cards),
            Action::Hit { card, target } => self.hit(player, card, target),
            Action::Pass => self.pass(player),
            Action::Discard(card) => self.discard(player, card),
        }
    }

    /// Draws one card for the current player and returns it.
    pub fn draw(&mut self, player: PlayerId, source: DrawSource) -> Result<Card, GameError> {
        self.ensure_turn(player)?;
        self.ensure_phase(|phase| phase == TurnPhase::AwaitingDraw)?;

        let card = match source {
            DrawSource::Deck => {
                if self.deck.is_empty() {
                    self.replenish_deck()?;
                }
                self.deck.draw().ok_or(GameError::PilesExhausted)?
            }
            DrawSource::Discard => match self.discard.peek_top() {
                None => return Err(InvalidAction::NoCardAvailable.into()),
                Some(top) if top.is_skip() => return Err(InvalidAction::SkipNotDrawable.into()),
                Some(_) => self
                    .discard
                    .take_top()
                    .ok_or(InvalidAction::NoCardAvailable)?,
            },
        };

        let state = &mut self.players[player];
        state.add_card(card);
        self.turn_phase = if state.has_completed_phase() {
            TurnPhase::AwaitingHits
        } else {
            TurnPhase::AwaitingPhaseAttempt
        };
        debug!("{} draws {card} from {source:?}", state.name());
        Ok(card)
    }

    /// Lays down the current player's phase with exactly `cards`.
    ///
    /// Each turn allows one attempt. A selection that does not form the phase
    /// uses it up: the hand is untouched but later attempts this turn fail
    /// with [`InvalidAction::PhaseAttemptUsed`].
    pub fn complete_phase(&mut self, player: PlayerId, cards: &[Card]) -> Result<(), GameError> {
        self.ensure_turn(player)?;
        self.ensure_phase(|phase| phase == TurnPhase::AwaitingPhaseAttempt)?;
        if self.phase_attempted {
            return Err(InvalidAction::PhaseAttemptUsed.into());
        }
        let state = &mut self.players[player];
        match state.complete_phase(cards) {
            Ok(()) => {}
            Err(err @ InvalidAction::InvalidMeld { .. }) => {
                self.phase_attempted = true;
                debug!("{} fails phase {}", state.name(), state.current_phase());
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        }
        self.turn_phase = TurnPhase::AwaitingHits;
        info!(
            "{} completes phase {} with {} cards",
            state.name(),
            state.current_phase(),
            cards.len()
        );
        Ok(())
    }

    /// Adds `card` from the current player's hand to `target`'s laid phase.
    pub fn hit(&mut self, player: PlayerId, card: Card, target: PlayerId) -> Result<(), GameError> {
        self.ensure_turn(player)?;
        self.ensure_phase(|phase| phase == TurnPhase::AwaitingHits)?;
        if target >= self.players.len() {
            return Err(GameError::InvalidPlayer(target));
        }
        let hitter = &self.players[player];
        if !hitter.has_completed_phase() {
            return Err(InvalidAction::PhaseNotCompleted.into());
        }
        if !self.players[target].has_completed_phase() {
            return Err(InvalidAction::TargetPhaseNotCompleted(target).into());
        }
        if !hitter.holds(&card) {
            return Err(InvalidAction::CardNotInHand(card).into());
        }
        if hitter.hand_size() <= 1 {
            return Err(InvalidAction::MustKeepCardToDiscard.into());
        }
        if !self.players[target].accepts_hit(&card) {
            return Err(InvalidAction::CannotHit(card).into());
        }

        let card = self.players[player].remove_card(&card)?;
        self.players[target].receive_hit(card);
        debug!(
            "{} hits {card} on {}",
            self.players[player].name(),
            self.players[target].name()
        );
        Ok(())
    }

    /// Skips the remaining optional steps; only a discard is allowed afterwards.
    pub fn pass(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.ensure_turn(player)?;
        self.ensure_phase(|phase| {
            matches!(phase, TurnPhase::AwaitingPhaseAttempt | TurnPhase::AwaitingHits)
        })?;
        self.turn_phase = TurnPhase::AwaitingDiscard;
        Ok(())
    }

    /// Discards `card`, ending the turn. Going out ends the round.
    pub fn discard(&mut self, player: PlayerId, card: Card) -> Result<(), GameError> {
        self.ensure_turn(player)?;
        self.ensure_phase(|phase| phase.may_discard())?;
        let card = self.players[player].remove_card(&card)?;
        self.discard.push(card);

        let step = if card.is_skip() {
            self.skip_step()
        } else {
            1
        };
        debug!("{} discards {card}", self.players[player].name());
        if card.is_skip() {
            debug!("skip played; turn pointer advances by {step}");
        }

        self.advance_turn(step);
        if self.players[player].hand_size() == 0 {
            self.end_round(player);
        }
        Ok(())
    }

    /// Deals the next round after a round has been scored.
    pub fn start_next_round(&mut self) -> Result<(), GameError> {
        match self.turn_phase {
            TurnPhase::RoundOver => {}
            TurnPhase::GameOver => return Err(GameError::GameOver),
            actual => return Err(GameError::WrongTurnPhase { actual }),
        }
        let mut rng = shuffle_rng(self.seed, self.shuffles);
        self.deal(Deck::shuffled(&mut rng))?;
        self.shuffles += 1;
        self.round_number += 1;
        info!(
            "round {} begins with {}",
            self.round_number,
            self.players[self.current_player].name()
        );
        Ok(())
    }

    fn from_builder(builder: GameBuilder) -> Result<Self, GameError> {
        let GameBuilder {
            names,
            seed,
            deck,
            hand_size,
        } = builder;
        let mut settings = GameSettings::new(names.len())?;
        ensure_unique_names(names.iter().map(String::as_str))?;
        if let Some(hand_size) = hand_size {
            settings.hand_size = hand_size;
        }
        settings.check_hand_size()?;

        let mut game = Game {
            settings,
            seed,
            shuffles: 0,
            players: names.into_iter().map(Player::new).collect(),
            deck: Deck::default(),
            discard: DiscardPile::new(),
            current_player: 0,
            round_number: 1,
            turn_phase: TurnPhase::AwaitingDraw,
            phase_attempted: false,
            winner: None,
            last_round: None,
        };

        let deck = match deck {
            Some(cards) => {
                if cards.len() > DECK_SIZE {
                    return Err(GameError::InvalidConfiguration(
                        "injected deck holds more than 108 cards",
                    ));
                }
                Deck::from_cards(cards)
            }
            None => {
                let mut rng = game.next_rng();
                Deck::shuffled(&mut rng)
            }
        };
        game.deal(deck)?;
        info!(
            "new game with {} players, seed {:#x}",
            game.players.len(),
            game.seed
        );
        Ok(game)
    }

    /// Resets round state, deals hands round-robin and turns up the first discard.
    fn deal(&mut self, mut deck: Deck) -> Result<(), GameError> {
        if deck.cards_remaining() < self.settings.hand_size * self.players.len() + 1 {
            return Err(GameError::InvalidConfiguration(
                "deck does not contain enough cards to deal",
            ));
        }
        for player in &mut self.players {
            player.reset_for_new_round();
        }
        for _ in 0..self.settings.hand_size {
            for player in &mut self.players {
                let card = deck.draw().ok_or(GameError::PilesExhausted)?;
                player.add_card(card);
            }
        }
        let mut discard = DiscardPile::new();
        discard.push(deck.draw().ok_or(GameError::PilesExhausted)?);
        self.deck = deck;
        self.discard = discard;
        self.turn_phase = TurnPhase::AwaitingDraw;
        self.phase_attempted = false;
        Ok(())
    }

    fn ensure_turn(&self, player: PlayerId) -> Result<(), GameError> {
        match self.turn_phase {
            TurnPhase::GameOver => return Err(GameError::GameOver),
            TurnPhase::RoundOver => return Err(GameError::RoundOver),
            _ => {}
        }
        if player >= self.players.len() {
            return Err(GameError::InvalidPlayer(player));
        }
        if player != self.current_player {
            return Err(GameError::NotPlayersTurn);
        }
        Ok(())
    }

    fn ensure_phase(&self, allowed: impl Fn(TurnPhase) -> bool) -> Result<(), GameError> {
        if allowed(self.turn_phase) {
            Ok(())
        } else {
            Err(GameError::WrongTurnPhase {
                actual: self.turn_phase,
            })
        }
    }

    /// Turn pointer step after a Skip: the discarder goes again with two
    /// players, otherwise the next player loses their turn.
    fn skip_step(&self) -> usize {
        if self.players.len() == 2 { 0 } else { 2 }
    }

    fn advance_turn(&mut self, step: usize) {
        self.current_player = (self.current_player + step) % self.players.len();
        self.turn_phase = TurnPhase::AwaitingDraw;
        self.phase_attempted = false;
    }

    fn replenish_deck(&mut self) -> Result<(), GameError> {
        if self.discard.size() <= 1 {
            return Err(GameError::PilesExhausted);
        }
        let mut rng = self.next_rng();
        let moved = self.deck.replenish_from(&mut self.discard, &mut rng);
        debug!("deck replenished with {moved} cards from the discard pile");
        Ok(())
    }

    fn next_rng(&mut self) -> StdRng {
        let rng = shuffle_rng(self.seed, self.shuffles);
        self.shuffles += 1;
        rng
    }

    fn end_round(&mut self, round_winner: PlayerId) {
        let points = round_points(&self.players, round_winner);
        self.players[round_winner].add_score(points);
        let advanced: Vec<PlayerId> = self
            .players
            .iter_mut()
            .enumerate()
            .filter_map(|(id, player)| player.advance_phase().then_some(id))
            .collect();
        info!(
            "round {} won by {} for {points} points",
            self.round_number,
            self.players[round_winner].name()
        );
        self.last_round = Some(RoundSummary {
            round_number: self.round_number,
            winner: round_winner,
            points_awarded: points,
            advanced,
        });

        match pick_game_winner(&self.players) {
            Some(winner) => {
                self.winner = Some(winner);
                self.turn_phase = TurnPhase::GameOver;
                info!(
                    "game over after round {}: {} wins with {} points",
                    self.round_number,
                    self.players[winner].name(),
                    self.players[winner].score()
                );
            }
            None => self.turn_phase = TurnPhase::RoundOver,
        }
    }
}
