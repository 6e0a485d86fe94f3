//! The play orchestrator.
//!
//! [`Engine`] owns the committed game state, the catalog and the deck.
//! Every move is evaluated by a [`Resolver`] on an O(1) clone of the
//! state and published only when it completes:
//!
//! - on success the clone replaces the state, recorded deck operations
//!   are replayed on the deck, and the move joins the history;
//! - on failure the clone is dropped. The one exception is a card play
//!   that got past its price check: it still uses up the player's
//!   one-shot modifiers;
//! - when a player decision is needed the clone is dropped as well and
//!   the move is parked with its answers so far. [`Engine::respond`]
//!   re-evaluates it from the committed state with one more answer.
//!
//! ```
//! use terraform_engine::cards::{Card, CardKind, CardRegistry, Tag};
//! use terraform_engine::core::{Cost, EngineConfig, PlayerId, Resource};
//! use terraform_engine::deck::VecDeck;
//! use terraform_engine::engine::{Engine, Outcome};
//!
//! let mut registry = CardRegistry::new();
//! registry
//!     .register(
//!         Card::new("Mine", CardKind::Automatic, Cost::Building(4))
//!             .with_tags(&[Tag::Building])
//!             .with_own_production(Resource::Steel, 1),
//!     )
//!     .unwrap();
//!
//! let mut engine = Engine::new(EngineConfig::new(2), registry, VecDeck::new(["Mine"]));
//! let me = PlayerId::new(0);
//! engine.deal(me, 1).unwrap();
//! engine.state_mut().players[me].gain(Resource::Steel, 2);
//!
//! let outcome = engine.play_card(me, "Mine").unwrap();
//! assert!(matches!(outcome, Outcome::Committed(_)));
//! assert_eq!(engine.state().players[me].production[Resource::Steel], 1);
//! assert_eq!(engine.state().players[me].stock[Resource::Steel], 0);
//! ```

mod moves;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::board::Board;
use crate::cards::{CardKind, CardRegistry, PointsRule};
use crate::core::{
    DecisionId, EngineConfig, EngineError, GameState, InstanceId, Move, MoveRecord, PlayerId,
    Resource, StandardProject,
};
use crate::decision::{Choice, DecisionRequest, DecisionScript};
use crate::deck::{Deck, VecDeck};
use crate::effects::{DeckOp, Halt, Resolver};

/// Result of a move call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The move is in the committed state.
    Committed(MoveRecord),
    /// The move is parked until [`Engine::respond`] answers this request.
    AwaitingDecision(DecisionRequest),
}

impl Outcome {
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed(_))
    }

    /// The pending request, if the move stopped for one.
    #[must_use]
    pub fn request(&self) -> Option<&DecisionRequest> {
        match self {
            Outcome::AwaitingDecision(request) => Some(request),
            Outcome::Committed(_) => None,
        }
    }
}

/// A move parked on a decision.
#[derive(Clone, Debug)]
struct PendingMove {
    player: PlayerId,
    mv: Move,
    answers: SmallVec<[Choice; 4]>,
    request: DecisionRequest,
}

/// Game engine: committed state, catalog, deck and the pending decision.
#[derive(Clone, Debug)]
pub struct Engine<D: Deck = VecDeck> {
    config: EngineConfig,
    registry: CardRegistry,
    deck: D,
    state: GameState,
    pending: Option<PendingMove>,
    next_decision: u32,
}

impl<D: Deck> Engine<D> {
    /// Create an engine with a fresh state and an empty board.
    pub fn new(config: EngineConfig, registry: CardRegistry, deck: D) -> Self {
        let state = GameState::new(&config);
        Self {
            config,
            registry,
            deck,
            state,
            pending: None,
            next_decision: 0,
        }
    }

    /// Replace the board (builder pattern).
    #[must_use]
    pub fn with_board(mut self, board: Board) -> Self {
        self.state.board = board;
        self
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &CardRegistry {
        &self.registry
    }

    #[must_use]
    pub fn deck(&self) -> &D {
        &self.deck
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for game setup. Bypasses every rule check.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// The decision the engine is waiting for, if any.
    #[must_use]
    pub fn pending_decision(&self) -> Option<&DecisionRequest> {
        self.pending.as_ref().map(|p| &p.request)
    }

    fn ensure_idle(&self) -> Result<(), EngineError> {
        match self.pending {
            Some(_) => Err(EngineError::DecisionPending),
            None => Ok(()),
        }
    }

    /// Draw `n` cards straight into a player's hand, outside any move.
    pub fn deal(&mut self, player: PlayerId, n: usize) -> Result<(), EngineError> {
        self.ensure_idle()?;
        self.state.player(player)?;
        let cards = self.deck.draw(n)?;
        self.state.player_mut(player)?.hand.extend(cards);
        Ok(())
    }

    /// Play a card from `player`'s hand.
    pub fn play_card(&mut self, player: PlayerId, card: &str) -> Result<Outcome, EngineError> {
        self.ensure_idle()?;
        self.run(player, Move::PlayCard { card: card.to_string() }, SmallVec::new())
    }

    /// Invoke action `index` of a card `player` has in play.
    pub fn invoke_action(
        &mut self,
        player: PlayerId,
        instance: InstanceId,
        index: usize,
    ) -> Result<Outcome, EngineError> {
        self.ensure_idle()?;
        self.run(player, Move::InvokeAction { instance, index }, SmallVec::new())
    }

    /// Pay for and run a standard project.
    pub fn standard_project(
        &mut self,
        player: PlayerId,
        project: StandardProject,
    ) -> Result<Outcome, EngineError> {
        self.ensure_idle()?;
        self.run(player, Move::StandardProject(project), SmallVec::new())
    }

    /// Answer the pending decision and resume its move.
    ///
    /// A stale id or an answer outside the offered options is rejected
    /// with `InvalidChoice` and the decision stays pending.
    pub fn respond(&mut self, id: DecisionId, choice: Choice) -> Result<Outcome, EngineError> {
        let pending = self.pending.as_ref().ok_or(EngineError::NoPendingDecision)?;
        pending.request.validate(id, &choice)?;

        let PendingMove { player, mv, mut answers, .. } =
            self.pending.take().ok_or(EngineError::NoPendingDecision)?;
        answers.push(choice);
        self.run(player, mv, answers)
    }

    /// Whether `player` could play `card` now: hand, requirements and
    /// price. Never changes anything.
    pub fn can_play(&self, player: PlayerId, card: &str) -> Result<(), EngineError> {
        moves::check_play(&self.state, &self.config, &self.registry, player, card).map(|_| ())
    }

    fn run(
        &mut self,
        player: PlayerId,
        mv: Move,
        answers: SmallVec<[Choice; 4]>,
    ) -> Result<Outcome, EngineError> {
        let mut resolver = Resolver::new(
            &self.config,
            &self.registry,
            &self.deck,
            self.state.clone(),
            DecisionScript::new(answers.clone()),
        );
        let result = moves::execute(&mut resolver, player, &mv);
        let one_shots_spent = resolver.one_shots_spent();

        match result {
            Ok(()) => {
                let mut work = resolver.finish();
                let record =
                    MoveRecord::new(player, mv, work.state.generation).with_choices(&answers);
                work.state.history.push_back(record.clone());
                self.replay_deck(&work.deck_ops)?;
                self.state = work.state;
                debug!(
                    player = %player,
                    mv = ?record.mv,
                    choices = record.choices.len(),
                    "move committed"
                );
                Ok(Outcome::Committed(record))
            }
            Err(Halt::Decision(question)) => {
                let id = DecisionId::new(self.next_decision);
                self.next_decision += 1;
                let request = DecisionRequest::new(id, question);
                trace!(
                    decision = %id,
                    player = %request.player,
                    purpose = ?request.purpose,
                    "awaiting decision"
                );
                self.pending = Some(PendingMove {
                    player,
                    mv,
                    answers,
                    request: request.clone(),
                });
                Ok(Outcome::AwaitingDecision(request))
            }
            Err(Halt::Failed(err)) => {
                if one_shots_spent {
                    self.state.modifiers.take_one_shots(player);
                }
                debug!(player = %player, mv = ?mv, error = %err, "move rejected");
                Err(err)
            }
        }
    }

    fn replay_deck(&mut self, ops: &[DeckOp]) -> Result<(), EngineError> {
        for op in ops {
            match op {
                DeckOp::Take(cards) => {
                    let drawn = self.deck.draw(cards.len())?;
                    if &drawn != cards {
                        return Err(EngineError::Internal(format!(
                            "deck changed under evaluation: peeked {cards:?}, drew {drawn:?}"
                        )));
                    }
                }
                DeckOp::Discard(cards) => self.deck.discard(cards.clone()),
                DeckOp::Buy(card, price) => self.deck.buy(card, *price),
            }
        }
        Ok(())
    }

    /// Production phase and generation change.
    ///
    /// Energy turns into heat, each player gains terraform rating plus
    /// Megacredit production (never below zero in total), then every other
    /// production. One-shot modifiers and used actions reset.
    pub fn advance_generation(&mut self) -> Result<(), EngineError> {
        self.ensure_idle()?;
        let mut state = self.state.clone();

        for (_, player) in state.players.iter_mut() {
            let energy = player.stock[Resource::Energy];
            player.stock[Resource::Energy] = 0;
            player.gain(Resource::Heat, energy);

            let income = i64::from(player.stock[Resource::Megacredits])
                + i64::from(player.terraform_rating)
                + i64::from(player.production[Resource::Megacredits]);
            player.stock[Resource::Megacredits] = u32::try_from(income.max(0)).unwrap_or(u32::MAX);

            for resource in Resource::ALL {
                if resource != Resource::Megacredits {
                    let produced = u32::try_from(player.production[resource]).unwrap_or(0);
                    player.gain(resource, produced);
                }
            }
            player.used_actions = Default::default();
        }

        state.modifiers.clear_one_shots();
        state.generation += 1;
        self.state = state;
        debug!(generation = self.state.generation, "generation advanced");
        Ok(())
    }

    /// Victory points one card in play is worth right now.
    pub fn card_points(&self, instance: InstanceId) -> Result<i32, EngineError> {
        let in_play = self.state.instance(instance)?;
        let card = self.registry.get(&in_play.card)?;
        let earned = match card.points {
            None => return Ok(0),
            Some(PointsRule::Immediate(n)) => return Ok(n),
            Some(PointsRule::PerTag(points, per, tag)) => {
                let owner = self.state.player(in_play.owner)?;
                (owner.tag_count(tag) / per.max(1)).saturating_mul(points)
            }
            Some(PointsRule::PerCardResource(points, per, kind)) => {
                (in_play.count(kind) / per.max(1)).saturating_mul(points)
            }
            Some(PointsRule::PerCity(points)) => self.state.board.cities().saturating_mul(points),
            Some(PointsRule::PerNCities(per)) => self.state.board.cities() / per.max(1),
            Some(PointsRule::IfAnyCardResource(points, kind)) => {
                if in_play.count(kind) > 0 {
                    points
                } else {
                    0
                }
            }
        };
        Ok(i32::try_from(earned).unwrap_or(i32::MAX))
    }

    /// Sum of [`Engine::card_points`] over `player`'s cards in play.
    pub fn points_from_cards(&self, player: PlayerId) -> Result<i32, EngineError> {
        self.state
            .player(player)?
            .played
            .iter()
            .map(|&id| self.card_points(id))
            .sum()
    }

    /// Take a card out of play with its counters, listeners, standing
    /// modifiers and tags. The card goes to the discard pile.
    pub fn remove_from_play(&mut self, instance: InstanceId) -> Result<(), EngineError> {
        self.ensure_idle()?;
        let removed = self.state.instance(instance)?.clone();
        let card = self.registry.get(&removed.card)?;

        let mut state = self.state.clone();
        state.instances.remove(&instance);
        let owner = state.player_mut(removed.owner)?;
        owner.played.retain(|&id| id != instance);
        if card.kind != CardKind::Event {
            for &tag in &card.tags {
                owner.remove_tag(tag);
            }
        }
        let stale: Vec<_> =
            owner.used_actions.iter().filter(|(id, _)| *id == instance).copied().collect();
        for key in stale {
            owner.used_actions.remove(&key);
        }
        let listeners = state.triggers.remove_for_source(instance);
        state.modifiers.remove_for_source(instance);

        self.state = state;
        self.deck.discard(vec![removed.card]);
        debug!(instance = %instance, listeners, "card removed from play");
        Ok(())
    }
}
