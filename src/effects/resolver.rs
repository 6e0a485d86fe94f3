//! Effect resolution - evaluating card language on a working state.
//!
//! The [`Resolver`] owns a [`Working`] copy of the game state for the
//! duration of one move. Evaluation either completes, fails, or stops
//! at a [`Question`] the player must answer; see [`Halt`]. The engine
//! publishes the working state only when the whole move completes.
//!
//! ## Atomicity
//!
//! Every leaf is a pure `check_*` function over `&GameState` followed by
//! an apply step run immediately after the check succeeds. Composites use
//! [`Resolver::atomically`], which snapshots the working state (an O(1)
//! `im` clone) and restores it on failure. That is what makes `Chained`
//! all-or-nothing and lets a failing trigger be skipped without leaving
//! a trace.
//!
//! ## Deck access
//!
//! The resolver only peeks at the deck. Cards taken during evaluation are
//! tracked with a cursor and recorded as [`DeckOp`]s, which the engine
//! replays against the real deck on commit.

use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::board::{AreaRule, Board, PlacedTile, PlacementBonus, TileKind};
use crate::cards::CardRegistry;
use crate::core::{
    AreaId, CardResource, Cost, DeckExhaustionPolicy, EngineConfig, EngineError, GameState,
    GlobalParameters, InstanceId, MissingTargetPolicy, PlayerId, PlayerState, Resource, Shortfall,
};
use crate::decision::{Choice, DecisionScript, Options, Purpose, Question};
use crate::deck::Deck;
use crate::rules::{plan_payment, MetalValues, ModifierKind, Payment};
use crate::triggers::GameEvent;

use super::effect::Effect;
use super::targeting::{self, TargetScan};

/// Why evaluation stopped early.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Halt {
    /// The move is illegal; the working state has been abandoned.
    Failed(EngineError),
    /// A player must answer before evaluation can continue.
    Decision(Question),
}

impl From<EngineError> for Halt {
    fn from(err: EngineError) -> Self {
        Halt::Failed(err)
    }
}

/// Result of one evaluation step.
pub type Step<T = ()> = Result<T, Halt>;

/// A deck mutation to replay on commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeckOp {
    /// Cards removed from the top, in order.
    Take(Vec<String>),
    Discard(Vec<String>),
    Buy(String, u32),
}

/// Who is acting, and on behalf of which card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub player: PlayerId,
    /// The card the effect belongs to; `None` for standard projects.
    pub source: Option<InstanceId>,
}

impl Frame {
    #[must_use]
    pub fn new(player: PlayerId, source: Option<InstanceId>) -> Self {
        Self { player, source }
    }

    fn source(&self) -> Result<InstanceId, EngineError> {
        self.source
            .ok_or_else(|| EngineError::InvalidTarget("effect has no source card".to_string()))
    }
}

/// Everything a move may change, snapshotted together.
#[derive(Clone, Debug)]
pub struct Working {
    pub state: GameState,
    pub deck_ops: Vec<DeckOp>,
    deck_cursor: usize,
    /// Area of the most recent tile placement.
    last_area: Option<AreaId>,
}

impl Working {
    #[must_use]
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            deck_ops: Vec::new(),
            deck_cursor: 0,
            last_area: None,
        }
    }
}

// === Pure checks ===

/// How `player` would pay `cost` right now.
pub fn check_spend(
    state: &GameState,
    config: &EngineConfig,
    player: PlayerId,
    cost: Cost,
) -> Result<Payment, EngineError> {
    let payer = state.player(player)?;
    plan_payment(cost, &payer.stock, metal_values(state, config, player), config.payment)
}

/// Whether `player`'s `resource` production can move by `delta`.
pub fn check_production_change(
    state: &GameState,
    config: &EngineConfig,
    player: PlayerId,
    resource: Resource,
    delta: i32,
) -> Result<(), EngineError> {
    let current = state.player(player)?.production[resource];
    let floor = config.production_floor(resource);
    if current + delta < floor {
        return Err(EngineError::InsufficientResources {
            what: Shortfall::Production(resource),
            needed: i64::from(-delta),
            available: i64::from(current - floor),
        });
    }
    Ok(())
}

/// Whether the card holds `amount` of `kind`.
pub fn check_card_spend(
    state: &GameState,
    card: InstanceId,
    kind: CardResource,
    amount: u32,
) -> Result<(), EngineError> {
    let available = state.instance(card)?.count(kind);
    if available < amount {
        return Err(EngineError::InsufficientResources {
            what: Shortfall::CardResource(kind),
            needed: amount.into(),
            available: available.into(),
        });
    }
    Ok(())
}

/// Amount a transform would convert; at least one unit is required.
pub fn check_transform(player: &PlayerState, from: Resource) -> Result<u32, EngineError> {
    match player.stock[from] {
        0 => Err(EngineError::short_of(from, 1u32, 0u32)),
        n => Ok(n),
    }
}

/// Whether the hand holds `n` cards to discard.
pub fn check_discard(player: &PlayerState, n: u32) -> Result<(), EngineError> {
    if (player.hand.len() as u64) < u64::from(n) {
        return Err(EngineError::InvalidTarget(format!(
            "cannot discard {n} from a hand of {}",
            player.hand.len()
        )));
    }
    Ok(())
}

/// Empty areas a tile may go to; at least one is required.
pub fn check_placement(
    board: &Board,
    tile: TileKind,
    rule: &AreaRule,
) -> Result<Vec<AreaId>, EngineError> {
    let legal = board.legal_areas(rule);
    if legal.is_empty() {
        return Err(EngineError::InvalidTarget(format!("no free area for {tile:?} ({rule:?})")));
    }
    Ok(legal)
}

/// The metal the last placement's area bonus paid out.
pub fn check_mining_bonus(
    board: &Board,
    last_area: Option<AreaId>,
) -> Result<Resource, EngineError> {
    let area =
        last_area.ok_or_else(|| EngineError::InvalidTarget("no tile placed yet".to_string()))?;
    board
        .area(area)?
        .metal_bonus()
        .ok_or_else(|| EngineError::InvalidTarget(format!("{area} has no metal bonus")))
}

/// Metal values for `player`, base plus standing bonuses.
#[must_use]
pub fn metal_values(state: &GameState, config: &EngineConfig, player: PlayerId) -> MetalValues {
    let bonus = state.modifiers.metals_bonus(player);
    MetalValues {
        steel: config.steel_value + bonus,
        titanium: config.titanium_value + bonus,
    }
}

/// Evaluates effects for one move.
pub struct Resolver<'a, D: Deck + ?Sized> {
    config: &'a EngineConfig,
    registry: &'a CardRegistry,
    deck: &'a D,
    script: DecisionScript,
    work: Working,
    one_shots_spent: bool,
}

impl<'a, D: Deck + ?Sized> Resolver<'a, D> {
    pub fn new(
        config: &'a EngineConfig,
        registry: &'a CardRegistry,
        deck: &'a D,
        state: GameState,
        script: DecisionScript,
    ) -> Self {
        Self {
            config,
            registry,
            deck,
            script,
            work: Working::new(state),
            one_shots_spent: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &'a EngineConfig {
        self.config
    }

    #[must_use]
    pub fn registry(&self) -> &'a CardRegistry {
        self.registry
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.work.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.work.state
    }

    /// Note that the move got past its price check and used up the
    /// player's one-shot modifiers.
    pub fn mark_one_shots_spent(&mut self) {
        self.one_shots_spent = true;
    }

    #[must_use]
    pub fn one_shots_spent(&self) -> bool {
        self.one_shots_spent
    }

    /// Hand back the working state.
    #[must_use]
    pub fn finish(self) -> Working {
        self.work
    }

    /// Run `f`; on failure restore the state as it was before.
    pub fn atomically<T>(&mut self, f: impl FnOnce(&mut Self) -> Step<T>) -> Step<T> {
        let snapshot = self.work.clone();
        let result = f(self);
        if matches!(result, Err(Halt::Failed(_))) {
            self.work = snapshot;
        }
        result
    }

    /// Evaluate a list left to right as one atomic chain.
    pub fn chain(&mut self, frame: Frame, effects: &[Effect]) -> Step {
        self.atomically(|r| effects.iter().try_for_each(|e| r.evaluate(frame, e)))
    }

    /// Get an answer: forced, scripted, or asked for.
    pub fn decide(&mut self, player: PlayerId, purpose: Purpose, options: Options) -> Step<Choice> {
        if options.is_empty() {
            let what = format!("nothing to choose for {purpose:?}");
            return Err(EngineError::InvalidChoice(what).into());
        }
        if let Some(choice) = options.forced() {
            return Ok(choice);
        }
        match self.script.next_answer() {
            Some(choice) => {
                options.validate(&choice)?;
                Ok(choice)
            }
            None => {
                trace!(player = %player, purpose = ?purpose, "decision needed");
                Err(Halt::Decision(Question {
                    player,
                    purpose,
                    options,
                }))
            }
        }
    }

    fn decide_player(
        &mut self,
        player: PlayerId,
        purpose: Purpose,
        candidates: Vec<PlayerId>,
    ) -> Step<PlayerId> {
        match self.decide(player, purpose, Options::Players(candidates))? {
            Choice::Player(p) => Ok(p),
            other => Err(mismatch(other)),
        }
    }

    fn decide_card(
        &mut self,
        player: PlayerId,
        purpose: Purpose,
        candidates: Vec<InstanceId>,
    ) -> Step<InstanceId> {
        match self.decide(player, purpose, Options::Cards(candidates))? {
            Choice::Card(c) => Ok(c),
            other => Err(mismatch(other)),
        }
    }

    fn decide_pick(
        &mut self,
        player: PlayerId,
        purpose: Purpose,
        items: Vec<String>,
        min: usize,
        max: usize,
    ) -> Step<Vec<usize>> {
        match self.decide(player, purpose, Options::Pick { items, min, max })? {
            Choice::Pick(mut picked) => {
                picked.sort_unstable();
                Ok(picked)
            }
            other => Err(mismatch(other)),
        }
    }

    /// Take up to `n` cards off the top, honouring the exhaustion policy.
    pub fn take_from_deck(&mut self, n: u32) -> Step<Vec<String>> {
        let n = n as usize;
        let cursor = self.work.deck_cursor;
        let visible = self.deck.peek(cursor + n);
        let available = visible.len().saturating_sub(cursor);
        if available < n && self.config.deck_exhaustion == DeckExhaustionPolicy::Fail {
            return Err(EngineError::DeckExhausted { requested: n, available }.into());
        }

        let cards: Vec<String> = visible.into_iter().skip(cursor).collect();
        self.work.deck_cursor += cards.len();
        if !cards.is_empty() {
            self.work.deck_ops.push(DeckOp::Take(cards.clone()));
        }
        Ok(cards)
    }

    fn draw_into_hand(&mut self, player: PlayerId, n: u32) -> Step {
        let cards = self.take_from_deck(n)?;
        self.work.state.player_mut(player)?.hand.extend(cards);
        Ok(())
    }

    fn discard_to_deck(&mut self, cards: Vec<String>) {
        if !cards.is_empty() {
            self.work.deck_ops.push(DeckOp::Discard(cards));
        }
    }

    /// Register a standing node for the card `source`.
    pub fn register_standing(
        &mut self,
        owner: PlayerId,
        source: InstanceId,
        effect: &Effect,
    ) -> Step {
        let state = &mut self.work.state;
        match effect {
            Effect::OnOwnTagPlayed(tag, inner) => {
                state.triggers.register(owner, source, *tag, (**inner).clone());
            }
            other => {
                let kind = ModifierKind::from_effect(other).ok_or_else(|| {
                    EngineError::Internal(format!("{other:?} is not a standing effect"))
                })?;
                state.modifiers.add_standing(owner, source, kind);
            }
        }
        Ok(())
    }

    /// Run every listener matching `event`. Failing listeners are skipped.
    pub fn fire(&mut self, event: GameEvent) -> Step {
        let listeners = self.work.state.triggers.find_listeners(&event);
        for listener in listeners {
            // An earlier listener may have removed this one's card.
            if self.work.state.triggers.get(listener.id).is_none() {
                continue;
            }
            trace!(listener = %listener.id, source = %listener.source, event = ?event, "trigger");
            let frame = Frame::new(listener.owner, Some(listener.source));
            match self.atomically(|r| r.evaluate(frame, &listener.effect)) {
                Ok(()) => {}
                Err(Halt::Failed(err)) => {
                    warn!(
                        listener = %listener.id,
                        source = %listener.source,
                        error = %err,
                        "trigger skipped"
                    );
                }
                Err(decision) => return Err(decision),
            }
        }
        Ok(())
    }

    /// Apply a production delta chosen for some player.
    pub fn change_production(&mut self, player: PlayerId, resource: Resource, delta: i32) -> Step {
        check_production_change(&self.work.state, self.config, player, resource, delta)?;
        self.work.state.player_mut(player)?.production[resource] += delta;
        Ok(())
    }

    /// Let the actor pick whose production takes `delta`.
    pub fn change_any_production(
        &mut self,
        player: PlayerId,
        resource: Resource,
        delta: i32,
    ) -> Step {
        let candidates =
            targeting::production_targets(&self.work.state, self.config, resource, delta);
        if candidates.is_empty() {
            return Err(EngineError::InvalidTarget(format!(
                "no player can take {delta} {resource} production"
            ))
            .into());
        }
        let target = self.decide_player(player, Purpose::ProductionTarget(resource), candidates)?;
        self.change_production(target, resource, delta)
    }

    /// Evaluate one effect for `frame`.
    pub fn evaluate(&mut self, frame: Frame, effect: &Effect) -> Step {
        let player = frame.player;

        match effect {
            // === Resources, production, rating ===

            Effect::GainResource(resource, n) => {
                self.work.state.player_mut(player)?.gain(*resource, *n);
            }

            Effect::SpendResource(cost, then) => {
                let payment = check_spend(&self.work.state, self.config, player, *cost)?;
                self.atomically(|r| {
                    payment.apply(r.work.state.player_mut(player)?)?;
                    r.chain(frame, then)
                })?;
            }

            Effect::SpendResourceFromSameCard(kind, n, then) => {
                let source = frame.source()?;
                check_card_spend(&self.work.state, source, *kind, *n)?;
                self.atomically(|r| {
                    r.work.state.instance_mut(source)?.remove(*kind, *n)?;
                    r.chain(frame, then)
                })?;
            }

            Effect::SpendProduction(resource, n, then) => {
                let delta = -(*n as i32);
                check_production_change(&self.work.state, self.config, player, *resource, delta)?;
                self.atomically(|r| {
                    r.work.state.player_mut(player)?.production[*resource] += delta;
                    r.chain(frame, then)
                })?;
            }

            Effect::ChangeProduction(resource, delta) => {
                self.change_production(player, *resource, *delta)?;
            }

            Effect::RaiseTerraformRating(n) => {
                self.work.state.player_mut(player)?.terraform_rating += n;
            }

            Effect::TransformResource(from, to) => {
                let actor = self.work.state.player_mut(player)?;
                let amount = check_transform(actor, *from)?;
                actor.stock[*from] = 0;
                actor.gain(*to, amount);
            }

            Effect::GainProductionPerOwnTag(tag, per, resource, amount) => {
                let count = self.work.state.player(player)?.tag_count(*tag);
                self.gain_production_per(player, count, *per, *resource, *amount)?;
            }

            Effect::GainProductionPerOpponentTag(tag, per, resource, amount) => {
                let count = self
                    .work
                    .state
                    .players
                    .iter()
                    .filter(|&(id, _)| id != player)
                    .map(|(_, p)| p.tag_count(*tag))
                    .sum();
                self.gain_production_per(player, count, *per, *resource, *amount)?;
            }

            Effect::GainProductionPerAnyTag(tag, per, resource, amount) => {
                let count = self.work.state.players.iter().map(|(_, p)| p.tag_count(*tag)).sum();
                self.gain_production_per(player, count, *per, *resource, *amount)?;
            }

            Effect::GainTerraformRatingPerOwnTag(per, tag, amount) => {
                let actor = self.work.state.player_mut(player)?;
                let gained = actor.tag_count(*tag) / (*per).max(1) * amount;
                actor.terraform_rating += gained;
            }

            Effect::GainResourcePerCity(resource, n) => {
                let gained = self.work.state.board.cities().saturating_mul(*n);
                self.work.state.player_mut(player)?.gain(*resource, gained);
            }

            Effect::GainResourcePerCityOnMars(resource, n) => {
                let gained = self.work.state.board.cities_on_mars().saturating_mul(*n);
                self.work.state.player_mut(player)?.gain(*resource, gained);
            }

            Effect::GainProductionPerCity(resource, n) => {
                let cities = self.work.state.board.cities();
                self.gain_production_per(player, cities, 1, *resource, *n)?;
            }

            Effect::GainProductionPerCityOnMars(resource, n) => {
                let cities = self.work.state.board.cities_on_mars();
                self.gain_production_per(player, cities, 1, *resource, *n)?;
            }

            Effect::CopyProductionOfCard(tag) => {
                let registry = self.registry;
                let candidates = targeting::production_boxes(
                    &self.work.state,
                    registry,
                    self.config,
                    player,
                    *tag,
                    frame.source,
                )?;
                if candidates.is_empty() {
                    let what = format!("no {tag} card with production to copy");
                    return Err(EngineError::InvalidTarget(what).into());
                }
                let copied = self.decide_card(player, Purpose::CopyProduction, candidates)?;
                let card = registry.get(&self.work.state.instance(copied)?.card)?;
                for (&resource, &delta) in &card.own_production {
                    self.change_production(player, resource, delta)?;
                }
            }

            // === Global parameters and tiles ===

            Effect::RaiseTemperature(steps) => {
                let raised = self.work.state.globals.raise_temperature(*steps);
                self.work.state.player_mut(player)?.terraform_rating += raised;
            }

            Effect::RaiseOxygen(steps) => {
                let raised = self.work.state.globals.raise_oxygen(*steps);
                self.work.state.player_mut(player)?.terraform_rating += raised;
            }

            Effect::PlaceOcean => {
                if self.work.state.globals.oceans >= GlobalParameters::MAX_OCEANS {
                    trace!(player = %player, "all oceans placed");
                    return Ok(());
                }
                self.place_tile(player, TileKind::Ocean, None, &AreaRule::OceanArea)?;
                let placed = self.work.state.globals.add_ocean();
                self.work.state.player_mut(player)?.terraform_rating += placed;
            }

            Effect::PlaceGreenery => {
                self.place_tile(player, TileKind::Greenery, Some(player), &AreaRule::Land)?;
                let raised = self.work.state.globals.raise_oxygen(1);
                self.work.state.player_mut(player)?.terraform_rating += raised;
            }

            Effect::PlaceCity(city, rule) => {
                self.place_tile(player, TileKind::City(*city), Some(player), rule)?;
            }

            Effect::PlaceSpecialTile(tile, rule) => {
                self.place_tile(player, TileKind::Special(*tile), Some(player), rule)?;
            }

            Effect::GainMiningProductionMatchingPlacementBonus(n) => {
                let metal = check_mining_bonus(&self.work.state.board, self.work.last_area)?;
                self.work.state.player_mut(player)?.production[metal] += *n as i32;
            }

            // === Cards and deck ===

            Effect::DrawCard(n) => self.draw_into_hand(player, *n)?,

            Effect::DiscardCard(n) => {
                let actor = self.work.state.player(player)?;
                check_discard(actor, *n)?;
                let hand: Vec<String> = actor.hand.iter().cloned().collect();
                let n = *n as usize;
                let picked = self.decide_pick(player, Purpose::DiscardFromHand, hand, n, n)?;

                let actor = self.work.state.player_mut(player)?;
                let mut discarded = Vec::with_capacity(picked.len());
                for &index in picked.iter().rev() {
                    discarded.push(actor.hand.remove(index));
                }
                discarded.reverse();
                self.discard_to_deck(discarded);
            }

            Effect::LookAndTakeFromDeck(look, take) => {
                let cards = self.take_from_deck(*look)?;
                let keep = (*take as usize).min(cards.len());
                let picked =
                    self.decide_pick(player, Purpose::TakeFromDeck, cards.clone(), keep, keep)?;
                let (kept, rest) = split_picked(cards, &picked);
                self.work.state.player_mut(player)?.hand.extend(kept);
                self.discard_to_deck(rest);
            }

            Effect::LookAndBuyFromDeck(n) => {
                let cards = self.take_from_deck(*n)?;
                let price = self.config.card_purchase_cost;
                let money = self.work.state.player(player)?.stock[Resource::Megacredits];
                let affordable = match price {
                    0 => cards.len(),
                    p => cards.len().min((money / p) as usize),
                };
                let picked =
                    self.decide_pick(player, Purpose::BuyFromDeck, cards.clone(), 0, affordable)?;
                let (bought, rest) = split_picked(cards, &picked);

                let actor = self.work.state.player_mut(player)?;
                actor.spend(Resource::Megacredits, price * bought.len() as u32)?;
                actor.hand.extend(bought.iter().cloned());
                for card in bought {
                    self.work.deck_ops.push(DeckOp::Buy(card, price));
                }
                self.discard_to_deck(rest);
            }

            Effect::RevealAndCheckTag(tag, then) => {
                let mut revealed = self.take_from_deck(1)?;
                let Some(card) = revealed.pop() else {
                    trace!(player = %player, "nothing to reveal");
                    return Ok(());
                };
                let hit = self.registry.get(&card)?.has_tag(*tag);
                self.discard_to_deck(vec![card]);
                if hit {
                    self.chain(frame, then)?;
                }
            }

            // === Per-card resources ===

            Effect::AddResourceToSameCard(kind, n) => {
                let source = frame.source()?;
                self.work.state.instance_mut(source)?.add(*kind, *n);
            }

            Effect::AddResourceToPlayedCard(kind, n) => {
                let candidates = targeting::storing_cards(&self.work.state, player, *kind);
                self.add_to_chosen_card(player, *kind, *n, candidates)?;
            }

            Effect::AddResourceToAnotherCard(kind, n) => {
                let mut candidates = targeting::storing_cards(&self.work.state, player, *kind);
                candidates.retain(|&card| Some(card) != frame.source);
                self.add_to_chosen_card(player, *kind, *n, candidates)?;
            }

            Effect::AddResourceToAnyCardWithExistingResource(min, n) => {
                let candidates = targeting::cards_holding(&self.work.state, player, *min);
                if candidates.is_empty() {
                    trace!(player = %player, "no card holds resources");
                    return Ok(());
                }
                let card = self.decide_card(player, Purpose::AddToCard, candidates)?;
                let instance = self.work.state.instance_mut(card)?;
                let kind = instance
                    .stores
                    .or_else(|| {
                        let mut counters = instance.counters().into_iter();
                        counters.find(|&(_, c)| c > 0).map(|(k, _)| k)
                    })
                    .ok_or_else(|| EngineError::Internal(format!("{card} holds no resource")))?;
                instance.add(kind, *n);
            }

            Effect::StealResource(resource, n) => {
                let scan = targeting::steal_targets(&self.work.state, player, *resource);
                let purpose = Purpose::StealFrom(*resource);
                let Some(victim) = self.pick_player(player, purpose, scan, *resource)? else {
                    return Ok(());
                };
                let state = &mut self.work.state;
                let taken = (*n).min(state.player(victim)?.stock[*resource]);
                state.player_mut(victim)?.spend(*resource, taken)?;
                state.player_mut(player)?.gain(*resource, taken);
            }

            Effect::DestroyAnyResource(resource, n) => {
                let scan = targeting::stock_destroy_targets(&self.work.state, player, *resource);
                let purpose = Purpose::DestroyStock(*resource);
                let Some(victim) = self.pick_player(player, purpose, scan, *resource)? else {
                    return Ok(());
                };
                let victim = self.work.state.player_mut(victim)?;
                let removed = (*n).min(victim.stock[*resource]);
                victim.spend(*resource, removed)?;
            }

            Effect::DestroyAnyCardResource(kind, n) => {
                let scan = targeting::card_destroy_targets(&self.work.state, player, *kind);
                if scan.is_empty() {
                    return self.no_target(&scan, format!("no card with {kind} to remove"));
                }
                let purpose = Purpose::DestroyCardResource(*kind);
                let card = self.decide_card(player, purpose, scan.eligible)?;
                self.work.state.instance_mut(card)?.remove_up_to(*kind, *n);
            }

            // === Composites ===

            Effect::OneOf(branches) => {
                let options = Options::Branches(branches.len());
                let choice = self.decide(player, Purpose::ChooseBranch, options)?;
                let Choice::Branch(index) = choice else {
                    return Err(mismatch(choice));
                };
                let branch = branches
                    .get(index)
                    .ok_or_else(|| EngineError::InvalidChoice(format!("branch {index}")))?;
                self.atomically(|r| r.evaluate(frame, branch))?;
            }

            Effect::Chained(effects) => self.chain(frame, effects)?,

            Effect::CauseFreeImpact(inner) => self.evaluate(frame, inner)?,

            // === Standing ===

            Effect::CardDiscountForTag(..)
            | Effect::AnyCardDiscount(_)
            | Effect::OnOwnTagPlayed(..)
            | Effect::CannotRemoveAnyCardResources(_)
            | Effect::CannotRemoveThisCardResource(_)
            | Effect::IncreasedMetalsValue(_)
            | Effect::RebateForStandardProjects(_)
            | Effect::GlobalRequirementsTolerance(_) => {
                let source = frame.source()?;
                self.register_standing(player, source, effect)?;
            }
        }
        Ok(())
    }

    fn gain_production_per(
        &mut self,
        player: PlayerId,
        count: u32,
        per: u32,
        resource: Resource,
        amount: u32,
    ) -> Step {
        let gained = (count / per.max(1)).saturating_mul(amount);
        let gained = i32::try_from(gained).unwrap_or(i32::MAX);
        let production = &mut self.work.state.player_mut(player)?.production[resource];
        *production = production.saturating_add(gained);
        Ok(())
    }

    fn add_to_chosen_card(
        &mut self,
        player: PlayerId,
        kind: CardResource,
        n: u32,
        candidates: Vec<InstanceId>,
    ) -> Step {
        if candidates.is_empty() {
            trace!(player = %player, kind = %kind, "no card stores this resource");
            return Ok(());
        }
        let card = self.decide_card(player, Purpose::AddToCard, candidates)?;
        self.work.state.instance_mut(card)?.add(kind, n);
        Ok(())
    }

    fn place_tile(
        &mut self,
        player: PlayerId,
        kind: TileKind,
        owner: Option<PlayerId>,
        rule: &AreaRule,
    ) -> Step {
        let legal = check_placement(&self.work.state.board, kind, rule)?;
        let area = match self.decide(player, Purpose::PlaceTile(kind), Options::Areas(legal))? {
            Choice::Area(area) => area,
            other => return Err(mismatch(other)),
        };

        let bonus: SmallVec<[PlacementBonus; 2]> =
            self.work.state.board.place(area, rule, PlacedTile { kind, owner })?;
        self.work.last_area = Some(area);

        for reward in bonus {
            match reward {
                PlacementBonus::Resource(resource, n) => {
                    self.work.state.player_mut(player)?.gain(resource, n);
                }
                PlacementBonus::Cards(n) => self.draw_into_hand(player, n)?,
            }
        }
        Ok(())
    }

    /// Choose a player from a scan, or apply the missing-target policy.
    fn pick_player(
        &mut self,
        player: PlayerId,
        purpose: Purpose,
        scan: TargetScan<PlayerId>,
        resource: Resource,
    ) -> Step<Option<PlayerId>> {
        if scan.is_empty() {
            self.no_target(&scan, format!("no player with {resource} to remove"))?;
            return Ok(None);
        }
        self.decide_player(player, purpose, scan.eligible).map(Some)
    }

    fn no_target<T>(&self, scan: &TargetScan<T>, what: String) -> Step {
        match self.config.missing_target {
            MissingTargetPolicy::Skip => {
                trace!(reason = %what, "removal skipped");
                Ok(())
            }
            MissingTargetPolicy::Reject => Err(scan.missing(what).into()),
        }
    }
}

/// Split `cards` into the picked indices (sorted) and the rest.
fn split_picked(cards: Vec<String>, picked: &[usize]) -> (Vec<String>, Vec<String>) {
    let mut chosen = Vec::with_capacity(picked.len());
    let mut rest = Vec::new();
    for (index, card) in cards.into_iter().enumerate() {
        if picked.binary_search(&index).is_ok() {
            chosen.push(card);
        } else {
            rest.push(card);
        }
    }
    (chosen, rest)
}

fn mismatch(choice: Choice) -> Halt {
    Halt::Failed(EngineError::Internal(format!("validated answer has wrong shape: {choice:?}")))
}
