//! Move pipelines, evaluated inside a [`Resolver`].
//!
//! Each pipeline runs its pure checks first. Nothing is written before
//! they pass, so a rejected move leaves even the one-shot queue alone.

use crate::board::{AreaRule, CityKind};
use crate::cards::{Card, CardInstance, CardKind, CardRegistry};
use crate::core::{
    ActionUsePolicy, Cost, EngineConfig, EngineError, GameState, GlobalParameters, InstanceId, Move,
    PlayerId, Resource, StandardProject,
};
use crate::deck::Deck;
use crate::effects::{check_spend, metal_values, Effect, Frame, Resolver, Step};
use crate::rules::{check_requirements, effective_cost, plan_payment, ModifierKind, Payment};
use crate::triggers::GameEvent;

pub(crate) fn execute<D: Deck + ?Sized>(
    r: &mut Resolver<'_, D>,
    player: PlayerId,
    mv: &Move,
) -> Step {
    match mv {
        Move::PlayCard { card } => play_card(r, player, card),
        Move::InvokeAction { instance, index } => invoke_action(r, player, *instance, *index),
        Move::StandardProject(project) => standard_project(r, player, *project),
    }
}

/// Hand, requirements, price and payment for a play. Pure.
pub(crate) fn check_play<'a>(
    state: &GameState,
    config: &EngineConfig,
    registry: &'a CardRegistry,
    player: PlayerId,
    name: &str,
) -> Result<(&'a Card, Payment), EngineError> {
    let card = registry.get(name)?;
    let actor = state.player(player)?;
    if !actor.holds(name) {
        return Err(EngineError::CardNotInHand(name.to_string()));
    }

    check_requirements(&card.requirements, player, state, state.modifiers.tolerance(player))?;

    let price = effective_cost(card.cost.amount(), state.modifiers.discount(player, card));
    let payment = plan_payment(
        card.cost.with_amount(price),
        &actor.stock,
        metal_values(state, config, player),
        config.payment,
    )?;
    Ok((card, payment))
}

fn play_card<D: Deck + ?Sized>(r: &mut Resolver<'_, D>, player: PlayerId, name: &str) -> Step {
    let (card, payment) = check_play(r.state(), r.config(), r.registry(), player, name)?;

    // Past the price check: this attempt uses up the one-shots, win or lose.
    r.mark_one_shots_spent();
    let state = r.state_mut();
    state.modifiers.take_one_shots(player);

    let actor = state.player_mut(player)?;
    actor.take_from_hand(name);
    payment.apply(actor)?;

    let id = state.alloc_instance();
    state.add_instance(CardInstance::new(id, name, player).storing(card.card_resource()));

    for (&resource, &delta) in &card.own_production {
        r.change_production(player, resource, delta)?;
    }
    for (&resource, &delta) in &card.any_production {
        r.change_any_production(player, resource, delta)?;
    }

    r.chain(Frame::new(player, Some(id)), &card.immediate_impacts)?;

    for effect in &card.effects {
        r.register_standing(player, id, effect)?;
    }
    for effect in &card.next_card_this_generation_effects {
        let kind = ModifierKind::from_effect(effect).ok_or_else(|| {
            EngineError::Internal(format!("{effect:?} cannot apply to the next card"))
        })?;
        r.state_mut().modifiers.queue_one_shot(player, kind);
    }

    if card.kind != CardKind::Event {
        let actor = r.state_mut().player_mut(player)?;
        for &tag in &card.tags {
            actor.add_tag(tag);
        }
    }

    for event in GameEvent::for_tags(player, id, &card.tags) {
        r.fire(event)?;
    }
    Ok(())
}

fn invoke_action<D: Deck + ?Sized>(
    r: &mut Resolver<'_, D>,
    player: PlayerId,
    instance: InstanceId,
    index: usize,
) -> Step {
    let in_play = r.state().instance(instance)?;
    if in_play.owner != player {
        let what = format!("{instance} is not owned by {player}");
        return Err(EngineError::InvalidTarget(what).into());
    }
    let card = r.registry().get(&in_play.card)?;
    let action = card.actions.get(index).ok_or_else(|| EngineError::NoSuchAction {
        card: card.name.clone(),
        index,
    })?;

    let used = r.state().player(player)?.used_actions.contains(&(instance, index));
    if used && r.config().action_use == ActionUsePolicy::OncePerGeneration {
        return Err(EngineError::ActionAlreadyUsed { instance, index }.into());
    }

    r.chain(Frame::new(player, Some(instance)), std::slice::from_ref(action))?;
    r.state_mut().player_mut(player)?.used_actions.insert((instance, index));
    Ok(())
}

/// What a standard project does once paid for.
pub(crate) fn project_effect(project: StandardProject) -> Effect {
    match project {
        StandardProject::PowerPlant => Effect::ChangeProduction(Resource::Energy, 1),
        StandardProject::Asteroid => Effect::RaiseTemperature(1),
        StandardProject::Aquifer => Effect::PlaceOcean,
        StandardProject::Greenery => Effect::PlaceGreenery,
        StandardProject::City => Effect::Chained(vec![
            Effect::PlaceCity(CityKind::RegularCity, AreaRule::Land),
            Effect::ChangeProduction(Resource::Megacredits, 1),
        ]),
    }
}

fn standard_project<D: Deck + ?Sized>(
    r: &mut Resolver<'_, D>,
    player: PlayerId,
    project: StandardProject,
) -> Step {
    let globals = r.state().globals;
    let maxed = match project {
        StandardProject::Asteroid => globals.temperature >= GlobalParameters::MAX_TEMPERATURE,
        StandardProject::Aquifer => globals.oceans >= GlobalParameters::MAX_OCEANS,
        _ => false,
    };
    if maxed {
        let what = format!("{project:?} has nothing left to raise");
        return Err(EngineError::InvalidTarget(what).into());
    }

    let payment = check_spend(r.state(), r.config(), player, Cost::Megacredits(project.price()))?;
    let rebate = r.state().modifiers.standard_project_rebate(player);
    let actor = r.state_mut().player_mut(player)?;
    payment.apply(actor)?;
    actor.gain(Resource::Megacredits, rebate);

    r.chain(Frame::new(player, None), &[project_effect(project)])
}
