//! Target candidates for directed effects.
//!
//! Every function here is a pure scan of the state. The resolver turns a
//! candidate list into a decision, or into an error when it is empty:
//! - [`steal_targets`]: opponents a stock can be taken from
//! - [`stock_destroy_targets`]: players a stock can be removed from
//! - [`card_destroy_targets`]: cards a counter can be removed from
//! - [`storing_cards`] and [`cards_holding`]: the actor's own cards for
//!   adding resources
//! - [`production_boxes`]: the actor's cards whose production can be copied
//! - [`production_targets`]: players whose production can absorb a delta
//!
//! Protection only ever shields a player or card from someone else.

use crate::cards::{CardRegistry, Tag};
use crate::core::{
    CardResource, EngineConfig, EngineError, GameState, InstanceId, PlayerId, Resource,
};

/// Candidates left after protection, and how many protection removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetScan<T> {
    pub eligible: Vec<T>,
    pub shielded: usize,
}

impl<T> TargetScan<T> {
    fn collect(candidates: impl Iterator<Item = (T, bool)>) -> Self {
        let mut scan = Self {
            eligible: Vec::new(),
            shielded: 0,
        };
        for (candidate, shielded) in candidates {
            if shielded {
                scan.shielded += 1;
            } else {
                scan.eligible.push(candidate);
            }
        }
        scan
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.eligible.is_empty()
    }

    /// The error for an empty scan: protection wins over plain absence.
    #[must_use]
    pub fn missing(&self, what: String) -> EngineError {
        if self.shielded > 0 {
            EngineError::ProtectedResource(what)
        } else {
            EngineError::InvalidTarget(what)
        }
    }
}

/// Opponents of `actor` holding some `resource`.
pub fn steal_targets(
    state: &GameState,
    actor: PlayerId,
    resource: Resource,
) -> TargetScan<PlayerId> {
    TargetScan::collect(
        state
            .players
            .iter()
            .filter(|&(id, p)| id != actor && p.stock[resource] > 0)
            .map(|(id, _)| (id, state.modifiers.shields_stock(id, resource))),
    )
}

/// Players holding some `resource`; the actor may always pick itself.
pub fn stock_destroy_targets(
    state: &GameState,
    actor: PlayerId,
    resource: Resource,
) -> TargetScan<PlayerId> {
    TargetScan::collect(
        state
            .players
            .iter()
            .filter(|(_, p)| p.stock[resource] > 0)
            .map(|(id, _)| (id, id != actor && state.modifiers.shields_stock(id, resource))),
    )
}

/// Cards in play with a nonzero `kind` counter.
pub fn card_destroy_targets(
    state: &GameState,
    actor: PlayerId,
    kind: CardResource,
) -> TargetScan<InstanceId> {
    TargetScan::collect(
        state
            .instances
            .values()
            .filter(|c| c.count(kind) > 0)
            .map(|c| (c.id, c.owner != actor && state.modifiers.shields_card(c, kind))),
    )
}

/// The actor's cards built to hold `kind`, in instance order.
pub fn storing_cards(state: &GameState, actor: PlayerId, kind: CardResource) -> Vec<InstanceId> {
    state
        .instances
        .values()
        .filter(|c| c.owner == actor && c.stores == Some(kind))
        .map(|c| c.id)
        .collect()
}

/// The actor's cards already holding at least `min` resources in total.
pub fn cards_holding(state: &GameState, actor: PlayerId, min: u32) -> Vec<InstanceId> {
    state
        .instances
        .values()
        .filter(|c| c.owner == actor && c.total_resources() >= min.max(1))
        .map(|c| c.id)
        .collect()
}

/// The actor's cards in play with `tag` and a non-empty own-production
/// box that could be applied again without breaking a floor. `except`
/// is left out.
pub fn production_boxes(
    state: &GameState,
    registry: &CardRegistry,
    config: &EngineConfig,
    actor: PlayerId,
    tag: Tag,
    except: Option<InstanceId>,
) -> Result<Vec<InstanceId>, EngineError> {
    let me = state.player(actor)?;
    let mut found = Vec::new();
    for &id in &me.played {
        if Some(id) == except {
            continue;
        }
        let card = registry.get(&state.instance(id)?.card)?;
        let fits = card.own_production.iter().all(|(&resource, &delta)| {
            me.production[resource] + delta >= config.production_floor(resource)
        });
        if card.has_tag(tag) && !card.own_production.is_empty() && fits {
            found.push(id);
        }
    }
    Ok(found)
}

/// Players whose `resource` production stays at or above its floor after `delta`.
pub fn production_targets(
    state: &GameState,
    config: &EngineConfig,
    resource: Resource,
    delta: i32,
) -> Vec<PlayerId> {
    let floor = config.production_floor(resource);
    state
        .players
        .iter()
        .filter(|(_, p)| p.production[resource] + delta >= floor)
        .map(|(id, _)| id)
        .collect()
}
