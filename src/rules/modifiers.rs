//! Standing and one-shot modifiers.
//!
//! Standing modifiers come from the `effects` of cards in play and last
//! while their source card does. One-shot modifiers come from
//! `next_card_this_generation_effects`, queue per player, and are
//! consumed by that player's next play attempt that gets past the
//! price check, or dropped at the end of the generation.

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardInstance, Tag};
use crate::core::{CardResource, InstanceId, PlayerId, Resource};
use crate::effects::Effect;

/// What a modifier does.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Off the price of each card with this tag.
    TagDiscount(Tag, u32),
    /// Off the price of every card.
    AnyDiscount(u32),
    /// Steps of slack on global requirements.
    Tolerance(u32),
    /// Extra Megacredit value per steel and titanium.
    MetalsValue(u32),
    /// Megacredits back per standard project.
    StandardProjectRebate(u32),
    /// Opponents cannot remove these from any of the owner's cards.
    Protect(Vec<CardResource>),
    /// Opponents cannot remove this from the source card.
    ProtectOwnCard(CardResource),
}

impl ModifierKind {
    /// The modifier a standing node registers; `None` for triggers.
    #[must_use]
    pub fn from_effect(effect: &Effect) -> Option<Self> {
        match effect {
            Effect::CardDiscountForTag(tag, n) => Some(Self::TagDiscount(*tag, *n)),
            Effect::AnyCardDiscount(n) => Some(Self::AnyDiscount(*n)),
            Effect::GlobalRequirementsTolerance(n) => Some(Self::Tolerance(*n)),
            Effect::IncreasedMetalsValue(n) => Some(Self::MetalsValue(*n)),
            Effect::RebateForStandardProjects(n) => Some(Self::StandardProjectRebate(*n)),
            Effect::CannotRemoveAnyCardResources(kinds) => Some(Self::Protect(kinds.clone())),
            Effect::CannotRemoveThisCardResource(kind) => Some(Self::ProtectOwnCard(*kind)),
            _ => None,
        }
    }

    /// Discount this modifier grants on `card`.
    #[must_use]
    pub fn discount_on(&self, card: &Card) -> u32 {
        match self {
            Self::TagDiscount(tag, n) if card.has_tag(*tag) => *n,
            Self::AnyDiscount(n) => *n,
            _ => 0,
        }
    }

    #[must_use]
    pub fn tolerance(&self) -> u32 {
        match self {
            Self::Tolerance(n) => *n,
            _ => 0,
        }
    }
}

/// A standing modifier and the card it came from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifier {
    pub owner: PlayerId,
    pub source: InstanceId,
    pub kind: ModifierKind,
}

/// Every live modifier in the game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierBook {
    standing: Vector<Modifier>,
    one_shot: OrdMap<PlayerId, Vector<ModifierKind>>,
}

impl ModifierBook {
    pub fn add_standing(&mut self, owner: PlayerId, source: InstanceId, kind: ModifierKind) {
        self.standing.push_back(Modifier { owner, source, kind });
    }

    /// Drop every standing modifier a card registered.
    pub fn remove_for_source(&mut self, source: InstanceId) {
        self.standing.retain(|m| m.source != source);
    }

    pub fn standing_of(&self, owner: PlayerId) -> impl Iterator<Item = &ModifierKind> {
        self.standing
            .iter()
            .filter(move |m| m.owner == owner)
            .map(|m| &m.kind)
    }

    pub fn queue_one_shot(&mut self, owner: PlayerId, kind: ModifierKind) {
        self.one_shot.entry(owner).or_default().push_back(kind);
    }

    /// One-shots waiting for `owner`'s next play attempt.
    pub fn pending_one_shots(&self, owner: PlayerId) -> impl Iterator<Item = &ModifierKind> {
        self.one_shot.get(&owner).into_iter().flatten()
    }

    /// Remove and return `owner`'s one-shots.
    pub fn take_one_shots(&mut self, owner: PlayerId) -> Vector<ModifierKind> {
        self.one_shot.remove(&owner).unwrap_or_default()
    }

    /// End of generation: unused one-shots expire.
    pub fn clear_one_shots(&mut self) {
        self.one_shot.clear();
    }

    /// Standing plus pending one-shot discount `owner` gets on `card`.
    #[must_use]
    pub fn discount(&self, owner: PlayerId, card: &Card) -> u32 {
        self.standing_of(owner)
            .chain(self.pending_one_shots(owner))
            .map(|m| m.discount_on(card))
            .fold(0, u32::saturating_add)
    }

    /// Standing plus pending one-shot requirement tolerance.
    #[must_use]
    pub fn tolerance(&self, owner: PlayerId) -> u32 {
        self.standing_of(owner)
            .chain(self.pending_one_shots(owner))
            .map(ModifierKind::tolerance)
            .fold(0, u32::saturating_add)
    }

    #[must_use]
    pub fn metals_bonus(&self, owner: PlayerId) -> u32 {
        self.standing_of(owner)
            .map(|m| match m {
                ModifierKind::MetalsValue(n) => *n,
                _ => 0,
            })
            .sum()
    }

    #[must_use]
    pub fn standard_project_rebate(&self, owner: PlayerId) -> u32 {
        self.standing_of(owner)
            .map(|m| match m {
                ModifierKind::StandardProjectRebate(n) => *n,
                _ => 0,
            })
            .sum()
    }

    /// Whether `owner`'s stock of `resource` is shielded from opponents.
    #[must_use]
    pub fn shields_stock(&self, owner: PlayerId, resource: Resource) -> bool {
        self.standing_of(owner).any(|m| match m {
            ModifierKind::Protect(kinds) => {
                kinds.iter().any(|k| k.sheltered_stock() == Some(resource))
            }
            _ => false,
        })
    }

    /// Whether `kind` on `card` is shielded from opponents.
    #[must_use]
    pub fn shields_card(&self, card: &CardInstance, kind: CardResource) -> bool {
        self.standing.iter().any(|m| {
            m.owner == card.owner
                && match &m.kind {
                    ModifierKind::Protect(kinds) => kinds.contains(&kind),
                    ModifierKind::ProtectOwnCard(k) => *k == kind && m.source == card.id,
                    _ => false,
                }
        })
    }

    #[must_use]
    pub fn standing_len(&self) -> usize {
        self.standing.len()
    }
}

/// Price after discounts, never below zero.
#[must_use]
pub fn effective_cost(base: u32, discount: u32) -> u32 {
    base.saturating_sub(discount)
}
