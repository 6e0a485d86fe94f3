//! Effect definitions.
//!
//! `Effect` is the card language: every impact, action and standing
//! effect a catalog entry can carry is one of these nodes. The enum is
//! closed and the resolver matches it exhaustively, so a new node kind
//! cannot be silently ignored.
//!
//! Nodes fall into three groups:
//!
//! ## Impacts
//!
//! Evaluated by the resolver when a card is played, an action is invoked
//! or a trigger fires: resource, production and rating changes, global
//! parameter raises, tile placement, deck interaction, per-card
//! resources, and the composites `OneOf`, `Chained` and
//! `CauseFreeImpact`.
//!
//! ## Standing nodes
//!
//! Registered when a card enters play and live while it stays there:
//! discounts, the tag trigger `OnOwnTagPlayed`, removal protection,
//! metal value and rebate bonuses, and requirement tolerance.
//!
//! ## One-shot modifiers
//!
//! The discount and tolerance nodes may also appear in a card's
//! `next_card_this_generation_effects`, where they apply to exactly one
//! later play attempt.

use serde::{Deserialize, Serialize};

use crate::board::{AreaRule, CityKind, SpecialTile};
use crate::cards::Tag;
use crate::core::{CardResource, Cost, Resource};

/// A node of the card language.
///
/// Catalog records use serde's externally tagged form, e.g.
/// `{"GainResource": ["Megacredits", 5]}` or `"PlaceOcean"`.
///
/// ```
/// use terraform_engine::core::{Cost, Resource};
/// use terraform_engine::effects::Effect;
///
/// let elevator = Effect::SpendResource(
///     Cost::Steel(1),
///     vec![Effect::GainResource(Resource::Megacredits, 5)],
/// );
/// assert!(!elevator.is_standing());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    // === Resources, production, rating ===

    /// Add to the actor's stock.
    GainResource(Resource, u32),

    /// Pay `cost`, then run the list as one atomic chain.
    SpendResource(Cost, Vec<Effect>),

    /// Remove resources from the source card, then run the list.
    SpendResourceFromSameCard(CardResource, u32, Vec<Effect>),

    /// Lower the actor's production, then run the list.
    SpendProduction(Resource, u32, Vec<Effect>),

    /// Change the actor's production. Negative deltas must fit above the floor.
    ChangeProduction(Resource, i32),

    RaiseTerraformRating(u32),

    /// Convert the whole stock of the first resource into the second, 1:1.
    TransformResource(Resource, Resource),

    /// `(tag, per, resource, amount)`: `amount` production per `per` own tags.
    GainProductionPerOwnTag(Tag, u32, Resource, u32),

    /// Same, counting the tags of every opponent.
    GainProductionPerOpponentTag(Tag, u32, Resource, u32),

    /// Same, counting every player's tags.
    GainProductionPerAnyTag(Tag, u32, Resource, u32),

    /// `(per, tag, amount)`: `amount` rating per `per` own tags.
    GainTerraformRatingPerOwnTag(u32, Tag, u32),

    /// `amount` of the resource per city in play, anyone's.
    GainResourcePerCity(Resource, u32),

    /// Same, counting only cities on Mars.
    GainResourcePerCityOnMars(Resource, u32),

    /// `amount` production per city in play, anyone's.
    GainProductionPerCity(Resource, u32),

    GainProductionPerCityOnMars(Resource, u32),

    /// Gain the own-production box of one of the actor's cards with
    /// this tag.
    CopyProductionOfCard(Tag),

    // === Global parameters and tiles ===

    /// Raise temperature by this many steps, +1 rating per step raised.
    RaiseTemperature(u32),

    /// Raise oxygen by this many percent, +1 rating per step raised.
    RaiseOxygen(u32),

    PlaceOcean,

    PlaceGreenery,

    PlaceCity(CityKind, AreaRule),

    PlaceSpecialTile(SpecialTile, AreaRule),

    /// One production of whichever metal the last placed tile's area
    /// bonus gave.
    GainMiningProductionMatchingPlacementBonus(u32),

    // === Cards and deck ===

    DrawCard(u32),

    /// Discard cards from hand (player picks).
    DiscardCard(u32),

    /// Look at the top `look` cards, keep `take`, discard the rest.
    LookAndTakeFromDeck(u32, u32),

    /// Look at the top `n` cards, buy any of them at the purchase price.
    LookAndBuyFromDeck(u32),

    /// Reveal and discard the top card; run the list if it carries the tag.
    RevealAndCheckTag(Tag, Vec<Effect>),

    // === Per-card resources ===

    /// Add to the card this effect belongs to.
    AddResourceToSameCard(CardResource, u32),

    /// Add to one of the actor's cards that hold this kind of resource.
    AddResourceToPlayedCard(CardResource, u32),

    /// Same, but never the card this effect belongs to.
    AddResourceToAnotherCard(CardResource, u32),

    /// `(min, n)`: add `n` to one of the actor's cards already holding at
    /// least `min` of any card resource.
    AddResourceToAnyCardWithExistingResource(u32, u32),

    /// Move up to `n` from a chosen opponent's stock to the actor's.
    StealResource(Resource, u32),

    /// Remove up to `n` from a chosen player's stock.
    DestroyAnyResource(Resource, u32),

    /// Remove up to `n` from a chosen card's counter.
    DestroyAnyCardResource(CardResource, u32),

    // === Composites ===

    /// Player picks exactly one branch.
    OneOf(Vec<Effect>),

    /// All in order, or nothing.
    Chained(Vec<Effect>),

    /// Inner effect as a free action.
    CauseFreeImpact(Box<Effect>),

    // === Standing ===

    CardDiscountForTag(Tag, u32),

    AnyCardDiscount(u32),

    /// Run the effect each time the owner plays a card with this tag.
    OnOwnTagPlayed(Tag, Box<Effect>),

    /// Opponents cannot remove these resources from the owner.
    CannotRemoveAnyCardResources(Vec<CardResource>),

    /// Opponents cannot remove this resource from this card.
    CannotRemoveThisCardResource(CardResource),

    /// Bonus Megacredit value for each steel and titanium spent.
    IncreasedMetalsValue(u32),

    /// Megacredits back after each standard project.
    RebateForStandardProjects(u32),

    /// Global requirement thresholds loosened by this many steps.
    GlobalRequirementsTolerance(u32),
}

impl Effect {
    /// Whether this node belongs in a card's `effects` list.
    #[must_use]
    pub fn is_standing(&self) -> bool {
        matches!(
            self,
            Effect::CardDiscountForTag(..)
                | Effect::AnyCardDiscount(_)
                | Effect::OnOwnTagPlayed(..)
                | Effect::CannotRemoveAnyCardResources(_)
                | Effect::CannotRemoveThisCardResource(_)
                | Effect::IncreasedMetalsValue(_)
                | Effect::RebateForStandardProjects(_)
                | Effect::GlobalRequirementsTolerance(_)
        )
    }

    /// Whether this node may be queued as a one-shot "next card" modifier.
    #[must_use]
    pub fn is_one_shot_modifier(&self) -> bool {
        matches!(
            self,
            Effect::CardDiscountForTag(..)
                | Effect::AnyCardDiscount(_)
                | Effect::GlobalRequirementsTolerance(_)
        )
    }

    /// The card resource this node puts on its own card, searching
    /// composites. Used to tell which kind of resource a card holds.
    #[must_use]
    pub fn card_resource(&self) -> Option<CardResource> {
        match self {
            Effect::AddResourceToSameCard(kind, _)
            | Effect::SpendResourceFromSameCard(kind, _, _)
            | Effect::CannotRemoveThisCardResource(kind) => Some(*kind),
            Effect::SpendResource(_, then)
            | Effect::SpendProduction(_, _, then)
            | Effect::RevealAndCheckTag(_, then)
            | Effect::OneOf(then)
            | Effect::Chained(then) => then.iter().find_map(Effect::card_resource),
            Effect::CauseFreeImpact(inner) | Effect::OnOwnTagPlayed(_, inner) => {
                inner.card_resource()
            }
            _ => None,
        }
    }
}
