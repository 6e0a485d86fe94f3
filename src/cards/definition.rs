//! Card definitions - static catalog data.
//!
//! A `Card` is one catalog record: cost, tags, requirements, point rule,
//! production deltas and effect lists. It never changes during a game;
//! per-game data (owner, counters) lives on `CardInstance`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{CardResource, Cost, EngineError, Resource};
use crate::effects::Effect;
use crate::rules::Requirement;

/// Category label on a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tag {
    Building,
    Space,
    Power,
    Science,
    Jovian,
    Earth,
    Plant,
    Microbe,
    Animal,
    City,
    Wild,
    Event,
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    /// Played once, stays in play.
    Automatic,
    /// Stays in play and carries actions.
    Active,
    /// Resolves and leaves play; its tags do not stay.
    Event,
}

/// Victory points a card contributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointsRule {
    /// Fixed points, possibly negative.
    Immediate(i32),
    /// `(points, per, tag)`: points per `per` of the owner's tags.
    PerTag(u32, u32, Tag),
    /// `(points, per, kind)`: points per `per` resources on this card.
    PerCardResource(u32, u32, CardResource),
    /// Points for every city in play, anyone's, on Mars or off it.
    PerCity(u32),
    /// One point per `n` cities in play.
    PerNCities(u32),
    /// Fixed points while this card holds at least one `kind`.
    IfAnyCardResource(u32, CardResource),
}

/// Immutable catalog entry.
///
/// ## Example
///
/// ```
/// use terraform_engine::cards::{Card, CardKind, Tag};
/// use terraform_engine::core::{Cost, Resource};
///
/// let mine = Card::new("Mine", CardKind::Automatic, Cost::Building(4))
///     .with_tags(&[Tag::Building])
///     .with_own_production(Resource::Steel, 1);
///
/// assert!(mine.validate().is_ok());
/// assert_eq!(mine.own_production[&Resource::Steel], 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub kind: CardKind,
    pub tags: Vec<Tag>,
    pub cost: Cost,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<Requirement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<PointsRule>,

    /// Production change for the player.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub own_production: BTreeMap<Resource, i32>,

    /// Production change for a chosen player.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub any_production: BTreeMap<Resource, i32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Effect>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub immediate_impacts: Vec<Effect>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_card_this_generation_effects: Vec<Effect>,
}

impl Card {
    /// Create a card with no tags and no effects.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: CardKind, cost: Cost) -> Self {
        Self {
            name: name.into(),
            kind,
            tags: Vec::new(),
            cost,
            requirements: Vec::new(),
            points: None,
            own_production: BTreeMap::new(),
            any_production: BTreeMap::new(),
            effects: Vec::new(),
            actions: Vec::new(),
            immediate_impacts: Vec::new(),
            next_card_this_generation_effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: &[Tag]) -> Self {
        self.tags.extend_from_slice(tags);
        self
    }

    #[must_use]
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    #[must_use]
    pub fn with_points(mut self, points: PointsRule) -> Self {
        self.points = Some(points);
        self
    }

    #[must_use]
    pub fn with_own_production(mut self, resource: Resource, delta: i32) -> Self {
        self.own_production.insert(resource, delta);
        self
    }

    #[must_use]
    pub fn with_any_production(mut self, resource: Resource, delta: i32) -> Self {
        self.any_production.insert(resource, delta);
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: Effect) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn with_impact(mut self, impact: Effect) -> Self {
        self.immediate_impacts.push(impact);
        self
    }

    #[must_use]
    pub fn with_next_card_effect(mut self, effect: Effect) -> Self {
        self.next_card_this_generation_effects.push(effect);
        self
    }

    #[must_use]
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// Number of copies of `tag` on this card.
    #[must_use]
    pub fn tag_multiplicity(&self, tag: Tag) -> u32 {
        self.tags.iter().filter(|&&t| t == tag).count() as u32
    }

    /// The kind of resource this card stores, if any of its nodes put
    /// resources on it.
    #[must_use]
    pub fn card_resource(&self) -> Option<CardResource> {
        self.effects
            .iter()
            .chain(&self.actions)
            .chain(&self.immediate_impacts)
            .find_map(Effect::card_resource)
    }

    /// Check catalog sanity.
    pub fn validate(&self) -> Result<(), EngineError> {
        let fail = |reason: &str| -> Result<(), EngineError> {
            Err(EngineError::MalformedCard {
                card: self.name.clone(),
                reason: reason.to_string(),
            })
        };

        if self.cost.amount() == 0 {
            return fail("cost must be positive");
        }
        if !self.cost.is_card_currency() {
            return fail("cost must be in Megacredits, Space, Building or SpaceOrBuilding");
        }

        match self.kind {
            CardKind::Active if self.actions.is_empty() => {
                return fail("active card without actions")
            }
            CardKind::Automatic | CardKind::Event if !self.actions.is_empty() => {
                return fail("only active cards carry actions")
            }
            _ => {}
        }

        let is_event = self.kind == CardKind::Event;
        if is_event != self.has_tag(Tag::Event) {
            return fail("the Event tag belongs to event cards only");
        }
        if is_event && !self.effects.is_empty() {
            return fail("event cards have no standing effects");
        }

        let building = self.has_tag(Tag::Building);
        let space = self.has_tag(Tag::Space);
        let currency_ok = match self.cost {
            Cost::Building(_) => building && !space,
            Cost::Space(_) => space && !building,
            Cost::SpaceOrBuilding(_) => space && building,
            _ => !space && !building,
        };
        if !currency_ok {
            return fail("cost currency does not match Building/Space tags");
        }

        if self.effects.iter().any(|e| !e.is_standing()) {
            return fail("effects may only hold standing nodes");
        }
        if self
            .next_card_this_generation_effects
            .iter()
            .any(|e| !e.is_one_shot_modifier())
        {
            return fail("next-card effects may only hold discounts and tolerances");
        }

        Ok(())
    }
}
