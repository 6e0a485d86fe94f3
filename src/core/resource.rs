//! Resources, per-card resources and payment costs.
//!
//! Player-wide stock lives in a [`ResourceMap`]; per-card counters are
//! keyed by [`CardResource`] on the card instance itself.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Player-wide resource. Each one has a stock and a production track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    Megacredits,
    Steel,
    Titanium,
    Plants,
    Energy,
    Heat,
}

impl Resource {
    /// Every resource, in track order.
    pub const ALL: [Resource; 6] = [
        Resource::Megacredits,
        Resource::Steel,
        Resource::Titanium,
        Resource::Plants,
        Resource::Energy,
        Resource::Heat,
    ];

    #[must_use]
    const fn slot(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Resource stored on an individual card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardResource {
    Microbe,
    Plant,
    Animal,
    Science,
    Fighter,
}

impl CardResource {
    /// The player-wide stock that a protection of this card resource also
    /// shelters. Protecting plants on cards protects the plant stock.
    #[must_use]
    pub const fn sheltered_stock(self) -> Option<Resource> {
        match self {
            CardResource::Plant => Some(Resource::Plants),
            _ => None,
        }
    }
}

impl std::fmt::Display for CardResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Fixed-size table with one value per [`Resource`].
///
/// ```
/// use terraform_engine::core::{Resource, ResourceMap};
///
/// let mut stock: ResourceMap<u32> = ResourceMap::default();
/// stock[Resource::Steel] = 3;
/// assert_eq!(stock[Resource::Steel], 3);
/// assert_eq!(stock[Resource::Heat], 0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceMap<T> {
    values: [T; 6],
}

impl<T: Copy> ResourceMap<T> {
    /// Every slot set to `value`.
    #[must_use]
    pub fn filled(value: T) -> Self {
        Self { values: [value; 6] }
    }

    /// Set one slot (builder pattern).
    #[must_use]
    pub fn with(mut self, resource: Resource, value: T) -> Self {
        self[resource] = value;
        self
    }

    /// Iterate `(resource, value)` pairs in track order.
    pub fn iter(&self) -> impl Iterator<Item = (Resource, T)> + '_ {
        Resource::ALL.iter().map(move |&r| (r, self[r]))
    }
}

impl<T> Index<Resource> for ResourceMap<T> {
    type Output = T;

    fn index(&self, resource: Resource) -> &T {
        &self.values[resource.slot()]
    }
}

impl<T> IndexMut<Resource> for ResourceMap<T> {
    fn index_mut(&mut self, resource: Resource) -> &mut T {
        &mut self.values[resource.slot()]
    }
}

/// A price: an amount in exactly one currency.
///
/// Card costs only ever use the first four variants. The raw-resource
/// variants appear as the price of card actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Cost {
    Megacredits(u32),
    Space(u32),
    Building(u32),
    SpaceOrBuilding(u32),
    Steel(u32),
    Titanium(u32),
    Plants(u32),
    Energy(u32),
    Heat(u32),
}

impl Cost {
    /// The amount, whatever the currency.
    #[must_use]
    pub const fn amount(self) -> u32 {
        match self {
            Cost::Megacredits(n)
            | Cost::Space(n)
            | Cost::Building(n)
            | Cost::SpaceOrBuilding(n)
            | Cost::Steel(n)
            | Cost::Titanium(n)
            | Cost::Plants(n)
            | Cost::Energy(n)
            | Cost::Heat(n) => n,
        }
    }

    /// Same currency, different amount.
    #[must_use]
    pub const fn with_amount(self, n: u32) -> Cost {
        match self {
            Cost::Megacredits(_) => Cost::Megacredits(n),
            Cost::Space(_) => Cost::Space(n),
            Cost::Building(_) => Cost::Building(n),
            Cost::SpaceOrBuilding(_) => Cost::SpaceOrBuilding(n),
            Cost::Steel(_) => Cost::Steel(n),
            Cost::Titanium(_) => Cost::Titanium(n),
            Cost::Plants(_) => Cost::Plants(n),
            Cost::Energy(_) => Cost::Energy(n),
            Cost::Heat(_) => Cost::Heat(n),
        }
    }

    /// Whether this is a Megacredit price (optionally payable with metals),
    /// as opposed to a price in one raw resource.
    #[must_use]
    pub const fn is_card_currency(self) -> bool {
        matches!(
            self,
            Cost::Megacredits(_) | Cost::Space(_) | Cost::Building(_) | Cost::SpaceOrBuilding(_)
        )
    }

    /// The single resource a raw-resource price is paid in.
    #[must_use]
    pub const fn raw_resource(self) -> Option<Resource> {
        match self {
            Cost::Steel(_) => Some(Resource::Steel),
            Cost::Titanium(_) => Some(Resource::Titanium),
            Cost::Plants(_) => Some(Resource::Plants),
            Cost::Energy(_) => Some(Resource::Energy),
            Cost::Heat(_) => Some(Resource::Heat),
            Cost::Megacredits(_)
            | Cost::Space(_)
            | Cost::Building(_)
            | Cost::SpaceOrBuilding(_) => None,
        }
    }

    #[must_use]
    pub const fn accepts_steel(self) -> bool {
        matches!(self, Cost::Building(_) | Cost::SpaceOrBuilding(_))
    }

    #[must_use]
    pub const fn accepts_titanium(self) -> bool {
        matches!(self, Cost::Space(_) | Cost::SpaceOrBuilding(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_map_iter_order() {
        let map = ResourceMap::filled(1u32).with(Resource::Heat, 5);
        let heat: Vec<_> = map.iter().filter(|(_, v)| *v == 5).collect();
        assert_eq!(heat, vec![(Resource::Heat, 5)]);
        assert_eq!(map.iter().count(), 6);
    }

    #[test]
    fn test_cost_metal_acceptance() {
        assert!(Cost::Building(4).accepts_steel());
        assert!(!Cost::Building(4).accepts_titanium());
        assert!(Cost::Space(27).accepts_titanium());
        assert!(Cost::SpaceOrBuilding(9).accepts_steel());
        assert!(Cost::SpaceOrBuilding(9).accepts_titanium());
        assert!(!Cost::Megacredits(6).accepts_steel());
    }

    #[test]
    fn test_cost_with_amount_keeps_currency() {
        assert_eq!(Cost::Space(27).with_amount(20), Cost::Space(20));
        assert_eq!(Cost::Steel(1).amount(), 1);
        assert_eq!(Cost::Steel(1).raw_resource(), Some(Resource::Steel));
        assert!(Cost::Steel(1).raw_resource().is_some());
        assert!(!Cost::Heat(8).is_card_currency());
    }

    #[test]
    fn test_plant_protection_shelters_stock() {
        assert_eq!(CardResource::Plant.sheltered_stock(), Some(Resource::Plants));
        assert_eq!(CardResource::Animal.sheltered_stock(), None);
    }

    #[test]
    fn test_cost_json_shape() {
        let json = serde_json::to_string(&Cost::Building(4)).unwrap();
        assert_eq!(json, r#"{"Building":4}"#);
    }
}
