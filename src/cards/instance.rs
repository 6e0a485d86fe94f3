//! Card instances - runtime card state.
//!
//! `CardInstance` is one card that has entered play. It tracks the owner
//! and the per-card resource counters. Counters are created by the first
//! effect that adds to them and vanish with the instance.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{CardResource, EngineError, InstanceId, PlayerId, Shortfall};

/// A card in play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    pub id: InstanceId,

    /// Catalog name.
    pub card: String,

    pub owner: PlayerId,

    /// The resource kind this card is built to hold, if any.
    pub stores: Option<CardResource>,

    /// Per-card resource counters, created lazily.
    #[serde(default)]
    counters: FxHashMap<CardResource, u32>,
}

impl CardInstance {
    #[must_use]
    pub fn new(id: InstanceId, card: impl Into<String>, owner: PlayerId) -> Self {
        Self {
            id,
            card: card.into(),
            owner,
            stores: None,
            counters: FxHashMap::default(),
        }
    }

    /// Set the stored resource kind (builder pattern).
    #[must_use]
    pub fn storing(mut self, kind: Option<CardResource>) -> Self {
        self.stores = kind;
        self
    }

    /// Current count; zero when the counter does not exist yet.
    #[must_use]
    pub fn count(&self, kind: CardResource) -> u32 {
        self.counters.get(&kind).copied().unwrap_or(0)
    }

    /// Whether a counter for `kind` has been created.
    #[must_use]
    pub fn has_counter(&self, kind: CardResource) -> bool {
        self.counters.contains_key(&kind)
    }

    /// Sum over every counter on the card.
    #[must_use]
    pub fn total_resources(&self) -> u32 {
        self.counters.values().sum()
    }

    /// Counters in a stable order.
    pub fn counters(&self) -> Vec<(CardResource, u32)> {
        let mut entries: Vec<_> = self.counters.iter().map(|(&k, &v)| (k, v)).collect();
        entries.sort();
        entries
    }

    /// Add to a counter, creating it if needed.
    pub fn add(&mut self, kind: CardResource, amount: u32) {
        let counter = self.counters.entry(kind).or_insert(0);
        *counter = counter.saturating_add(amount);
    }

    /// Remove exactly `amount`, all or nothing.
    pub fn remove(&mut self, kind: CardResource, amount: u32) -> Result<(), EngineError> {
        let available = self.count(kind);
        if available < amount {
            return Err(EngineError::InsufficientResources {
                what: Shortfall::CardResource(kind),
                needed: amount.into(),
                available: available.into(),
            });
        }
        if let Some(counter) = self.counters.get_mut(&kind) {
            *counter -= amount;
        }
        Ok(())
    }

    /// Remove up to `amount`; returns how many were removed.
    pub fn remove_up_to(&mut self, kind: CardResource, amount: u32) -> u32 {
        let taken = amount.min(self.count(kind));
        if let Some(counter) = self.counters.get_mut(&kind) {
            *counter -= taken;
        }
        taken
    }
}
