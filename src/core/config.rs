//! Engine configuration.
//!
//! The engine never hardcodes rule variants that the card data leaves
//! open. Callers pick them at startup:
//! - `DeckExhaustionPolicy`: what a short draw pile does to draws
//! - `ActionUsePolicy`: whether card actions are limited per generation
//! - `PaymentPolicy`: how metals are spent on card prices
//! - `MissingTargetPolicy`: what a directed removal does with no target
//!
//! `EngineConfig` combines them with the numeric house constants.

use serde::{Deserialize, Serialize};

use super::Resource;

/// What happens when a draw asks for more cards than the deck holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeckExhaustionPolicy {
    /// The effect fails with `DeckExhausted` and the move rolls back.
    #[default]
    Fail,
    /// The effect takes whatever is left.
    TakeAvailable,
}

/// How often one card action may be invoked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionUsePolicy {
    /// No limit; the catalog carries no per-generation flag.
    #[default]
    Unlimited,
    /// Each action of each instance once per generation.
    OncePerGeneration,
}

/// Order in which currencies are spent on a card price.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentPolicy {
    /// Titanium, then steel (where accepted), then Megacredits.
    #[default]
    MetalsFirst,
    /// Megacredits first; metals only cover the remainder.
    MegacreditsFirst,
}

/// What a directed removal does when no legal target exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingTargetPolicy {
    /// Fail with `InvalidTarget` or `ProtectedResource`.
    #[default]
    Reject,
    /// Resolve as a no-op.
    Skip,
}

/// Complete engine configuration.
///
/// ```
/// use terraform_engine::core::{EngineConfig, ActionUsePolicy};
///
/// let config = EngineConfig::new(2).with_action_use(ActionUsePolicy::OncePerGeneration);
/// assert_eq!(config.player_count, 2);
/// assert_eq!(config.starting_terraform_rating, 20);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of players (1-255).
    pub player_count: usize,

    /// Terraform rating every player starts with.
    pub starting_terraform_rating: u32,

    /// Megacredit value of one steel before bonuses.
    pub steel_value: u32,

    /// Megacredit value of one titanium before bonuses.
    pub titanium_value: u32,

    /// Price of one card bought from the deck.
    pub card_purchase_cost: u32,

    /// Lowest allowed Megacredit production. Other tracks stop at zero.
    pub megacredit_production_floor: i32,

    pub deck_exhaustion: DeckExhaustionPolicy,
    pub action_use: ActionUsePolicy,
    pub payment: PaymentPolicy,
    pub missing_target: MissingTargetPolicy,
}

impl EngineConfig {
    /// Create a configuration with the standard constants.
    pub fn new(player_count: usize) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        Self {
            player_count,
            starting_terraform_rating: 20,
            steel_value: 2,
            titanium_value: 3,
            card_purchase_cost: 3,
            megacredit_production_floor: -5,
            deck_exhaustion: DeckExhaustionPolicy::default(),
            action_use: ActionUsePolicy::default(),
            payment: PaymentPolicy::default(),
            missing_target: MissingTargetPolicy::default(),
        }
    }

    /// Lowest value a production track may reach.
    #[must_use]
    pub fn production_floor(&self, resource: Resource) -> i32 {
        match resource {
            Resource::Megacredits => self.megacredit_production_floor,
            _ => 0,
        }
    }

    #[must_use]
    pub fn with_starting_terraform_rating(mut self, rating: u32) -> Self {
        self.starting_terraform_rating = rating;
        self
    }

    /// Set the base steel and titanium values.
    #[must_use]
    pub fn with_metal_values(mut self, steel: u32, titanium: u32) -> Self {
        self.steel_value = steel;
        self.titanium_value = titanium;
        self
    }

    #[must_use]
    pub fn with_card_purchase_cost(mut self, cost: u32) -> Self {
        self.card_purchase_cost = cost;
        self
    }

    #[must_use]
    pub fn with_megacredit_production_floor(mut self, floor: i32) -> Self {
        self.megacredit_production_floor = floor;
        self
    }

    #[must_use]
    pub fn with_deck_exhaustion(mut self, policy: DeckExhaustionPolicy) -> Self {
        self.deck_exhaustion = policy;
        self
    }

    #[must_use]
    pub fn with_action_use(mut self, policy: ActionUsePolicy) -> Self {
        self.action_use = policy;
        self
    }

    #[must_use]
    pub fn with_payment(mut self, policy: PaymentPolicy) -> Self {
        self.payment = policy;
        self
    }

    #[must_use]
    pub fn with_missing_target(mut self, policy: MissingTargetPolicy) -> Self {
        self.missing_target = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::new(3);
        assert_eq!(config.steel_value, 2);
        assert_eq!(config.titanium_value, 3);
        assert_eq!(config.card_purchase_cost, 3);
        assert_eq!(config.megacredit_production_floor, -5);
        assert_eq!(config.deck_exhaustion, DeckExhaustionPolicy::Fail);
        assert_eq!(config.action_use, ActionUsePolicy::Unlimited);
        assert_eq!(config.payment, PaymentPolicy::MetalsFirst);
        assert_eq!(config.missing_target, MissingTargetPolicy::Reject);
    }

    #[test]
    fn test_production_floor() {
        let config = EngineConfig::new(2);
        assert_eq!(config.production_floor(Resource::Megacredits), -5);
        assert_eq!(config.production_floor(Resource::Heat), 0);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new(2)
            .with_metal_values(3, 4)
            .with_deck_exhaustion(DeckExhaustionPolicy::TakeAvailable)
            .with_payment(PaymentPolicy::MegacreditsFirst)
            .with_missing_target(MissingTargetPolicy::Skip)
            .with_card_purchase_cost(4)
            .with_megacredit_production_floor(0)
            .with_starting_terraform_rating(14);

        assert_eq!(config.steel_value, 3);
        assert_eq!(config.titanium_value, 4);
        assert_eq!(config.card_purchase_cost, 4);
        assert_eq!(config.megacredit_production_floor, 0);
        assert_eq!(config.starting_terraform_rating, 14);
        assert_eq!(config.missing_target, MissingTargetPolicy::Skip);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = EngineConfig::new(4).with_action_use(ActionUsePolicy::OncePerGeneration);
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_zero_players() {
        EngineConfig::new(0);
    }
}
