//! Property tests for payment, production floors and move atomicity.

use proptest::prelude::*;

use terraform_engine::cards::{Card, CardKind, CardRegistry, Tag};
use terraform_engine::core::{Cost, EngineConfig, PaymentPolicy, PlayerId, Resource, ResourceMap};
use terraform_engine::deck::VecDeck;
use terraform_engine::effects::Effect;
use terraform_engine::engine::Engine;
use terraform_engine::rules::{buying_power, plan_payment, MetalValues};

const P0: PlayerId = PlayerId::new(0);

fn cost_strategy() -> impl Strategy<Value = Cost> {
    (1u32..40).prop_flat_map(|n| {
        prop_oneof![
            Just(Cost::Megacredits(n)),
            Just(Cost::Building(n)),
            Just(Cost::Space(n)),
            Just(Cost::SpaceOrBuilding(n)),
        ]
    })
}

fn policy_strategy() -> impl Strategy<Value = PaymentPolicy> {
    prop_oneof![Just(PaymentPolicy::MetalsFirst), Just(PaymentPolicy::MegacreditsFirst)]
}

fn stock(mc: u32, steel: u32, titanium: u32) -> ResourceMap<u32> {
    ResourceMap::default()
        .with(Resource::Megacredits, mc)
        .with(Resource::Steel, steel)
        .with(Resource::Titanium, titanium)
}

/// One card with the given price and impacts, held by player 0.
fn engine_with_card(cost: Cost, tags: &[Tag], impacts: Vec<Effect>) -> Engine {
    let mut card = Card::new("Test Card", CardKind::Automatic, cost).with_tags(tags);
    for impact in impacts {
        card = card.with_impact(impact);
    }
    let mut registry = CardRegistry::new();
    registry.register(card).unwrap();

    let mut engine = Engine::new(EngineConfig::new(2), registry, VecDeck::default());
    engine.state_mut().players[P0].hand.push_back("Test Card".into());
    engine
}

proptest! {
    /// Payment succeeds exactly when buying power covers the price.
    #[test]
    fn prop_payment_succeeds_iff_affordable(
        cost in cost_strategy(),
        policy in policy_strategy(),
        mc in 0u32..30,
        steel in 0u32..10,
        titanium in 0u32..10,
        steel_value in 1u32..4,
        titanium_value in 1u32..5,
    ) {
        let values = MetalValues { steel: steel_value, titanium: titanium_value };
        let stock = stock(mc, steel, titanium);
        let affordable = buying_power(cost, &stock, values) >= cost.amount();
        prop_assert_eq!(plan_payment(cost, &stock, values, policy).is_ok(), affordable);
    }

    /// A payment stays within stock and covers the price with accepted metals.
    #[test]
    fn prop_payment_covers_price_within_stock(
        cost in cost_strategy(),
        policy in policy_strategy(),
        mc in 0u32..30,
        steel in 0u32..10,
        titanium in 0u32..10,
    ) {
        let values = MetalValues { steel: 2, titanium: 3 };
        let stock = stock(mc, steel, titanium);
        if let Ok(payment) = plan_payment(cost, &stock, values, policy) {
            let paid = payment.amounts;
            prop_assert!(paid[Resource::Megacredits] <= mc);
            prop_assert!(paid[Resource::Steel] <= steel);
            prop_assert!(paid[Resource::Titanium] <= titanium);
            if !cost.accepts_steel() {
                prop_assert_eq!(paid[Resource::Steel], 0);
            }
            if !cost.accepts_titanium() {
                prop_assert_eq!(paid[Resource::Titanium], 0);
            }
            let value = paid[Resource::Megacredits]
                + paid[Resource::Steel] * 2
                + paid[Resource::Titanium] * 3;
            prop_assert!(value >= cost.amount());
        }
    }

    /// Paying the exact price leaves nothing.
    #[test]
    fn prop_exact_megacredits_leave_nothing(price in 1u32..60) {
        let mut engine = engine_with_card(Cost::Megacredits(price), &[], vec![]);
        engine.state_mut().players[P0].gain(Resource::Megacredits, price);

        engine.play_card(P0, "Test Card").unwrap();
        prop_assert_eq!(engine.state().players[P0].stock[Resource::Megacredits], 0);
    }

    /// Production changes never go below the floor.
    #[test]
    fn prop_production_never_below_floor(
        resource in prop_oneof![
            Just(Resource::Megacredits),
            Just(Resource::Heat),
            Just(Resource::Plants),
        ],
        start in 0i32..4,
        delta in -8i32..4,
    ) {
        let mut engine = engine_with_card(
            Cost::Megacredits(1),
            &[],
            vec![Effect::ChangeProduction(resource, delta)],
        );
        engine.state_mut().players[P0].gain(Resource::Megacredits, 1);
        engine.state_mut().players[P0].production[resource] = start;
        let floor = engine.config().production_floor(resource);

        let result = engine.play_card(P0, "Test Card");
        prop_assert_eq!(result.is_ok(), start + delta >= floor);
        prop_assert!(engine.state().players[P0].production[resource] >= floor);
    }

    /// A rejected move leaves the state as it was.
    #[test]
    fn prop_rejected_move_changes_nothing(
        mc in 0u32..20,
        steel in 0u32..5,
        heat_production in 0i32..3,
    ) {
        let mut engine = engine_with_card(
            Cost::Building(8),
            &[Tag::Building],
            vec![Effect::Chained(vec![
                Effect::GainResource(Resource::Plants, 2),
                Effect::RaiseTemperature(1),
                Effect::ChangeProduction(Resource::Heat, -2),
            ])],
        );
        {
            let me = &mut engine.state_mut().players[P0];
            me.gain(Resource::Megacredits, mc);
            me.gain(Resource::Steel, steel);
            me.production[Resource::Heat] = heat_production;
        }
        let before = engine.state().clone();

        match engine.play_card(P0, "Test Card") {
            Ok(outcome) => {
                prop_assert!(outcome.is_committed());
                prop_assert_eq!(engine.state().players[P0].stock[Resource::Plants], 2);
                prop_assert_eq!(engine.state().history.len(), 1);
            }
            Err(_) => prop_assert_eq!(engine.state(), &before),
        }
    }

    /// `can_play` never changes the state.
    #[test]
    fn prop_can_play_never_mutates(mc in 0u32..20, oxygen in 0u32..14) {
        let mut engine = engine_with_card(Cost::Megacredits(10), &[], vec![Effect::RaiseOxygen(1)]);
        engine.state_mut().players[P0].gain(Resource::Megacredits, mc);
        engine.state_mut().globals.oxygen = oxygen;
        let before = engine.state().clone();

        let verdict = engine.can_play(P0, "Test Card");
        prop_assert_eq!(verdict.is_ok(), mc >= 10);
        prop_assert_eq!(engine.state(), &before);
    }
}
