//! Engine-level integration tests: standard projects, the production
//! phase, card points, removal protection and snapshots.

use terraform_engine::board::{
    Area, AreaRule, Board, CityKind, PlacedTile, PlacementBonus, SpecialTile, TileKind,
};
use terraform_engine::cards::{Card, CardKind, CardRegistry, PointsRule, Tag};
use terraform_engine::core::{
    ActionUsePolicy, AreaId, CardResource, Cost, EngineConfig, EngineError, GameState,
    GlobalParameters, InstanceId, MissingTargetPolicy, Move, PlayerId, Resource, StandardProject,
};
use terraform_engine::decision::{Choice, Options, Purpose};
use terraform_engine::deck::VecDeck;
use terraform_engine::effects::Effect;
use terraform_engine::engine::Engine;
use terraform_engine::rules::Requirement;

const P0: PlayerId = PlayerId::new(0);
const P1: PlayerId = PlayerId::new(1);

fn catalog() -> CardRegistry {
    let mut registry = CardRegistry::new();
    registry
        .register_all([
            Card::new("Standard Technology", CardKind::Automatic, Cost::Megacredits(6))
                .with_tags(&[Tag::Science])
                .with_effect(Effect::RebateForStandardProjects(3)),
            Card::new("Birds", CardKind::Active, Cost::Megacredits(10))
                .with_tags(&[Tag::Animal])
                .with_requirement(Requirement::MinOxygen(13))
                .with_points(PointsRule::PerCardResource(1, 1, CardResource::Animal))
                .with_action(Effect::AddResourceToSameCard(CardResource::Animal, 1)),
            Card::new("Ganymede Colony", CardKind::Automatic, Cost::Space(20))
                .with_tags(&[Tag::Jovian, Tag::Space, Tag::City])
                .with_points(PointsRule::PerTag(1, 1, Tag::Jovian))
                .with_impact(Effect::PlaceCity(
                    CityKind::GanymedeColony,
                    AreaRule::Reserved("Ganymede Colony".into()),
                )),
            Card::new("Heat Trappers", CardKind::Automatic, Cost::Building(6))
                .with_tags(&[Tag::Power, Tag::Building])
                .with_points(PointsRule::Immediate(-1))
                .with_any_production(Resource::Heat, -2)
                .with_own_production(Resource::Energy, 1),
            Card::new("Mining Area", CardKind::Automatic, Cost::Building(4))
                .with_tags(&[Tag::Building])
                .with_impact(Effect::PlaceSpecialTile(
                    SpecialTile::MiningArea,
                    AreaRule::MetalBonus,
                ))
                .with_impact(Effect::GainMiningProductionMatchingPlacementBonus(1)),
            Card::new("Protected Habitats", CardKind::Automatic, Cost::Megacredits(5)).with_effect(
                Effect::CannotRemoveAnyCardResources(vec![
                    CardResource::Animal,
                    CardResource::Plant,
                    CardResource::Microbe,
                ]),
            ),
            Card::new("Hunt", CardKind::Event, Cost::Megacredits(2))
                .with_tags(&[Tag::Event])
                .with_impact(Effect::DestroyAnyCardResource(CardResource::Animal, 2)),
            Card::new("Sabotage", CardKind::Event, Cost::Megacredits(1))
                .with_tags(&[Tag::Event])
                .with_impact(Effect::DestroyAnyResource(Resource::Plants, 3)),
            Card::new("Immigration Shuttles", CardKind::Automatic, Cost::Space(31))
                .with_tags(&[Tag::Earth, Tag::Space])
                .with_own_production(Resource::Megacredits, 5)
                .with_points(PointsRule::PerNCities(3)),
            Card::new("City Registry", CardKind::Automatic, Cost::Megacredits(8))
                .with_points(PointsRule::PerCity(1)),
            Card::new("Search For Life", CardKind::Active, Cost::Megacredits(3))
                .with_tags(&[Tag::Science])
                .with_points(PointsRule::IfAnyCardResource(3, CardResource::Science))
                .with_action(Effect::AddResourceToSameCard(CardResource::Science, 1)),
        ])
        .unwrap();
    registry
}

fn engine_with(config: EngineConfig) -> Engine {
    let board = Board::uniform(2, 1)
        .with_area(Area::land(3).with_bonus(PlacementBonus::Resource(Resource::Titanium, 1)))
        .with_area(Area::off_world(4, "Ganymede Colony"));
    let mut engine = Engine::new(config, catalog(), VecDeck::default()).with_board(board);
    for player in [P0, P1] {
        let me = &mut engine.state_mut().players[player];
        me.gain(Resource::Megacredits, 100);
        for card in catalog().iter() {
            me.hand.push_back(card.name.clone());
        }
    }
    engine
}

fn engine() -> Engine {
    engine_with(EngineConfig::new(2))
}

fn last_played(engine: &Engine, player: PlayerId) -> InstanceId {
    *engine.state().players[player].played.last().unwrap()
}

/// Test the power plant standard project.
#[test]
fn test_power_plant_project() {
    let mut engine = engine();
    engine.standard_project(P0, StandardProject::PowerPlant).unwrap();

    let me = &engine.state().players[P0];
    assert_eq!(me.stock[Resource::Megacredits], 89);
    assert_eq!(me.production[Resource::Energy], 1);
    assert_eq!(
        engine.state().history.last().unwrap().mv,
        Move::StandardProject(StandardProject::PowerPlant)
    );
}

/// Test the standing rebate after a standard project.
#[test]
fn test_project_rebate() {
    let mut engine = engine();
    engine.play_card(P0, "Standard Technology").unwrap();
    engine.standard_project(P0, StandardProject::PowerPlant).unwrap();

    // 100 - 6 - 11 + 3
    assert_eq!(engine.state().players[P0].stock[Resource::Megacredits], 86);
}

/// Test that standard projects are paid in money only.
#[test]
fn test_project_needs_money() {
    let mut engine = engine();
    engine.state_mut().players[P0].stock[Resource::Megacredits] = 10;
    engine.state_mut().players[P0].gain(Resource::Steel, 5);
    let before = engine.state().clone();

    let err = engine.standard_project(P0, StandardProject::PowerPlant).unwrap_err();
    assert!(matches!(err, EngineError::InsufficientResources { .. }));
    assert_eq!(engine.state(), &before);
}

/// Test aquifers until the last ocean area is used.
#[test]
fn test_aquifer_until_no_area_left() {
    let mut engine = engine();
    engine.standard_project(P0, StandardProject::Aquifer).unwrap();
    assert_eq!(engine.state().globals.oceans, 1);
    assert_eq!(engine.state().players[P0].terraform_rating, 21);

    let before = engine.state().clone();
    let err = engine.standard_project(P0, StandardProject::Aquifer).unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget(_)));
    assert_eq!(engine.state(), &before);
}

/// Test that projects raising a maxed parameter are rejected.
#[test]
fn test_maxed_parameters_reject_projects() {
    let mut engine = engine();
    engine.state_mut().globals.temperature = GlobalParameters::MAX_TEMPERATURE;
    engine.state_mut().globals.oceans = GlobalParameters::MAX_OCEANS;

    let err = engine.standard_project(P0, StandardProject::Asteroid).unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget(_)));
    let err = engine.standard_project(P0, StandardProject::Aquifer).unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget(_)));
    assert_eq!(engine.state().players[P0].stock[Resource::Megacredits], 100);
}

/// Test the city project asking where to place the city.
#[test]
fn test_city_project_asks_for_an_area() {
    let mut engine = engine();
    let outcome = engine.standard_project(P0, StandardProject::City).unwrap();
    let request = outcome.request().unwrap().clone();
    assert_eq!(request.purpose, Purpose::PlaceTile(TileKind::City(CityKind::RegularCity)));
    assert_eq!(
        request.options,
        Options::Areas(vec![AreaId::new(0), AreaId::new(1), AreaId::new(3)])
    );

    engine.respond(request.id, Choice::Area(AreaId::new(3))).unwrap();
    let state = engine.state();
    assert_eq!(state.board.cities_of(P0), 1);
    assert_eq!(state.players[P0].production[Resource::Megacredits], 1);
    // The area bonus goes to whoever placed the tile.
    assert_eq!(state.players[P0].stock[Resource::Titanium], 1);
    assert_eq!(state.players[P0].stock[Resource::Megacredits], 75);
}

/// Test the greenery project raising oxygen and rating.
#[test]
fn test_greenery_project_raises_oxygen() {
    let mut engine = engine();
    let outcome = engine.standard_project(P0, StandardProject::Greenery).unwrap();
    let id = outcome.request().unwrap().id;
    engine.respond(id, Choice::Area(AreaId::new(0))).unwrap();

    assert_eq!(engine.state().globals.oxygen, 1);
    assert_eq!(engine.state().board.greeneries_of(P0), 1);
    assert_eq!(engine.state().players[P0].terraform_rating, 21);
}

/// Test mining production following the placed area's metal bonus.
#[test]
fn test_mining_area_matches_bonus() {
    let mut engine = engine();
    engine.play_card(P0, "Mining Area").unwrap();

    let me = &engine.state().players[P0];
    assert_eq!(me.stock[Resource::Titanium], 1);
    assert_eq!(me.production[Resource::Titanium], 1);
    assert_eq!(me.production[Resource::Steel], 0);
}

/// Test the production phase at the end of a generation.
#[test]
fn test_production_phase() {
    let mut engine = engine();
    {
        let me = &mut engine.state_mut().players[P0];
        me.stock[Resource::Megacredits] = 5;
        me.production[Resource::Megacredits] = -2;
        me.stock[Resource::Energy] = 3;
        me.production[Resource::Energy] = 1;
        me.production[Resource::Heat] = 2;
        me.production[Resource::Plants] = 1;
    }
    let generation = engine.state().generation;

    engine.advance_generation().unwrap();
    let me = &engine.state().players[P0];
    assert_eq!(me.stock[Resource::Megacredits], 23);
    assert_eq!(me.stock[Resource::Energy], 1);
    assert_eq!(me.stock[Resource::Heat], 5);
    assert_eq!(me.stock[Resource::Plants], 1);
    assert_eq!(engine.state().generation, generation + 1);
}

/// Test that negative money production never drives the stock below zero.
#[test]
fn test_income_never_negative() {
    let mut engine = engine();
    {
        let me = &mut engine.state_mut().players[P0];
        me.stock[Resource::Megacredits] = 0;
        me.terraform_rating = 0;
        me.production[Resource::Megacredits] = -5;
    }
    engine.advance_generation().unwrap();
    assert_eq!(engine.state().players[P0].stock[Resource::Megacredits], 0);
}

/// Test actions limited to once per generation.
#[test]
fn test_once_per_generation_actions() {
    let config = EngineConfig::new(2).with_action_use(ActionUsePolicy::OncePerGeneration);
    let mut engine = engine_with(config);
    engine.state_mut().globals.oxygen = 13;
    engine.play_card(P0, "Birds").unwrap();
    let birds = last_played(&engine, P0);

    engine.invoke_action(P0, birds, 0).unwrap();
    let err = engine.invoke_action(P0, birds, 0).unwrap_err();
    assert_eq!(err, EngineError::ActionAlreadyUsed { instance: birds, index: 0 });

    engine.advance_generation().unwrap();
    engine.invoke_action(P0, birds, 0).unwrap();
    assert_eq!(engine.state().instance(birds).unwrap().count(CardResource::Animal), 2);
}

/// Test repeated actions under the default policy.
#[test]
fn test_unlimited_actions_by_default() {
    let mut engine = engine();
    engine.state_mut().globals.oxygen = 13;
    engine.play_card(P0, "Birds").unwrap();
    let birds = last_played(&engine, P0);

    for _ in 0..3 {
        engine.invoke_action(P0, birds, 0).unwrap();
    }
    assert_eq!(engine.card_points(birds).unwrap(), 3);
}

/// Test invoking an action that does not exist or is not the actor's.
#[test]
fn test_action_errors() {
    let mut engine = engine();
    engine.state_mut().globals.oxygen = 13;
    engine.play_card(P0, "Birds").unwrap();
    let birds = last_played(&engine, P0);

    assert_eq!(
        engine.invoke_action(P0, birds, 1).unwrap_err(),
        EngineError::NoSuchAction { card: "Birds".into(), index: 1 }
    );
    assert!(matches!(
        engine.invoke_action(P1, birds, 0).unwrap_err(),
        EngineError::InvalidTarget(_)
    ));
    assert_eq!(
        engine.invoke_action(P0, InstanceId::new(99), 0).unwrap_err(),
        EngineError::UnknownInstance(InstanceId::new(99))
    );
}

/// Test fixed and per-tag card points.
#[test]
fn test_card_points() {
    let mut engine = engine();
    engine.state_mut().players[P1].production[Resource::Heat] = 2;

    engine.play_card(P0, "Ganymede Colony").unwrap();
    let colony = last_played(&engine, P0);
    assert_eq!(engine.state().board.cities_of(P0), 1);
    assert_eq!(engine.card_points(colony).unwrap(), 1);

    engine.play_card(P0, "Heat Trappers").unwrap();
    let trappers = last_played(&engine, P0);
    assert_eq!(engine.card_points(trappers).unwrap(), -1);

    engine.play_card(P0, "Mining Area").unwrap();
    assert_eq!(engine.points_from_cards(P0).unwrap(), 0);
}

/// Test city-counting points: every city counts, whoever owns it and
/// whether or not it is on Mars.
#[test]
fn test_points_per_city() {
    let mut engine = engine();
    engine.play_card(P0, "Immigration Shuttles").unwrap();
    let shuttles = last_played(&engine, P0);
    engine.play_card(P0, "City Registry").unwrap();
    let registry = last_played(&engine, P0);
    assert_eq!(engine.card_points(shuttles).unwrap(), 0);
    assert_eq!(engine.card_points(registry).unwrap(), 0);

    engine.play_card(P0, "Ganymede Colony").unwrap();
    for area in [0, 1] {
        let tile = PlacedTile { kind: TileKind::City(CityKind::RegularCity), owner: Some(P1) };
        engine.state_mut().board.place(AreaId::new(area), &AreaRule::Land, tile).unwrap();
    }
    assert_eq!(engine.state().board.cities(), 3);
    assert_eq!(engine.state().board.cities_on_mars(), 2);

    assert_eq!(engine.card_points(shuttles).unwrap(), 1);
    assert_eq!(engine.card_points(registry).unwrap(), 3);
}

/// Test points that only count while the card holds a resource.
#[test]
fn test_points_if_any_card_resource() {
    let mut engine = engine();
    engine.play_card(P0, "Search For Life").unwrap();
    let search = last_played(&engine, P0);
    assert_eq!(engine.card_points(search).unwrap(), 0);

    engine.invoke_action(P0, search, 0).unwrap();
    assert_eq!(engine.card_points(search).unwrap(), 3);
    engine.invoke_action(P0, search, 0).unwrap();
    assert_eq!(engine.card_points(search).unwrap(), 3);
}

/// Test that an unmet requirement blocks the play.
#[test]
fn test_requirement_blocks_play() {
    let mut engine = engine();
    let err = engine.play_card(P0, "Birds").unwrap_err();
    assert_eq!(err, EngineError::RequirementNotMet(Requirement::MinOxygen(13)));
}

/// Test removing a card along with everything it registered.
#[test]
fn test_remove_from_play() {
    let mut engine = engine();
    engine.play_card(P0, "Standard Technology").unwrap();
    let tech = last_played(&engine, P0);
    assert_eq!(engine.state().modifiers.standing_len(), 1);

    engine.remove_from_play(tech).unwrap();
    let state = engine.state();
    assert!(state.instance(tech).is_err());
    assert!(state.players[P0].played.is_empty());
    assert_eq!(state.players[P0].tag_count(Tag::Science), 0);
    assert_eq!(state.modifiers.standing_len(), 0);
    assert_eq!(engine.deck().discard_pile(), &["Standard Technology".to_string()]);

    engine.standard_project(P0, StandardProject::PowerPlant).unwrap();
    assert_eq!(engine.state().players[P0].stock[Resource::Megacredits], 83);
}

/// P1 plays Birds and stores two animals on it.
fn engine_with_birds(config: EngineConfig) -> (Engine, InstanceId) {
    let mut engine = engine_with(config);
    engine.state_mut().globals.oxygen = 13;
    engine.play_card(P1, "Birds").unwrap();
    let birds = last_played(&engine, P1);
    engine.invoke_action(P1, birds, 0).unwrap();
    engine.invoke_action(P1, birds, 0).unwrap();
    (engine, birds)
}

/// Test removing resources from an opponent's card.
#[test]
fn test_destroy_card_resource() {
    let (mut engine, birds) = engine_with_birds(EngineConfig::new(2));
    engine.play_card(P0, "Hunt").unwrap();
    assert_eq!(engine.state().instance(birds).unwrap().count(CardResource::Animal), 0);
}

/// Test that protected card resources cannot be removed by opponents.
#[test]
fn test_protected_card_resource() {
    let (mut engine, birds) = engine_with_birds(EngineConfig::new(2));
    engine.play_card(P1, "Protected Habitats").unwrap();
    let before = engine.state().clone();

    let err = engine.play_card(P0, "Hunt").unwrap_err();
    assert!(matches!(err, EngineError::ProtectedResource(_)));
    assert_eq!(engine.state(), &before);
    assert_eq!(engine.state().instance(birds).unwrap().count(CardResource::Animal), 2);
}

/// Test protection with the skip policy for missing targets.
#[test]
fn test_protection_with_skip_policy() {
    let config = EngineConfig::new(2).with_missing_target(MissingTargetPolicy::Skip);
    let (mut engine, birds) = engine_with_birds(config);
    engine.play_card(P1, "Protected Habitats").unwrap();

    engine.play_card(P0, "Hunt").unwrap();
    assert_eq!(engine.state().instance(birds).unwrap().count(CardResource::Animal), 2);
    assert_eq!(engine.state().players[P0].stock[Resource::Megacredits], 98);
}

/// Test that protecting plants on cards also shelters the plant stock.
#[test]
fn test_plant_protection_covers_stock() {
    let mut engine = engine();
    engine.state_mut().players[P1].gain(Resource::Plants, 4);
    engine.play_card(P1, "Protected Habitats").unwrap();

    let err = engine.play_card(P0, "Sabotage").unwrap_err();
    assert!(matches!(err, EngineError::ProtectedResource(_)));

    // The actor's own stock is never shielded from themselves.
    engine.state_mut().players[P0].gain(Resource::Plants, 2);
    engine.play_card(P0, "Sabotage").unwrap();
    assert_eq!(engine.state().players[P0].stock[Resource::Plants], 0);
    assert_eq!(engine.state().players[P1].stock[Resource::Plants], 4);
}

/// Test that `can_play` never changes the state.
#[test]
fn test_can_play_is_pure() {
    let engine = engine();
    let before = engine.state().clone();

    assert!(engine.can_play(P0, "Ganymede Colony").is_ok());
    assert!(engine.can_play(P0, "Birds").is_err());
    assert_eq!(
        engine.can_play(P0, "Nothing").unwrap_err(),
        EngineError::UnknownCard("Nothing".into())
    );
    assert_eq!(engine.state(), &before);
}

/// Test restoring a game from a binary snapshot.
#[test]
fn test_snapshot_round_trip() {
    let mut engine = engine();
    engine.play_card(P0, "Standard Technology").unwrap();
    engine.play_card(P0, "Ganymede Colony").unwrap();

    let bytes = engine.state().to_bytes().unwrap();
    let restored = GameState::from_bytes(&bytes).unwrap();
    assert_eq!(&restored, engine.state());
    assert_eq!(restored.history.len(), 2);

    assert!(matches!(GameState::from_bytes(&bytes[..4]), Err(EngineError::Snapshot(_))));
}
