//! # terraform-engine
//!
//! Card effect resolution for a terraforming card game.
//!
//! ## Design Principles
//!
//! 1. **Transactional**: every move is evaluated on a snapshot and either
//!    commits completely or leaves the committed state untouched.
//!
//! 2. **N-Player First**: every API takes a `PlayerId`; nothing assumes
//!    two players.
//!
//! 3. **Configuration Over Convention**: rule variants the card data
//!    leaves open (deck exhaustion, action limits, payment order, missing
//!    targets) are `EngineConfig` policies.
//!
//! ## Architecture
//!
//! - **Closed card language**: `Effect` is one enum, matched exhaustively
//!   by the resolver.
//!
//! - **Persistent Data Structures**: O(1) cloning via `im-rs` makes
//!   snapshot-and-rollback the transaction mechanism.
//!
//! - **Decisions as request/response**: the engine never blocks on a
//!   player. It returns a `DecisionRequest` and resumes on `respond`.
//!
//! ## Modules
//!
//! - `core`: ids, players, resources, state, moves, RNG, configuration, errors
//! - `cards`: catalog entries, instances and the registry
//! - `board`: placement areas and tiles
//! - `rules`: requirements, discounts and payment
//! - `effects`: the card language and its resolver
//! - `triggers`: tag-played listeners
//! - `decision`: player decision requests and answers
//! - `deck`: the draw pile collaborator
//! - `engine`: the play orchestrator

pub mod core;
pub mod cards;
pub mod board;
pub mod rules;
pub mod effects;
pub mod triggers;
pub mod decision;
pub mod deck;
pub mod engine;

// Re-export commonly used types
pub use crate::core::{
    ActionUsePolicy, AreaId, CardResource, Cost, DeckExhaustionPolicy, DecisionId, EngineConfig,
    EngineError, GameRng, GameState, InstanceId, MissingTargetPolicy, Move, MoveRecord,
    PaymentPolicy, PlayerId, PlayerMap, Resource, StandardProject,
};

pub use crate::cards::{Card, CardInstance, CardKind, CardRegistry, PointsRule, Tag};

pub use crate::board::{Area, AreaRule, Board, CityKind, PlacementBonus, SpecialTile, TileKind};

pub use crate::rules::Requirement;

pub use crate::effects::Effect;

pub use crate::decision::{Choice, DecisionRequest, Options, Purpose};

pub use crate::deck::{Deck, VecDeck};

pub use crate::engine::{Engine, Outcome};
