//! Core engine types: ids, players, resources, state, moves, RNG,
//! configuration and errors.

pub mod ids;
pub mod player;
pub mod resource;
pub mod rng;
pub mod config;
pub mod error;
pub mod action;
pub mod state;

pub use ids::{AreaId, DecisionId, InstanceId, ListenerId};
pub use player::{PlayerId, PlayerMap};
pub use resource::{CardResource, Cost, Resource, ResourceMap};
pub use rng::{GameRng, GameRngState};
pub use config::{
    ActionUsePolicy, DeckExhaustionPolicy, EngineConfig, MissingTargetPolicy, PaymentPolicy,
};
pub use error::{EngineError, Shortfall};
pub use action::{Move, MoveRecord, StandardProject};
pub use state::{GameState, GlobalParameters, PlayerState};
