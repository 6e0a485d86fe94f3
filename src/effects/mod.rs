//! Effect system: the card language and its interpreter.
//!
//! - `Effect`: the closed set of card language nodes
//! - `targeting`: pure candidate scans for directed effects
//! - `Resolver`: evaluates effects on a working copy of the state
//!
//! ## Design Philosophy
//!
//! The resolver never touches committed state. It evaluates on a
//! [`Working`] copy, stops with a [`Halt`] when it fails or needs a
//! player decision, and the engine publishes the copy only when a whole
//! move completes.

mod effect;
pub mod targeting;
mod resolver;

pub use effect::Effect;
pub use resolver::{
    check_card_spend, check_discard, check_mining_bonus, check_placement, check_production_change,
    check_spend, check_transform, metal_values, DeckOp, Frame, Halt, Resolver, Step, Working,
};
pub use targeting::TargetScan;
