//! Play legality and prices.
//!
//! - `requirements`: pure requirement checks with tolerance
//! - `modifiers`: standing and one-shot discounts, tolerances and passives
//! - `payment`: turning a price into a deterministic resource split

pub mod requirements;
pub mod modifiers;
pub mod payment;

pub use requirements::{check_requirements, Requirement};
pub use modifiers::{effective_cost, Modifier, ModifierBook, ModifierKind};
pub use payment::{buying_power, plan_payment, MetalValues, Payment};
