//! Card system: catalog entries, instances in play, and the registry.
//!
//! ## Key Types
//!
//! - `Card`: immutable catalog entry (cost, tags, requirements, effects)
//! - `Tag`, `CardKind`, `PointsRule`: catalog vocabulary
//! - `CardInstance`: one card in play with its resource counters
//! - `CardRegistry`: catalog lookup by name

pub mod definition;
pub mod instance;
pub mod registry;

pub use definition::{Card, CardKind, PointsRule, Tag};
pub use instance::CardInstance;
pub use registry::CardRegistry;
