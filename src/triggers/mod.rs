//! Trigger system for tag-played listeners.
//!
//! ## Key Components
//!
//! - [`GameEvent`]: a tag entering play
//! - [`Listener`]: a live `OnOwnTagPlayed` effect owned by a card
//! - [`TriggerRegistry`]: listener arena with a per-card index
//!
//! ## Example Usage
//!
//! ```
//! use terraform_engine::cards::Tag;
//! use terraform_engine::core::{InstanceId, PlayerId};
//! use terraform_engine::effects::Effect;
//! use terraform_engine::triggers::{GameEvent, TriggerRegistry};
//!
//! let mut registry = TriggerRegistry::new();
//!
//! // "When you play a Science tag, draw a card"
//! registry.register(PlayerId::new(0), InstanceId::new(3), Tag::Science, Effect::DrawCard(1));
//!
//! let event = GameEvent::TagPlayed {
//!     player: PlayerId::new(0),
//!     tag: Tag::Science,
//!     source: InstanceId::new(7),
//! };
//! assert_eq!(registry.find_listeners(&event).len(), 1);
//!
//! // Triggers never fire for an opponent's tags.
//! let theirs = GameEvent::TagPlayed {
//!     player: PlayerId::new(1),
//!     tag: Tag::Science,
//!     source: InstanceId::new(8),
//! };
//! assert!(registry.find_listeners(&theirs).is_empty());
//! ```
//!
//! Dispatch itself happens in the resolver, which runs each listener's
//! effect atomically and skips the ones that fail.

mod event;
mod registry;

pub use event::GameEvent;
pub use registry::{Listener, TriggerRegistry};
