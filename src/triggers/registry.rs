//! Trigger registry.
//!
//! Listeners live in an arena keyed by [`ListenerId`] and are indexed by
//! the card instance that registered them, so removing a card removes its
//! listeners in one call. Ids grow monotonically; iterating the arena in
//! id order is iterating in registration order.

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use crate::cards::Tag;
use crate::core::{InstanceId, ListenerId, PlayerId};
use crate::effects::Effect;

use super::event::GameEvent;

/// A live `OnOwnTagPlayed` listener.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listener {
    pub id: ListenerId,
    pub owner: PlayerId,
    /// The card that registered this listener.
    pub source: InstanceId,
    pub tag: Tag,
    pub effect: Effect,
}

impl Listener {
    /// Whether this listener reacts to `event`.
    #[must_use]
    pub fn matches(&self, event: &GameEvent) -> bool {
        match event {
            GameEvent::TagPlayed { player, tag, .. } => *player == self.owner && *tag == self.tag,
        }
    }
}

/// Registry for listeners.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRegistry {
    listeners: OrdMap<ListenerId, Listener>,

    /// Index by owning card.
    by_source: OrdMap<InstanceId, Vector<ListenerId>>,

    next_id: u32,
}

impl TriggerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener, returns its id.
    pub fn register(
        &mut self,
        owner: PlayerId,
        source: InstanceId,
        tag: Tag,
        effect: Effect,
    ) -> ListenerId {
        let id = ListenerId::new(self.next_id);
        self.next_id += 1;

        self.by_source.entry(source).or_default().push_back(id);
        self.listeners.insert(
            id,
            Listener {
                id,
                owner,
                source,
                tag,
                effect,
            },
        );
        id
    }

    /// Unregister one listener.
    pub fn unregister(&mut self, id: ListenerId) -> Option<Listener> {
        let listener = self.listeners.remove(&id)?;
        if let Some(ids) = self.by_source.get_mut(&listener.source) {
            ids.retain(|&l| l != id);
            if ids.is_empty() {
                self.by_source.remove(&listener.source);
            }
        }
        Some(listener)
    }

    /// Remove every listener a card registered; returns how many.
    pub fn remove_for_source(&mut self, source: InstanceId) -> usize {
        let Some(ids) = self.by_source.remove(&source) else {
            return 0;
        };
        for id in &ids {
            self.listeners.remove(id);
        }
        ids.len()
    }

    #[must_use]
    pub fn get(&self, id: ListenerId) -> Option<&Listener> {
        self.listeners.get(&id)
    }

    /// Listeners that fire for `event`, in registration order.
    pub fn find_listeners(&self, event: &GameEvent) -> Vec<Listener> {
        self.listeners
            .values()
            .filter(|l| l.matches(event))
            .cloned()
            .collect()
    }

    /// Listeners registered by one card.
    pub fn listeners_for_source(&self, source: InstanceId) -> Vec<&Listener> {
        self.by_source
            .get(&source)
            .into_iter()
            .flatten()
            .filter_map(|id| self.listeners.get(id))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
