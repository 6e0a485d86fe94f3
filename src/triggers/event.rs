//! Game events that listeners react to.
//!
//! The only event cards listen for is a tag entering play. A card with
//! two Science tags produces two events.

use serde::{Deserialize, Serialize};

use crate::cards::Tag;
use crate::core::{InstanceId, PlayerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    /// `player` put a card carrying `tag` into play.
    TagPlayed {
        player: PlayerId,
        tag: Tag,
        /// The card that carried the tag.
        source: InstanceId,
    },
}

impl GameEvent {
    /// One event per tag on the card, duplicates included, in tag order.
    pub fn for_tags(player: PlayerId, source: InstanceId, tags: &[Tag]) -> Vec<GameEvent> {
        tags.iter()
            .map(|&tag| GameEvent::TagPlayed { player, tag, source })
            .collect()
    }

    #[must_use]
    pub fn player(&self) -> PlayerId {
        match self {
            GameEvent::TagPlayed { player, .. } => *player,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_tags_are_separate_events() {
        let events = GameEvent::for_tags(
            PlayerId::new(1),
            InstanceId::new(3),
            &[Tag::Science, Tag::Science, Tag::Space],
        );
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], events[1]);
        assert_eq!(events[2].player(), PlayerId::new(1));
    }
}
