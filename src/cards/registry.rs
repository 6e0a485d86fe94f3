//! Card registry for catalog lookup.
//!
//! The `CardRegistry` holds every catalog entry a game can use, keyed by
//! card name. Entries are validated on the way in.

use rustc_hash::FxHashMap;

use crate::core::EngineError;

use super::definition::Card;

/// Registry of catalog entries.
///
/// ## Example
///
/// ```
/// use terraform_engine::cards::{Card, CardKind, CardRegistry};
/// use terraform_engine::core::Cost;
///
/// let mut registry = CardRegistry::new();
/// registry.register(Card::new("Sponsors", CardKind::Automatic, Cost::Megacredits(6))).unwrap();
///
/// assert_eq!(registry.get("Sponsors").unwrap().cost, Cost::Megacredits(6));
/// assert!(registry.get("Unknown").is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<String, Card>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a card. Names must be unique.
    pub fn register(&mut self, card: Card) -> Result<(), EngineError> {
        card.validate()?;
        if self.cards.contains_key(&card.name) {
            return Err(EngineError::MalformedCard {
                card: card.name,
                reason: "duplicate name".to_string(),
            });
        }
        self.cards.insert(card.name.clone(), card);
        Ok(())
    }

    /// Register every card, stopping at the first invalid one.
    pub fn register_all(
        &mut self,
        cards: impl IntoIterator<Item = Card>,
    ) -> Result<(), EngineError> {
        cards.into_iter().try_for_each(|card| self.register(card))
    }

    /// Look up a card by name.
    pub fn get(&self, name: &str) -> Result<&Card, EngineError> {
        self.cards
            .get(name)
            .ok_or_else(|| EngineError::UnknownCard(name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.cards.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all cards.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardKind, Tag};
    use crate::core::Cost;

    #[test]
    fn test_register_and_get() {
        let mut registry = CardRegistry::new();
        let mine =
            Card::new("Mine", CardKind::Automatic, Cost::Building(4)).with_tags(&[Tag::Building]);
        registry.register(mine).unwrap();

        assert!(registry.contains("Mine"));
        assert_eq!(registry.len(), 1);
        assert!(matches!(registry.get("Nope"), Err(EngineError::UnknownCard(_))));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = CardRegistry::new();
        let card = Card::new("Sponsors", CardKind::Automatic, Cost::Megacredits(6));
        registry.register(card.clone()).unwrap();
        let err = registry.register(card).unwrap_err();
        assert!(matches!(err, EngineError::MalformedCard { .. }));
    }

    #[test]
    fn test_invalid_card_rejected() {
        let mut registry = CardRegistry::new();
        let err = registry
            .register(Card::new("Mine", CardKind::Automatic, Cost::Building(4)))
            .unwrap_err();
        assert!(matches!(err, EngineError::MalformedCard { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_all() {
        let mut registry = CardRegistry::new();
        registry
            .register_all(vec![
                Card::new("A", CardKind::Automatic, Cost::Megacredits(1)),
                Card::new("B", CardKind::Automatic, Cost::Megacredits(2)),
            ])
            .unwrap();
        assert_eq!(registry.iter().count(), 2);
    }
}
