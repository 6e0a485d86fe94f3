//! The draw pile collaborator.
//!
//! The engine does not own the deck. It talks to it through [`Deck`],
//! and while a move is being evaluated it only ever peeks: draws, buys
//! and discards are recorded and replayed against the deck once the move
//! commits. A move that fails or stops for a decision leaves the deck
//! untouched.
//!
//! [`VecDeck`] is the reference implementation: a seeded shuffle of card
//! names, no reshuffle of the discard pile.

use tracing::trace;

use crate::core::{EngineError, GameRng};

/// Source of cards for draw, look and buy effects.
pub trait Deck {
    /// Remove the top `n` cards. Fails with `DeckExhausted` when fewer
    /// than `n` remain, leaving the deck unchanged.
    fn draw(&mut self, n: usize) -> Result<Vec<String>, EngineError>;

    /// The top `n` cards or fewer, top first, without removing them.
    fn peek(&self, n: usize) -> Vec<String>;

    /// Record a purchase of a card previously drawn.
    fn buy(&mut self, card: &str, price: u32);

    /// Put cards on the discard pile.
    fn discard(&mut self, cards: Vec<String>);

    fn remaining(&self) -> usize;
}

/// A shuffled list of card names.
///
/// ```
/// use terraform_engine::deck::{Deck, VecDeck};
///
/// let mut deck = VecDeck::new(["Mine", "Sponsors", "Research"]);
/// assert_eq!(deck.peek(2), vec!["Mine".to_string(), "Sponsors".to_string()]);
/// assert_eq!(deck.draw(1).unwrap(), vec!["Mine".to_string()]);
/// assert_eq!(deck.remaining(), 2);
/// assert!(deck.draw(3).is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VecDeck {
    /// Top of the pile first.
    draw_pile: Vec<String>,
    discard_pile: Vec<String>,
    purchases: Vec<(String, u32)>,
}

impl VecDeck {
    /// A deck in the given order, first card on top.
    pub fn new<S: Into<String>>(cards: impl IntoIterator<Item = S>) -> Self {
        Self {
            draw_pile: cards.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A deck shuffled with `rng`. The same seed always gives the same order.
    pub fn shuffled<S: Into<String>>(
        cards: impl IntoIterator<Item = S>,
        rng: &mut GameRng,
    ) -> Self {
        let mut deck = Self::new(cards);
        rng.shuffle(&mut deck.draw_pile);
        deck
    }

    #[must_use]
    pub fn discard_pile(&self) -> &[String] {
        &self.discard_pile
    }

    /// Every purchase so far with the price paid.
    #[must_use]
    pub fn purchases(&self) -> &[(String, u32)] {
        &self.purchases
    }
}

impl Deck for VecDeck {
    fn draw(&mut self, n: usize) -> Result<Vec<String>, EngineError> {
        if n > self.draw_pile.len() {
            return Err(EngineError::DeckExhausted {
                requested: n,
                available: self.draw_pile.len(),
            });
        }
        let drawn: Vec<String> = self.draw_pile.drain(..n).collect();
        trace!(count = n, left = self.draw_pile.len(), "drew from deck");
        Ok(drawn)
    }

    fn peek(&self, n: usize) -> Vec<String> {
        self.draw_pile.iter().take(n).cloned().collect()
    }

    fn buy(&mut self, card: &str, price: u32) {
        self.purchases.push((card.to_string(), price));
    }

    fn discard(&mut self, cards: Vec<String>) {
        self.discard_pile.extend(cards);
    }

    fn remaining(&self) -> usize {
        self.draw_pile.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_takes_from_top() {
        let mut deck = VecDeck::new(["A", "B", "C"]);
        assert_eq!(deck.draw(2).unwrap(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(deck.peek(5), vec!["C".to_string()]);
    }

    #[test]
    fn test_exhausted_draw_leaves_deck() {
        let mut deck = VecDeck::new(["A"]);
        let err = deck.draw(2).unwrap_err();
        assert_eq!(err, EngineError::DeckExhausted { requested: 2, available: 1 });
        assert_eq!(deck.remaining(), 1);
    }

    #[test]
    fn test_discard_and_buy_are_recorded() {
        let mut deck = VecDeck::new(["A", "B"]);
        let cards = deck.draw(2).unwrap();
        deck.buy(&cards[0], 3);
        deck.discard(vec![cards[1].clone()]);
        assert_eq!(deck.purchases(), &[("A".to_string(), 3)]);
        assert_eq!(deck.discard_pile(), &["B".to_string()]);
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let names: Vec<String> = (0..20).map(|i| format!("card {i}")).collect();
        let a = VecDeck::shuffled(names.clone(), &mut GameRng::new(11).for_context("deck"));
        let b = VecDeck::shuffled(names.clone(), &mut GameRng::new(11).for_context("deck"));
        assert_eq!(a, b);
        assert_eq!(a.remaining(), 20);
    }
}
