//! Player moves and the move history.
//!
//! A move is what a player asks the engine to do. Its record keeps the
//! answers to every decision the move raised, so replaying the record
//! against the same starting state reproduces the same result.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::decision::Choice;

use super::ids::InstanceId;
use super::player::PlayerId;

/// Standard projects: fixed-price moves available to every player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardProject {
    /// +1 energy production.
    PowerPlant,
    /// Raise temperature one step.
    Asteroid,
    /// Place an ocean.
    Aquifer,
    /// Place a greenery (raises oxygen).
    Greenery,
    /// Place a city, +1 Megacredit production.
    City,
}

impl StandardProject {
    /// Megacredit price before rebates.
    #[must_use]
    pub const fn price(self) -> u32 {
        match self {
            StandardProject::PowerPlant => 11,
            StandardProject::Asteroid => 14,
            StandardProject::Aquifer => 18,
            StandardProject::Greenery => 23,
            StandardProject::City => 25,
        }
    }
}

/// A move.
///
/// ```
/// use terraform_engine::core::{InstanceId, Move};
///
/// let play = Move::PlayCard { card: "Mine".into() };
/// let act = Move::InvokeAction { instance: InstanceId::new(0), index: 0 };
/// assert_ne!(play, act);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    PlayCard { card: String },
    InvokeAction { instance: InstanceId, index: usize },
    StandardProject(StandardProject),
}

/// A committed move with the decisions that resolved it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub player: PlayerId,
    pub mv: Move,
    pub generation: u32,
    /// Decision answers in the order they were requested.
    /// Most moves raise no more than a handful.
    pub choices: SmallVec<[Choice; 4]>,
}

impl MoveRecord {
    #[must_use]
    pub fn new(player: PlayerId, mv: Move, generation: u32) -> Self {
        Self {
            player,
            mv,
            generation,
            choices: SmallVec::new(),
        }
    }

    /// Attach decision answers (builder pattern).
    #[must_use]
    pub fn with_choices(mut self, choices: &[Choice]) -> Self {
        self.choices = choices.iter().cloned().collect();
        self
    }

    /// Whether the move needed no decisions.
    #[must_use]
    pub fn is_unattended(&self) -> bool {
        self.choices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_project_prices() {
        assert_eq!(StandardProject::PowerPlant.price(), 11);
        assert_eq!(StandardProject::Asteroid.price(), 14);
        assert_eq!(StandardProject::Aquifer.price(), 18);
        assert_eq!(StandardProject::Greenery.price(), 23);
        assert_eq!(StandardProject::City.price(), 25);
    }

    #[test]
    fn test_record_choices() {
        let record = MoveRecord::new(PlayerId::new(0), Move::PlayCard { card: "Mine".into() }, 1);
        assert!(record.is_unattended());

        let record = record.with_choices(&[Choice::Branch(1)]);
        assert_eq!(record.choices.len(), 1);
        assert!(!record.choices.spilled());
    }
}
