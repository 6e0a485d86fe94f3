//! Engine error taxonomy.
//!
//! Every error leaves the committed state untouched: moves are evaluated
//! on a working copy and only published on success.

use thiserror::Error;

use crate::rules::Requirement;

use super::{CardResource, InstanceId, Resource};

/// What a player was short of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortfall {
    Stock(Resource),
    Production(Resource),
    CardResource(CardResource),
    /// Combined Megacredit value of money and accepted metals.
    BuyingPower,
}

impl std::fmt::Display for Shortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shortfall::Stock(r) => write!(f, "{r}"),
            Shortfall::Production(r) => write!(f, "{r} production"),
            Shortfall::CardResource(r) => write!(f, "{r} on card"),
            Shortfall::BuyingPower => write!(f, "buying power"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("requirement not met: {0:?}")]
    RequirementNotMet(Requirement),
    #[error("insufficient {what}: needed {needed}, have {available}")]
    InsufficientResources {
        what: Shortfall,
        needed: i64,
        available: i64,
    },
    #[error("invalid target: {0}")]
    InvalidTarget(String),
    #[error("invalid choice: {0}")]
    InvalidChoice(String),
    #[error("deck exhausted: requested {requested}, {available} left")]
    DeckExhausted { requested: usize, available: usize },
    #[error("protected resource: {0}")]
    ProtectedResource(String),
    #[error("unknown card {0}")]
    UnknownCard(String),
    #[error("card {0} is not in hand")]
    CardNotInHand(String),
    #[error("unknown card instance {0}")]
    UnknownInstance(InstanceId),
    #[error("card {card} has no action {index}")]
    NoSuchAction { card: String, index: usize },
    #[error("action {index} of {instance} already used this generation")]
    ActionAlreadyUsed { instance: InstanceId, index: usize },
    #[error("a decision is pending")]
    DecisionPending,
    #[error("no decision is pending")]
    NoPendingDecision,
    #[error("malformed card {card}: {reason}")]
    MalformedCard { card: String, reason: String },
    #[error("snapshot error: {0}")]
    Snapshot(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Shorthand for a stock shortfall.
    pub fn short_of(resource: Resource, needed: impl Into<i64>, available: impl Into<i64>) -> Self {
        Self::InsufficientResources {
            what: Shortfall::Stock(resource),
            needed: needed.into(),
            available: available.into(),
        }
    }
}

impl From<bincode::Error> for EngineError {
    fn from(value: bincode::Error) -> Self {
        Self::Snapshot(value.to_string())
    }
}
