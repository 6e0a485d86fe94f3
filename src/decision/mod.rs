//! Player decisions.
//!
//! Some effects cannot resolve without the player: which `OneOf` branch,
//! whose production to lower, which area gets the tile, which looked-at
//! cards to keep. The engine never blocks on these. It stops and returns a
//! [`DecisionRequest`] carrying the exact option set; the caller answers
//! with a [`Choice`] quoting the request id.
//!
//! Resumption replays the move from the committed state with every answer
//! given so far, held in a [`DecisionScript`]. Evaluation is
//! deterministic, so the replay reaches the same question and the new
//! answer is consumed there. Only questions with more than one legal
//! answer are asked.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::TileKind;
use crate::core::{AreaId, CardResource, DecisionId, EngineError, InstanceId, PlayerId, Resource};

/// Why a decision is being asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Purpose {
    ChooseBranch,
    /// Whose production absorbs a card's `any_production` delta.
    ProductionTarget(Resource),
    StealFrom(Resource),
    DestroyStock(Resource),
    DestroyCardResource(CardResource),
    AddToCard,
    /// Which card's production box to copy.
    CopyProduction,
    PlaceTile(TileKind),
    DiscardFromHand,
    TakeFromDeck,
    BuyFromDeck,
}

/// The legal answers to one decision.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Options {
    /// Branch indices `0..n`.
    Branches(usize),
    Players(Vec<PlayerId>),
    Cards(Vec<InstanceId>),
    Areas(Vec<AreaId>),
    /// Between `min` and `max` distinct indices into `items`.
    Pick {
        items: Vec<String>,
        min: usize,
        max: usize,
    },
}

/// An answer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    Branch(usize),
    Player(PlayerId),
    Card(InstanceId),
    Area(AreaId),
    Pick(Vec<usize>),
}

impl Options {
    /// The only legal answer, when there is exactly one.
    #[must_use]
    pub fn forced(&self) -> Option<Choice> {
        match self {
            Options::Branches(1) => Some(Choice::Branch(0)),
            Options::Players(p) if p.len() == 1 => Some(Choice::Player(p[0])),
            Options::Cards(c) if c.len() == 1 => Some(Choice::Card(c[0])),
            Options::Areas(a) if a.len() == 1 => Some(Choice::Area(a[0])),
            Options::Pick { max: 0, .. } => Some(Choice::Pick(Vec::new())),
            Options::Pick { items, min, .. } if *min >= items.len() => {
                Some(Choice::Pick((0..items.len()).collect()))
            }
            _ => None,
        }
    }

    /// Whether there is no legal answer at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Options::Branches(n) => *n == 0,
            Options::Players(p) => p.is_empty(),
            Options::Cards(c) => c.is_empty(),
            Options::Areas(a) => a.is_empty(),
            Options::Pick { items, min, max } => min > max || *min > items.len(),
        }
    }

    /// Check an answer against this exact option set.
    pub fn validate(&self, choice: &Choice) -> Result<(), EngineError> {
        let reject = |why: String| Err(EngineError::InvalidChoice(why));

        match (self, choice) {
            (Options::Branches(n), Choice::Branch(i)) => {
                if i >= n {
                    return reject(format!("branch {i} out of range 0..{n}"));
                }
            }
            (Options::Players(players), Choice::Player(p)) => {
                if !players.contains(p) {
                    return reject(format!("{p} is not offered"));
                }
            }
            (Options::Cards(cards), Choice::Card(c)) => {
                if !cards.contains(c) {
                    return reject(format!("{c} is not offered"));
                }
            }
            (Options::Areas(areas), Choice::Area(a)) => {
                if !areas.contains(a) {
                    return reject(format!("{a} is not offered"));
                }
            }
            (Options::Pick { items, min, max }, Choice::Pick(picked)) => {
                if picked.len() < *min || picked.len() > *max {
                    return reject(format!("pick {} items, expected {min}..={max}", picked.len()));
                }
                if let Some(bad) = picked.iter().find(|&&i| i >= items.len()) {
                    return reject(format!("index {bad} out of range 0..{}", items.len()));
                }
                let mut sorted = picked.clone();
                sorted.sort_unstable();
                sorted.dedup();
                if sorted.len() != picked.len() {
                    return reject("duplicate index".to_string());
                }
            }
            (options, choice) => {
                return reject(format!("{choice:?} does not answer {options:?}"));
            }
        }
        Ok(())
    }
}

/// A question raised during evaluation, before it gets an id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub player: PlayerId,
    pub purpose: Purpose,
    pub options: Options,
}

/// A pending decision handed to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub id: DecisionId,
    /// Who must answer.
    pub player: PlayerId,
    pub purpose: Purpose,
    pub options: Options,
}

impl DecisionRequest {
    #[must_use]
    pub fn new(id: DecisionId, question: Question) -> Self {
        Self {
            id,
            player: question.player,
            purpose: question.purpose,
            options: question.options,
        }
    }

    /// Check an answer's id and content.
    pub fn validate(&self, id: DecisionId, choice: &Choice) -> Result<(), EngineError> {
        if id != self.id {
            return Err(EngineError::InvalidChoice(format!(
                "{id} is stale, pending is {}",
                self.id
            )));
        }
        self.options.validate(choice)
    }
}

/// Answers consumed in order during one evaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecisionScript {
    answers: SmallVec<[Choice; 4]>,
    cursor: usize,
}

impl DecisionScript {
    #[must_use]
    pub fn new(answers: SmallVec<[Choice; 4]>) -> Self {
        Self { answers, cursor: 0 }
    }

    /// Next unconsumed answer.
    pub fn next_answer(&mut self) -> Option<Choice> {
        let answer = self.answers.get(self.cursor).cloned();
        if answer.is_some() {
            self.cursor += 1;
        }
        answer
    }

    /// Whether every answer has been consumed.
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.cursor >= self.answers.len()
    }
}
