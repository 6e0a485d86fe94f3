//! Play requirements.
//!
//! A card's requirements are ANDed. Checking is a pure function of the
//! state; nothing is consumed here. Requirement tolerance loosens only the
//! global-parameter thresholds, by whole parameter steps, and never past
//! the parameter's natural range.

use serde::{Deserialize, Serialize};

use crate::cards::Tag;
use crate::core::{EngineError, GameState, GlobalParameters, PlayerId, Resource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Requirement {
    MinTags(Tag, u32),
    MinProduction(Resource, i32),
    /// Degrees Celsius.
    MinTemperature(i32),
    MaxTemperature(i32),
    /// Percent.
    MinOxygen(u32),
    MaxOxygen(u32),
    MinOceans(u32),
    MaxOceans(u32),
    MinCities(u32),
    MinGreeneries(u32),
}

impl Requirement {
    /// Whether `player` meets this requirement with `tolerance` steps of slack.
    #[must_use]
    pub fn is_met(&self, player: PlayerId, state: &GameState, tolerance: u32) -> bool {
        let globals = &state.globals;
        let temp_slack = i32::try_from(tolerance)
            .unwrap_or(i32::MAX)
            .saturating_mul(GlobalParameters::TEMPERATURE_STEP);
        let Some(me) = state.players.get(player) else {
            return false;
        };

        match *self {
            Requirement::MinTags(tag, n) => me.tag_count(tag) >= n,
            Requirement::MinProduction(resource, n) => me.production[resource] >= n,
            Requirement::MinTemperature(n) => {
                let threshold = n.saturating_sub(temp_slack).max(GlobalParameters::MIN_TEMPERATURE);
                globals.temperature >= threshold
            }
            Requirement::MaxTemperature(n) => {
                let threshold = n.saturating_add(temp_slack).min(GlobalParameters::MAX_TEMPERATURE);
                globals.temperature <= threshold
            }
            Requirement::MinOxygen(n) => globals.oxygen >= n.saturating_sub(tolerance),
            Requirement::MaxOxygen(n) => {
                globals.oxygen <= n.saturating_add(tolerance).min(GlobalParameters::MAX_OXYGEN)
            }
            Requirement::MinOceans(n) => globals.oceans >= n.saturating_sub(tolerance),
            Requirement::MaxOceans(n) => {
                globals.oceans <= n.saturating_add(tolerance).min(GlobalParameters::MAX_OCEANS)
            }
            Requirement::MinCities(n) => state.board.cities_of(player) >= n,
            Requirement::MinGreeneries(n) => state.board.greeneries_of(player) >= n,
        }
    }
}

/// Check every requirement; the first failing one is reported.
pub fn check_requirements(
    requirements: &[Requirement],
    player: PlayerId,
    state: &GameState,
    tolerance: u32,
) -> Result<(), EngineError> {
    match requirements
        .iter()
        .find(|r| !r.is_met(player, state, tolerance))
    {
        Some(failed) => Err(EngineError::RequirementNotMet(*failed)),
        None => Ok(()),
    }
}
