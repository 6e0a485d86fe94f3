//! Game state: players, global parameters and everything in play.
//!
//! ## Persistent Data Structures
//!
//! Every collection here is an `im` structure, so cloning a `GameState`
//! is O(1) with structural sharing. The engine evaluates each move on a
//! clone and swaps it in only on success; a failed move simply drops the
//! clone.

use im::{OrdMap, OrdSet, Vector};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::cards::{CardInstance, Tag};
use crate::rules::ModifierBook;
use crate::triggers::TriggerRegistry;

use super::action::MoveRecord;
use super::config::EngineConfig;
use super::error::EngineError;
use super::ids::InstanceId;
use super::player::{PlayerId, PlayerMap};
use super::resource::{Resource, ResourceMap};

/// One player's economy and cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,

    /// Resource stock. Never negative.
    pub stock: ResourceMap<u32>,

    /// Production tracks. Only Megacredits may drop below zero.
    pub production: ResourceMap<i32>,

    pub terraform_rating: u32,

    /// Tags of cards that stayed in play. Event tags are not counted.
    pub tags: OrdMap<Tag, u32>,

    /// Card names in hand, in draw order.
    pub hand: Vector<String>,

    /// Instances in play, in play order.
    pub played: Vector<InstanceId>,

    /// `(instance, action index)` pairs invoked this generation.
    pub used_actions: OrdSet<(InstanceId, usize)>,
}

impl PlayerState {
    pub fn new(id: PlayerId, terraform_rating: u32) -> Self {
        Self {
            id,
            stock: ResourceMap::default(),
            production: ResourceMap::default(),
            terraform_rating,
            tags: OrdMap::new(),
            hand: Vector::new(),
            played: Vector::new(),
            used_actions: OrdSet::new(),
        }
    }

    /// Number of `tag` tags in play. Wild tags are not substituted.
    #[must_use]
    pub fn tag_count(&self, tag: Tag) -> u32 {
        self.tags.get(&tag).copied().unwrap_or(0)
    }

    pub fn add_tag(&mut self, tag: Tag) {
        *self.tags.entry(tag).or_insert(0) += 1;
    }

    /// Remove one `tag`, dropping the entry at zero.
    pub fn remove_tag(&mut self, tag: Tag) {
        if let Some(count) = self.tags.get_mut(&tag) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.tags.remove(&tag);
            }
        }
    }

    /// Add to stock.
    pub fn gain(&mut self, resource: Resource, amount: u32) {
        self.stock[resource] = self.stock[resource].saturating_add(amount);
    }

    /// Remove from stock, all or nothing.
    pub fn spend(&mut self, resource: Resource, amount: u32) -> Result<(), EngineError> {
        let available = self.stock[resource];
        if available < amount {
            return Err(EngineError::short_of(resource, amount, available));
        }
        self.stock[resource] = available - amount;
        Ok(())
    }

    #[must_use]
    pub fn holds(&self, card: &str) -> bool {
        self.hand.iter().any(|c| c == card)
    }

    /// Take the first copy of `card` out of the hand.
    pub fn take_from_hand(&mut self, card: &str) -> bool {
        match self.hand.iter().position(|c| c == card) {
            Some(index) => {
                self.hand.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Temperature, oxygen and oceans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalParameters {
    /// Degrees Celsius, in steps of 2.
    pub temperature: i32,
    /// Percent.
    pub oxygen: u32,
    pub oceans: u32,
}

impl GlobalParameters {
    pub const MIN_TEMPERATURE: i32 = -30;
    pub const MAX_TEMPERATURE: i32 = 8;
    pub const TEMPERATURE_STEP: i32 = 2;
    pub const MAX_OXYGEN: u32 = 14;
    pub const MAX_OCEANS: u32 = 9;

    /// Raise temperature by up to `steps` steps; returns steps actually raised.
    pub fn raise_temperature(&mut self, steps: u32) -> u32 {
        let room = (Self::MAX_TEMPERATURE - self.temperature) / Self::TEMPERATURE_STEP;
        let raised = steps.min(room.max(0) as u32);
        self.temperature += raised as i32 * Self::TEMPERATURE_STEP;
        raised
    }

    /// Raise oxygen by up to `steps` percent; returns steps actually raised.
    pub fn raise_oxygen(&mut self, steps: u32) -> u32 {
        let raised = steps.min(Self::MAX_OXYGEN - self.oxygen.min(Self::MAX_OXYGEN));
        self.oxygen += raised;
        raised
    }

    /// Count one more ocean if any remain; returns 1 or 0.
    pub fn add_ocean(&mut self) -> u32 {
        if self.oceans < Self::MAX_OCEANS {
            self.oceans += 1;
            1
        } else {
            0
        }
    }
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            temperature: Self::MIN_TEMPERATURE,
            oxygen: 0,
            oceans: 0,
        }
    }
}

/// Complete engine-visible game state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub players: PlayerMap<PlayerState>,
    pub globals: GlobalParameters,
    /// Starts at 1.
    pub generation: u32,
    pub board: Board,
    pub modifiers: ModifierBook,
    pub triggers: TriggerRegistry,
    pub instances: OrdMap<InstanceId, CardInstance>,
    next_instance: u32,
    pub history: Vector<MoveRecord>,
}

impl GameState {
    /// Fresh state for a configured game, with an empty board.
    pub fn new(config: &EngineConfig) -> Self {
        let rating = config.starting_terraform_rating;
        Self {
            players: PlayerMap::new(config.player_count, |p| PlayerState::new(p, rating)),
            globals: GlobalParameters::default(),
            generation: 1,
            board: Board::default(),
            modifiers: ModifierBook::default(),
            triggers: TriggerRegistry::default(),
            instances: OrdMap::new(),
            next_instance: 0,
            history: Vector::new(),
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    pub fn player(&self, player: PlayerId) -> Result<&PlayerState, EngineError> {
        self.players
            .get(player)
            .ok_or_else(|| EngineError::InvalidTarget(format!("no such player {player}")))
    }

    pub fn player_mut(&mut self, player: PlayerId) -> Result<&mut PlayerState, EngineError> {
        self.players
            .get_mut(player)
            .ok_or_else(|| EngineError::InvalidTarget(format!("no such player {player}")))
    }

    pub fn instance(&self, id: InstanceId) -> Result<&CardInstance, EngineError> {
        self.instances.get(&id).ok_or(EngineError::UnknownInstance(id))
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Result<&mut CardInstance, EngineError> {
        self.instances.get_mut(&id).ok_or(EngineError::UnknownInstance(id))
    }

    /// Allocate the next instance id.
    pub fn alloc_instance(&mut self) -> InstanceId {
        let id = InstanceId::new(self.next_instance);
        self.next_instance += 1;
        id
    }

    /// Put an instance in play and list it under its owner.
    pub fn add_instance(&mut self, instance: CardInstance) {
        if let Some(owner) = self.players.get_mut(instance.owner) {
            owner.played.push_back(instance.id);
        }
        self.instances.insert(instance.id, instance);
    }

    /// Encode as a compact binary snapshot.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EngineError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a snapshot produced by [`GameState::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(&EngineConfig::new(2))
    }

    #[test]
    fn test_new_state() {
        let state = state();
        assert_eq!(state.player_count(), 2);
        assert_eq!(state.generation, 1);
        assert_eq!(state.globals.temperature, -30);
        assert_eq!(state.players[PlayerId::new(1)].terraform_rating, 20);
    }

    #[test]
    fn test_spend_is_all_or_nothing() {
        let mut player = PlayerState::new(PlayerId::new(0), 20);
        player.gain(Resource::Steel, 1);

        let err = player.spend(Resource::Steel, 2).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientResources { .. }));
        assert_eq!(player.stock[Resource::Steel], 1);

        player.spend(Resource::Steel, 1).unwrap();
        assert_eq!(player.stock[Resource::Steel], 0);
    }

    #[test]
    fn test_tags() {
        let mut player = PlayerState::new(PlayerId::new(0), 20);
        player.add_tag(Tag::Science);
        player.add_tag(Tag::Science);
        assert_eq!(player.tag_count(Tag::Science), 2);
        player.remove_tag(Tag::Science);
        player.remove_tag(Tag::Science);
        assert_eq!(player.tag_count(Tag::Science), 0);
        assert!(player.tags.is_empty());
    }

    #[test]
    fn test_hand() {
        let mut player = PlayerState::new(PlayerId::new(0), 20);
        player.hand.push_back("Mine".into());
        player.hand.push_back("Mine".into());
        assert!(player.take_from_hand("Mine"));
        assert!(player.holds("Mine"));
        assert!(!player.take_from_hand("Research"));
    }

    #[test]
    fn test_temperature_caps() {
        let mut globals = GlobalParameters::default();
        assert_eq!(globals.raise_temperature(2), 2);
        assert_eq!(globals.temperature, -26);

        globals.temperature = 6;
        assert_eq!(globals.raise_temperature(3), 1);
        assert_eq!(globals.temperature, 8);
        assert_eq!(globals.raise_temperature(1), 0);
    }

    #[test]
    fn test_oxygen_and_ocean_caps() {
        let mut globals = GlobalParameters { oxygen: 13, oceans: 9, ..Default::default() };
        assert_eq!(globals.raise_oxygen(2), 1);
        assert_eq!(globals.oxygen, 14);
        assert_eq!(globals.add_ocean(), 0);
        assert_eq!(globals.oceans, 9);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = state();
        let snapshot = original.clone();
        original.players[PlayerId::new(0)].gain(Resource::Heat, 5);
        assert_eq!(snapshot.players[PlayerId::new(0)].stock[Resource::Heat], 0);
        assert_ne!(original, snapshot);
    }

    #[test]
    fn test_snapshot_bytes() {
        let mut original = state();
        original.players[PlayerId::new(1)].hand.push_back("Sponsors".into());
        let bytes = original.to_bytes().unwrap();
        let restored = GameState::from_bytes(&bytes).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_garbage_snapshot_is_an_error() {
        let err = GameState::from_bytes(&[0xff, 0x01]).unwrap_err();
        assert!(matches!(err, EngineError::Snapshot(_)));
    }
}
