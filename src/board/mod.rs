//! Placement areas and tiles.
//!
//! The board is a flat set of areas. Each area has a designation (plain
//! land, reserved for oceans, a named reserved site such as Noctis City,
//! or a named site off Mars such as Ganymede Colony), an optional
//! placement bonus, and at most one tile. Adjacency is
//! not modelled; tile effects that depend on neighbours are out of scope.
//!
//! Cards say where their tile may go with an [`AreaRule`]; the resolver
//! asks the player to pick one of [`Board::legal_areas`].

use im::OrdMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{AreaId, EngineError, PlayerId, Resource};

/// What an area is reserved for.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaKind {
    Land,
    OceanReserved,
    /// A named site only specific cards may use.
    Reserved(String),
    /// A named site that is not on Mars. Its tiles count as the owner's
    /// but not towards anything measured on Mars.
    OffWorld(String),
}

/// Gained by whoever places a tile on the area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementBonus {
    Resource(Resource, u32),
    Cards(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CityKind {
    RegularCity,
    Capital,
    NoctisCity,
    PhobosSpaceHaven,
    GanymedeColony,
    LavaTunnelCity,
    UrbanizedArea,
    ResearchOutpost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialTile {
    NuclearZone,
    RestrictedArea,
    LavaFlows,
    CommercialDistrict,
    NaturalPreserve,
    IndustrialCenter,
    MoholeArea,
    MiningArea,
    MiningRights,
    EcologicalZone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Ocean,
    Greenery,
    City(CityKind),
    Special(SpecialTile),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedTile {
    pub kind: TileKind,
    /// Oceans belong to nobody.
    pub owner: Option<PlayerId>,
}

/// Where a tile may be placed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaRule {
    /// Any empty land area.
    Land,
    /// Any empty area reserved for oceans.
    OceanArea,
    /// The named reserved site.
    Reserved(String),
    /// Empty land whose bonus includes steel or titanium.
    MetalBonus,
}

/// One placement area.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub kind: AreaKind,
    pub bonus: SmallVec<[PlacementBonus; 2]>,
    pub tile: Option<PlacedTile>,
}

impl Area {
    #[must_use]
    pub fn new(id: AreaId, kind: AreaKind) -> Self {
        Self {
            id,
            kind,
            bonus: SmallVec::new(),
            tile: None,
        }
    }

    #[must_use]
    pub fn land(id: u32) -> Self {
        Self::new(AreaId::new(id), AreaKind::Land)
    }

    #[must_use]
    pub fn ocean(id: u32) -> Self {
        Self::new(AreaId::new(id), AreaKind::OceanReserved)
    }

    #[must_use]
    pub fn reserved(id: u32, site: impl Into<String>) -> Self {
        Self::new(AreaId::new(id), AreaKind::Reserved(site.into()))
    }

    #[must_use]
    pub fn off_world(id: u32, site: impl Into<String>) -> Self {
        Self::new(AreaId::new(id), AreaKind::OffWorld(site.into()))
    }

    #[must_use]
    pub fn is_on_mars(&self) -> bool {
        !matches!(self.kind, AreaKind::OffWorld(_))
    }

    /// Add a placement bonus (builder pattern).
    #[must_use]
    pub fn with_bonus(mut self, bonus: PlacementBonus) -> Self {
        self.bonus.push(bonus);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tile.is_none()
    }

    /// The metal this area's bonus pays out, titanium first.
    #[must_use]
    pub fn metal_bonus(&self) -> Option<Resource> {
        let has = |metal: Resource| {
            self.bonus
                .iter()
                .any(|b| matches!(b, PlacementBonus::Resource(r, n) if *r == metal && *n > 0))
        };
        if has(Resource::Titanium) {
            Some(Resource::Titanium)
        } else if has(Resource::Steel) {
            Some(Resource::Steel)
        } else {
            None
        }
    }

    fn admits(&self, rule: &AreaRule) -> bool {
        if !self.is_empty() {
            return false;
        }
        match (rule, &self.kind) {
            (AreaRule::Land, AreaKind::Land) => true,
            (AreaRule::OceanArea, AreaKind::OceanReserved) => true,
            (AreaRule::Reserved(site), AreaKind::Reserved(name) | AreaKind::OffWorld(name)) => {
                site == name
            }
            (AreaRule::MetalBonus, AreaKind::Land) => self.metal_bonus().is_some(),
            _ => false,
        }
    }
}

/// All placement areas.
///
/// ```
/// use terraform_engine::board::{Area, AreaRule, Board, PlacementBonus};
/// use terraform_engine::core::Resource;
///
/// let board = Board::default()
///     .with_area(Area::land(0))
///     .with_area(Area::land(1).with_bonus(PlacementBonus::Resource(Resource::Steel, 2)))
///     .with_area(Area::ocean(2));
///
/// assert_eq!(board.legal_areas(&AreaRule::Land).len(), 2);
/// assert_eq!(board.legal_areas(&AreaRule::MetalBonus).len(), 1);
/// assert_eq!(board.legal_areas(&AreaRule::OceanArea).len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    areas: OrdMap<AreaId, Area>,
}

impl Board {
    /// `land` plain land areas followed by `oceans` ocean areas, no bonuses.
    #[must_use]
    pub fn uniform(land: u32, oceans: u32) -> Self {
        let board = (0..land).fold(Self::default(), |b, i| b.with_area(Area::land(i)));
        (land..land + oceans).fold(board, |b, i| b.with_area(Area::ocean(i)))
    }

    /// Add or replace an area (builder pattern).
    #[must_use]
    pub fn with_area(mut self, area: Area) -> Self {
        self.areas.insert(area.id, area);
        self
    }

    pub fn area(&self, id: AreaId) -> Result<&Area, EngineError> {
        self.areas
            .get(&id)
            .ok_or_else(|| EngineError::InvalidTarget(format!("no such area {id}")))
    }

    /// Empty areas that satisfy `rule`, in id order.
    #[must_use]
    pub fn legal_areas(&self, rule: &AreaRule) -> Vec<AreaId> {
        self.areas
            .values()
            .filter(|a| a.admits(rule))
            .map(|a| a.id)
            .collect()
    }

    /// Put a tile on a legal area; returns the area's placement bonus.
    pub fn place(
        &mut self,
        id: AreaId,
        rule: &AreaRule,
        tile: PlacedTile,
    ) -> Result<SmallVec<[PlacementBonus; 2]>, EngineError> {
        let area = self
            .areas
            .get_mut(&id)
            .ok_or_else(|| EngineError::InvalidTarget(format!("no such area {id}")))?;
        if !area.admits(rule) {
            return Err(EngineError::InvalidTarget(format!("{id} does not admit {rule:?}")));
        }
        area.tile = Some(tile);
        Ok(area.bonus.clone())
    }

    /// Number of tiles owned by `player` that match `pred`.
    pub fn count_owned(&self, player: PlayerId, pred: impl Fn(TileKind) -> bool) -> u32 {
        self.areas
            .values()
            .filter_map(|a| a.tile)
            .filter(|t| t.owner == Some(player) && pred(t.kind))
            .count() as u32
    }

    #[must_use]
    pub fn cities_of(&self, player: PlayerId) -> u32 {
        self.count_owned(player, |k| matches!(k, TileKind::City(_)))
    }

    #[must_use]
    pub fn greeneries_of(&self, player: PlayerId) -> u32 {
        self.count_owned(player, |k| k == TileKind::Greenery)
    }

    /// Cities in play, whoever owns them.
    #[must_use]
    pub fn cities(&self) -> u32 {
        self.count_cities(|_| true)
    }

    #[must_use]
    pub fn cities_on_mars(&self) -> u32 {
        self.count_cities(Area::is_on_mars)
    }

    fn count_cities(&self, pred: impl Fn(&Area) -> bool) -> u32 {
        self.areas
            .values()
            .filter(|&a| pred(a))
            .filter(|a| matches!(a.tile, Some(PlacedTile { kind: TileKind::City(_), .. })))
            .count() as u32
    }

    pub fn iter(&self) -> impl Iterator<Item = &Area> {
        self.areas.values()
    }
}
