#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the isometric world simulator.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then reports [`Event`] values describing what
//! actually happened. Systems read the live entity table through an
//! [`EntityView`] and respond exclusively with new command batches.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod component;
pub mod entity;
pub mod resources;

pub use component::{
    Building, BuildingKind, Component, ComponentKind, Inventory, ItemKind, Position, Sprite,
};
pub use entity::Entity;
pub use resources::{resource_for, HarvestYield};

/// Location of a single grid tile expressed as column (`x`) and row (`y`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Returns the neighbouring cell in the provided direction.
    ///
    /// Yields `None` when the step would leave the non-negative quadrant.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (dx, dy) = direction.offset();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self::new(x, y))
    }

    /// Isometric depth key used to order drawing back to front.
    #[must_use]
    pub const fn depth(&self) -> u64 {
        self.x as u64 + self.y as u64
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the rectangle covers no cells at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size.width == 0 || self.size.height == 0
    }

    /// Reports whether the provided cell lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let dx = u64::from(cell.x()).checked_sub(u64::from(self.origin.x()));
        let dy = u64::from(cell.y()).checked_sub(u64::from(self.origin.y()));
        match (dx, dy) {
            (Some(dx), Some(dy)) => {
                dx < u64::from(self.size.width()) && dy < u64::from(self.size.height())
            }
            _ => false,
        }
    }

    /// Iterates every cell covered by the rectangle in row-major order.
    ///
    /// Cells whose coordinates would overflow `u32` are skipped.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let size = self.size;
        (0..size.height()).flat_map(move |dy| {
            (0..size.width()).filter_map(move |dx| {
                let x = origin.x().checked_add(dx)?;
                let y = origin.y().checked_add(dy)?;
                Some(CellCoord::new(x, y))
            })
        })
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Single-cell footprint used when callers do not provide one.
    pub const UNIT: Self = Self::new(1, 1);

    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

impl Default for CellRectSize {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Cardinal directions connecting orthogonal neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing column indices.
    East,
    /// Movement toward decreasing column indices.
    West,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing row indices.
    North,
}

impl Direction {
    /// Neighbour directions in the order grid queries report them.
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    /// Signed column and row delta of a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::East => (1, 0),
            Self::West => (-1, 0),
            Self::South => (0, 1),
            Self::North => (0, -1),
        }
    }
}

/// Terrain category assigned to a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainKind {
    /// Open ground, the default for freshly allocated tiles.
    #[default]
    Grass,
    /// Open water below the water level.
    Water,
    /// Shoreline band between water and grass.
    Sand,
    /// Solid rock, covering scattered boulders and the mountain band.
    Rock,
    /// Decorative tree scattered over grassland.
    Tree,
    /// Impassable ring that encloses the generated map.
    Border,
}

impl TerrainKind {
    /// Every terrain kind in declaration order.
    pub const ALL: [TerrainKind; 6] = [
        TerrainKind::Grass,
        TerrainKind::Water,
        TerrainKind::Sand,
        TerrainKind::Rock,
        TerrainKind::Tree,
        TerrainKind::Border,
    ];

    /// Whether a tile of this kind can be traversed by default.
    #[must_use]
    pub const fn walkable(self) -> bool {
        !matches!(self, Self::Water | Self::Rock | Self::Border)
    }

    /// Whether a tile of this kind accepts construction by default.
    #[must_use]
    pub const fn buildable(self) -> bool {
        !matches!(self, Self::Water | Self::Border)
    }

    /// Lowercase name used in logs and snapshots.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grass => "grass",
            Self::Water => "water",
            Self::Sand => "sand",
            Self::Rock => "rock",
            Self::Tree => "tree",
            Self::Border => "border",
        }
    }
}

impl fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unique identifier assigned to an entity by the world.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity_{}", self.0)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Regenerates the terrain from a seed; entities keep their tiles.
    GenerateTerrain {
        /// Seed driving both the noise field and decoration rolls.
        seed: u64,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Registers a new entity assembled from the provided components.
    ///
    /// No admission check is performed; a position component binds its tile
    /// unconditionally.
    SpawnEntity {
        /// Components attached to the new entity.
        components: Vec<Component>,
    },
    /// Requests placement of a building anchored at the provided origin cell.
    PlaceBuilding {
        /// Type of building to construct.
        kind: BuildingKind,
        /// Upper-left cell that defines the building's footprint.
        origin: CellCoord,
        /// Number of cells covered by the building.
        footprint: CellRectSize,
    },
    /// Requests that an entity move to a new cell.
    MoveEntity {
        /// Identifier of the entity attempting to move.
        entity: EntityId,
        /// Destination cell.
        to: CellCoord,
    },
    /// Requests removal of an entity from the world.
    RemoveEntity {
        /// Identifier of the entity targeted for removal.
        entity: EntityId,
    },
    /// Overwrites the terrain of a single tile.
    SetTerrain {
        /// Tile whose terrain is replaced.
        cell: CellCoord,
        /// New terrain kind.
        terrain: TerrainKind,
    },
    /// Collects the resource yielded by a tile into an entity's inventory.
    Harvest {
        /// Entity whose inventory receives the yield.
        harvester: EntityId,
        /// Tile being harvested.
        cell: CellCoord,
        /// Tool held by the harvester, if any.
        tool: Option<ItemKind>,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that fresh terrain was generated.
    TerrainGenerated {
        /// Seed used for generation.
        seed: u64,
        /// Grid width in tiles.
        width: u32,
        /// Grid height in tiles.
        height: u32,
    },
    /// Reports that terrain generation was refused.
    TerrainRejected {
        /// Seed provided in the request.
        seed: u64,
        /// Validation failure describing the bad configuration.
        reason: ConfigError,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Tick counter after advancing.
        tick: u64,
    },
    /// Confirms that an entity was registered.
    EntitySpawned {
        /// Identifier assigned to the entity.
        entity: EntityId,
    },
    /// Confirms that a building was placed into the world.
    BuildingPlaced {
        /// Identifier assigned to the building entity.
        entity: EntityId,
        /// Type of building that was placed.
        kind: BuildingKind,
        /// Region of cells reserved by the building.
        region: CellRect,
    },
    /// Reports that a building placement request was rejected.
    BuildingRejected {
        /// Type of building requested for placement.
        kind: BuildingKind,
        /// Origin cell provided in the placement request.
        origin: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that an entity moved between two cells.
    EntityMoved {
        /// Identifier of the entity that moved.
        entity: EntityId,
        /// Cell the entity occupied before moving.
        from: CellCoord,
        /// Cell the entity occupies after moving.
        to: CellCoord,
    },
    /// Reports that a move request was rejected.
    MoveRejected {
        /// Identifier of the entity that attempted to move.
        entity: EntityId,
        /// Destination provided in the request.
        to: CellCoord,
        /// Specific reason the move failed.
        reason: MoveError,
    },
    /// Confirms that an entity was removed.
    EntityRemoved {
        /// Identifier of the removed entity.
        entity: EntityId,
    },
    /// Reports that a removal targeted an unknown entity.
    RemovalRejected {
        /// Identifier provided in the request.
        entity: EntityId,
    },
    /// Confirms that a tile changed terrain.
    TerrainChanged {
        /// Tile that changed.
        cell: CellCoord,
        /// Terrain before the change.
        from: TerrainKind,
        /// Terrain after the change.
        to: TerrainKind,
    },
    /// Confirms that an entity harvested a tile.
    Harvested {
        /// Entity that received the yield.
        harvester: EntityId,
        /// Tile that was harvested.
        cell: CellCoord,
        /// Item collected.
        item: ItemKind,
        /// Quantity that fit into the inventory.
        added: u32,
    },
    /// Reports that a harvest request was rejected.
    HarvestRejected {
        /// Entity that attempted to harvest.
        harvester: EntityId,
        /// Tile targeted by the request.
        cell: CellCoord,
        /// Specific reason the harvest failed.
        reason: HarvestError,
    },
}

/// Reasons a building placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested region extends beyond the grid bounds.
    #[error("building footprint extends beyond the grid")]
    OutOfBounds,
    /// The requested footprint overlaps an occupied or unbuildable tile.
    #[error("building footprint overlaps an occupied or unbuildable tile")]
    Occupied,
    /// The requested footprint covers no cells.
    #[error("building footprint must cover at least one cell")]
    InvalidFootprint,
}

/// Reasons a move request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum MoveError {
    /// No entity with the provided identifier exists.
    #[error("entity does not exist")]
    MissingEntity,
    /// The entity has no position component.
    #[error("entity has no position component")]
    MissingPosition,
    /// Buildings stay where they were placed.
    #[error("buildings cannot be moved")]
    Anchored,
    /// The destination tile does not exist.
    #[error("destination lies outside the grid")]
    OutOfBounds,
    /// The destination tile is bound to another entity.
    #[error("destination tile is occupied")]
    Occupied,
}

/// Reasons a harvest request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum HarvestError {
    /// No entity with the provided identifier exists.
    #[error("harvester does not exist")]
    MissingEntity,
    /// The harvester has no inventory component.
    #[error("harvester has no inventory")]
    MissingInventory,
    /// The targeted tile does not exist.
    #[error("tile lies outside the grid")]
    OutOfBounds,
    /// The tile yields nothing with the held tool.
    #[error("tile cannot be harvested with the held tool")]
    NotHarvestable,
    /// The inventory had no room for the yield.
    #[error("inventory is full")]
    InventoryFull,
}

/// Validation failures for terrain generation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// At least one octave is required.
    #[error("octaves must be at least 1")]
    NoOctaves,
    /// A numeric parameter was NaN or infinite.
    #[error("`{0}` must be a finite number")]
    NotFinite(&'static str),
    /// The base frequency must be strictly positive.
    #[error("scale must be greater than zero")]
    NonPositiveScale,
    /// A band threshold or probability fell outside `[0, 1]`.
    #[error("`{0}` must lie within [0, 1]")]
    OutOfUnitRange(&'static str),
    /// Band thresholds must not decrease.
    #[error("terrain thresholds must be ascending (water <= sand <= grass <= rock)")]
    UnorderedThresholds,
}

/// Read-only view of the live entity table, ordered by identifier.
#[derive(Clone, Copy, Debug)]
pub struct EntityView<'a> {
    entities: &'a std::collections::BTreeMap<EntityId, Entity>,
}

impl<'a> EntityView<'a> {
    /// Captures a new view backed by the provided entity table.
    #[must_use]
    pub fn new(entities: &'a std::collections::BTreeMap<EntityId, Entity>) -> Self {
        Self { entities }
    }

    /// Iterates every entity in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &'a Entity)> + 'a {
        self.entities.iter().map(|(id, entity)| (*id, entity))
    }

    /// Iterates entities that carry every one of the provided component kinds.
    pub fn with(
        &self,
        kinds: &'a [ComponentKind],
    ) -> impl Iterator<Item = (EntityId, &'a Entity)> + 'a {
        self.iter()
            .filter(move |(_, entity)| entity.has_all(kinds))
    }

    /// Retrieves a single entity by identifier.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&'a Entity> {
        self.entities.get(&id)
    }

    /// Number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Reports whether the table holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Gameplay logic executed once per tick by the dispatcher.
///
/// Systems never mutate the world directly. They observe the live entity
/// table and push commands, which the dispatcher applies before the next
/// system runs.
pub trait System {
    /// Human-readable name used in logs.
    fn name(&self) -> &'static str;

    /// Runs the system for one tick.
    fn update(&mut self, entities: EntityView<'_>, dt: Duration, out: &mut Vec<Command>);
}
