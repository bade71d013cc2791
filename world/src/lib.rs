#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the isometric world simulator.
//!
//! The [`World`] owns the tile [`Grid`] and the entity table and keeps the two
//! consistent: an entity carrying a position is bound to the tile at that
//! position for as long as it stays registered there. Adapters mutate the world
//! through [`apply`] or the equivalent inherent methods, and read it through the
//! [`query`] module.

use std::{collections::BTreeMap, time::Duration};

use isoworld_core::{
    resource_for, Building, BuildingKind, CellCoord, CellRect, CellRectSize, Command,
    ConfigError, Entity, EntityId, Event, HarvestError, ItemKind, MoveError, PlacementError,
    Position, Sprite, TerrainKind,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

mod config;
mod dispatch;
mod grid;
mod noise;
mod snapshot;

pub use config::GenerationConfig;
pub use dispatch::SystemDispatcher;
pub use grid::{Grid, TerrainCensus, Tile};
pub use noise::NoiseField;
pub use snapshot::{EntitySnapshot, SnapshotError, WorldSnapshot};

const DEFAULT_WIDTH: u32 = 50;
const DEFAULT_HEIGHT: u32 = 50;

/// Seed and parameters the current terrain was generated from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainRecipe {
    /// Seed driving the noise field and decoration rolls.
    pub seed: u64,
    /// Parameters used for classification.
    pub config: GenerationConfig,
}

/// Represents the authoritative world state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    entities: BTreeMap<EntityId, Entity>,
    next_entity_id: u64,
    tick_count: u64,
    recipe: Option<TerrainRecipe>,
}

impl World {
    /// Creates an empty world over a `width * height` grass grid.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            grid: Grid::new(width, height),
            entities: BTreeMap::new(),
            next_entity_id: 0,
            tick_count: 0,
            recipe: None,
        }
    }

    /// Generates terrain from the seed after validating the configuration.
    ///
    /// Registered entities keep their tile bindings.
    pub fn generate(&mut self, seed: u64, config: &GenerationConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.grid.generate_terrain(seed, config);
        self.recipe = Some(TerrainRecipe {
            seed,
            config: config.clone(),
        });

        let census = self.grid.census();
        info!(
            seed,
            width = self.grid.width(),
            height = self.grid.height(),
            water = census.count(TerrainKind::Water),
            sand = census.count(TerrainKind::Sand),
            grass = census.count(TerrainKind::Grass),
            rock = census.count(TerrainKind::Rock),
            trees = census.count(TerrainKind::Tree),
            "terrain generated"
        );
        Ok(())
    }

    /// Registers an entity and binds its position tile, if any.
    ///
    /// Entities without an identifier receive the next free one. A supplied
    /// identifier advances the counter past it and replaces any entity already
    /// registered under it. No admission check is made: the position tile is
    /// bound even when another entity occupies it. A building additionally
    /// claims the empty tiles of its footprint; occupied ones keep their
    /// occupant.
    pub fn add_entity(&mut self, mut entity: Entity) -> EntityId {
        let id = match entity.id() {
            Some(id) => {
                self.next_entity_id = self.next_entity_id.max(id.get().saturating_add(1));
                if self.entities.contains_key(&id) {
                    let _ = self.remove_entity(id);
                }
                id
            }
            None => {
                let id = EntityId::new(self.next_entity_id);
                self.next_entity_id = self.next_entity_id.saturating_add(1);
                entity.assign_id(id);
                id
            }
        };

        if let Some(position) = entity.position() {
            match self.grid.tile_mut(position.cell()) {
                Some(tile) => tile.bind(id),
                None => debug!(%id, cell = %position.cell(), "entity registered off the grid"),
            }
            if let Some(building) = entity.building() {
                let area = CellRect::from_origin_and_size(position.cell(), building.footprint);
                for cell in area.cells() {
                    if let Some(tile) = self.grid.tile_mut(cell) {
                        if tile.is_empty() {
                            tile.bind(id);
                        }
                    }
                }
            }
        }

        let _ = self.entities.insert(id, entity);
        id
    }

    /// Deletes an entity, unbinding every tile that still points at it.
    ///
    /// Returns `false` when no entity carries the identifier.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entities.remove(&id) else {
            return false;
        };

        if let Some(position) = entity.position() {
            let footprint = entity
                .building()
                .map_or(CellRectSize::UNIT, |building| building.footprint);
            let area = CellRect::from_origin_and_size(position.cell(), footprint);
            for cell in area.cells() {
                if let Some(tile) = self.grid.tile_mut(cell) {
                    if tile.occupant() == Some(id) {
                        tile.unbind();
                    }
                }
            }
        }

        true
    }

    /// Moves an entity to another tile.
    ///
    /// Nothing changes when the move is rejected. Moving onto the tile the
    /// entity already occupies succeeds without effect.
    pub fn move_entity(&mut self, id: EntityId, to: CellCoord) -> Result<(), MoveError> {
        let entity = self.entities.get(&id).ok_or(MoveError::MissingEntity)?;
        let from = entity.position().ok_or(MoveError::MissingPosition)?.cell();
        if entity.building().is_some() {
            return Err(MoveError::Anchored);
        }
        let destination = self.grid.tile(to).ok_or(MoveError::OutOfBounds)?;
        match destination.occupant() {
            Some(occupant) if occupant != id => return Err(MoveError::Occupied),
            _ => {}
        }

        if let Some(tile) = self.grid.tile_mut(from) {
            if tile.occupant() == Some(id) {
                tile.unbind();
            }
        }
        if let Some(entity) = self.entities.get_mut(&id) {
            let _ = entity.add_component(Position::from(to));
        }
        if let Some(tile) = self.grid.tile_mut(to) {
            tile.bind(id);
        }
        Ok(())
    }

    /// Creates a building entity after checking that its footprint is free.
    ///
    /// On rejection no entity is created and no tile changes.
    pub fn place_building(
        &mut self,
        origin: CellCoord,
        kind: BuildingKind,
        footprint: CellRectSize,
    ) -> Result<EntityId, PlacementError> {
        let area = CellRect::from_origin_and_size(origin, footprint);
        if area.is_empty() {
            return Err(PlacementError::InvalidFootprint);
        }
        if !self.grid.contains_rect(area) {
            return Err(PlacementError::OutOfBounds);
        }
        if !self.grid.is_area_free(area) {
            return Err(PlacementError::Occupied);
        }

        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id = self.next_entity_id.saturating_add(1);
        let entity = Entity::with_id(id)
            .with(Position::from(origin))
            .with(Building { kind, footprint })
            .with(Sprite::new(kind.texture()));

        self.grid.reserve_area(area, id);
        let _ = self.entities.insert(id, entity);
        Ok(id)
    }

    /// Adds the yield of a tile to the harvester's inventory.
    ///
    /// Returns the item and the quantity that fit. Terrain is unchanged.
    pub fn harvest(
        &mut self,
        harvester: EntityId,
        cell: CellCoord,
        tool: Option<ItemKind>,
    ) -> Result<(ItemKind, u32), HarvestError> {
        let entity = self
            .entities
            .get_mut(&harvester)
            .ok_or(HarvestError::MissingEntity)?;
        let inventory = entity
            .inventory_mut()
            .ok_or(HarvestError::MissingInventory)?;
        let terrain = self
            .grid
            .tile(cell)
            .ok_or(HarvestError::OutOfBounds)?
            .terrain();
        let harvest = resource_for(terrain, tool).ok_or(HarvestError::NotHarvestable)?;

        match inventory.add_item(harvest.item, harvest.quantity) {
            0 => Err(HarvestError::InventoryFull),
            added => Ok((harvest.item, added)),
        }
    }

    /// Overwrites a tile's terrain and returns the previous kind.
    pub fn set_terrain(&mut self, cell: CellCoord, terrain: TerrainKind) -> Option<TerrainKind> {
        self.grid.set_terrain(cell, terrain)
    }

    /// Advances the tick counter.
    pub fn update(&mut self, dt: Duration) {
        self.tick_count = self.tick_count.saturating_add(1);
        debug!(tick = self.tick_count, dt = ?dt, "world advanced");
    }

    /// Drops every entity, resets the grid to grass and zeroes the counters.
    pub fn reset(&mut self) {
        self.entities.clear();
        self.grid.clear();
        self.next_entity_id = 0;
        self.tick_count = 0;
        self.recipe = None;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::GenerateTerrain { seed } => {
            let config = world
                .recipe
                .as_ref()
                .map(|recipe| recipe.config.clone())
                .unwrap_or_default();
            match world.generate(seed, &config) {
                Ok(()) => out_events.push(Event::TerrainGenerated {
                    seed,
                    width: world.grid.width(),
                    height: world.grid.height(),
                }),
                Err(reason) => {
                    warn!(seed, %reason, "terrain generation rejected");
                    out_events.push(Event::TerrainRejected { seed, reason });
                }
            }
        }
        Command::Tick { dt } => {
            world.update(dt);
            out_events.push(Event::TimeAdvanced {
                dt,
                tick: world.tick_count,
            });
        }
        Command::SpawnEntity { components } => {
            let entity = components
                .into_iter()
                .fold(Entity::new(), |entity, component| entity.with(component));
            let entity = world.add_entity(entity);
            out_events.push(Event::EntitySpawned { entity });
        }
        Command::PlaceBuilding {
            kind,
            origin,
            footprint,
        } => match world.place_building(origin, kind, footprint) {
            Ok(entity) => {
                debug!(%entity, ?kind, %origin, "building placed");
                out_events.push(Event::BuildingPlaced {
                    entity,
                    kind,
                    region: CellRect::from_origin_and_size(origin, footprint),
                });
            }
            Err(reason) => {
                debug!(?kind, %origin, %reason, "building rejected");
                out_events.push(Event::BuildingRejected {
                    kind,
                    origin,
                    reason,
                });
            }
        },
        Command::MoveEntity { entity, to } => {
            let from = world
                .entities
                .get(&entity)
                .and_then(Entity::position)
                .map(|position| position.cell());
            match (world.move_entity(entity, to), from) {
                (Ok(()), Some(from)) => out_events.push(Event::EntityMoved { entity, from, to }),
                (Ok(()), None) => {}
                (Err(reason), _) => {
                    debug!(%entity, %to, %reason, "move rejected");
                    out_events.push(Event::MoveRejected { entity, to, reason });
                }
            }
        }
        Command::RemoveEntity { entity } => {
            if world.remove_entity(entity) {
                out_events.push(Event::EntityRemoved { entity });
            } else {
                out_events.push(Event::RemovalRejected { entity });
            }
        }
        Command::SetTerrain { cell, terrain } => {
            if let Some(from) = world.set_terrain(cell, terrain) {
                out_events.push(Event::TerrainChanged {
                    cell,
                    from,
                    to: terrain,
                });
            }
        }
        Command::Harvest {
            harvester,
            cell,
            tool,
        } => match world.harvest(harvester, cell, tool) {
            Ok((item, added)) => out_events.push(Event::Harvested {
                harvester,
                cell,
                item,
                added,
            }),
            Err(reason) => {
                debug!(%harvester, %cell, %reason, "harvest rejected");
                out_events.push(Event::HarvestRejected {
                    harvester,
                    cell,
                    reason,
                });
            }
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use isoworld_core::{CellCoord, ComponentKind, Entity, EntityId, EntityView};

    use super::{Grid, TerrainCensus, TerrainRecipe, Tile, World};

    /// Provides read-only access to the tile grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Tile at the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn tile(world: &World, cell: CellCoord) -> Option<&Tile> {
        world.grid.tile(cell)
    }

    /// Retrieves a registered entity.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<&Entity> {
        world.entities.get(&id)
    }

    /// Identifier of the entity bound to the provided cell.
    #[must_use]
    pub fn entity_at(world: &World, cell: CellCoord) -> Option<EntityId> {
        world.grid.tile(cell).and_then(Tile::occupant)
    }

    /// Read-only view of the whole entity table.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView<'_> {
        EntityView::new(&world.entities)
    }

    /// Identifiers of entities carrying every listed component kind, ascending.
    #[must_use]
    pub fn entities_with(world: &World, kinds: &[ComponentKind]) -> Vec<EntityId> {
        world
            .entities
            .iter()
            .filter(|(_, entity)| entity.has_all(kinds))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_count(world: &World) -> u64 {
        world.tick_count
    }

    /// Seed and parameters of the last successful generation.
    #[must_use]
    pub fn recipe(world: &World) -> Option<&TerrainRecipe> {
        world.recipe.as_ref()
    }

    /// Summarises the world for status displays.
    #[must_use]
    pub fn stats(world: &World) -> WorldStats {
        WorldStats {
            width: world.grid.width(),
            height: world.grid.height(),
            entities: world.entities.len(),
            occupied_tiles: world.grid.tiles().iter().filter(|tile| !tile.is_empty()).count(),
            tick_count: world.tick_count,
            terrain: world.grid.census(),
        }
    }

    /// Aggregate counters describing the world.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct WorldStats {
        /// Grid width in tiles.
        pub width: u32,
        /// Grid height in tiles.
        pub height: u32,
        /// Number of registered entities.
        pub entities: usize,
        /// Number of tiles bound to an entity.
        pub occupied_tiles: usize,
        /// Ticks processed so far.
        pub tick_count: u64,
        /// Tiles per terrain kind.
        pub terrain: TerrainCensus,
    }
}
