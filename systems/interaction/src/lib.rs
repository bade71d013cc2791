#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure interaction system translating pointer input into world commands.

use isoworld_core::{
    BuildingKind, CellCoord, CellRectSize, Command, EntityId, ItemKind, TerrainKind,
};

/// Terrain and occupancy of a tile as reported by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileInfo {
    /// Terrain currently assigned to the tile.
    pub terrain: TerrainKind,
    /// Whether an entity is bound to the tile.
    pub occupied: bool,
}

impl TileInfo {
    /// Creates a tile descriptor.
    #[must_use]
    pub const fn new(terrain: TerrainKind, occupied: bool) -> Self {
        Self { terrain, occupied }
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InteractionInput {
    /// Cell currently under the cursor.
    pub hovered: Option<CellCoord>,
    /// Indicates whether the player confirmed a placement on this frame.
    pub confirm_action: bool,
    /// Indicates whether the player requested a harvest on this frame.
    pub harvest_action: bool,
    /// Item held by the acting entity.
    pub held_item: Option<ItemKind>,
    /// Building selected for construction, if any.
    pub blueprint: Option<BuildingKind>,
}

/// Action the confirm input would trigger on the hovered tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Turn an empty grass tile into sand.
    PlaceSand,
    /// Construct the selected building anchored at the tile.
    PlaceBuilding(BuildingKind),
}

/// Interaction system acting on behalf of a single entity.
#[derive(Clone, Debug)]
pub struct Interaction {
    actor: Option<EntityId>,
    footprint: CellRectSize,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Interaction {
    /// Creates an interaction system without an acting entity.
    ///
    /// Harvest input is ignored until an actor is assigned.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            actor: None,
            footprint: CellRectSize::UNIT,
        }
    }

    /// Assigns the entity whose inventory receives harvests.
    pub fn set_actor(&mut self, actor: Option<EntityId>) {
        self.actor = actor;
    }

    /// Entity whose inventory receives harvests.
    #[must_use]
    pub const fn actor(&self) -> Option<EntityId> {
        self.actor
    }

    /// Overrides the footprint used for building placement.
    #[must_use]
    pub const fn with_footprint(mut self, footprint: CellRectSize) -> Self {
        self.footprint = footprint;
        self
    }

    /// Resolves what confirming on the provided tile would do.
    ///
    /// A selected blueprint takes precedence over held sand. Sand only lands
    /// on unoccupied grass.
    #[must_use]
    pub fn preview(&self, input: &InteractionInput, tile: TileInfo) -> Option<Action> {
        if let Some(kind) = input.blueprint {
            return Some(Action::PlaceBuilding(kind));
        }
        let places_sand = input.held_item == Some(ItemKind::Sand)
            && tile.terrain == TerrainKind::Grass
            && !tile.occupied;
        places_sand.then_some(Action::PlaceSand)
    }

    /// Emits commands for the current frame's input.
    ///
    /// The `tile_at` closure should mirror the world's tile query and return
    /// `None` outside the grid.
    pub fn handle<F>(&mut self, input: InteractionInput, mut tile_at: F, out: &mut Vec<Command>)
    where
        F: FnMut(CellCoord) -> Option<TileInfo>,
    {
        let Some(cell) = input.hovered else {
            return;
        };
        let Some(tile) = tile_at(cell) else {
            return;
        };

        if input.confirm_action {
            match self.preview(&input, tile) {
                Some(Action::PlaceSand) => out.push(Command::SetTerrain {
                    cell,
                    terrain: TerrainKind::Sand,
                }),
                Some(Action::PlaceBuilding(kind)) => out.push(Command::PlaceBuilding {
                    kind,
                    origin: cell,
                    footprint: self.footprint,
                }),
                None => {}
            }
        }

        if input.harvest_action {
            if let Some(harvester) = self.actor {
                out.push(Command::Harvest {
                    harvester,
                    cell,
                    tool: input.held_item.filter(|item| item.is_tool()),
                });
            }
        }
    }
}
