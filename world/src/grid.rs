//! Tile grid: terrain generation, bounds checks, neighbours and area reservation.

use isoworld_core::{CellCoord, CellRect, Direction, EntityId, TerrainKind};

use crate::{
    config::GenerationConfig,
    noise::{Lcg, NoiseField},
};

/// Purpose tag mixed into the world seed for the decoration stream.
const DECORATION_STREAM: u64 = 0x6465_636f_7261_7465;

/// A single grid cell's terrain and occupancy record.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    cell: CellCoord,
    terrain: TerrainKind,
    walkable: bool,
    buildable: bool,
    occupant: Option<EntityId>,
    elevation: f32,
}

impl Tile {
    fn new(cell: CellCoord) -> Self {
        let terrain = TerrainKind::default();
        Self {
            cell,
            terrain,
            walkable: terrain.walkable(),
            buildable: terrain.buildable(),
            occupant: None,
            elevation: 0.0,
        }
    }

    /// Column of the tile.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.cell.x()
    }

    /// Row of the tile.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.cell.y()
    }

    /// Coordinates of the tile.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Terrain currently assigned to the tile.
    #[must_use]
    pub const fn terrain(&self) -> TerrainKind {
        self.terrain
    }

    /// Whether units may traverse the tile.
    #[must_use]
    pub const fn walkable(&self) -> bool {
        self.walkable
    }

    /// Whether the terrain accepts construction.
    #[must_use]
    pub const fn buildable(&self) -> bool {
        self.buildable
    }

    /// Entity bound to the tile, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<EntityId> {
        self.occupant
    }

    /// Reserved height value; not used by any query yet.
    #[must_use]
    pub const fn elevation(&self) -> f32 {
        self.elevation
    }

    /// True when no entity is bound to the tile.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    /// True when the tile is buildable and unoccupied.
    #[must_use]
    pub const fn can_build(&self) -> bool {
        self.buildable && self.is_empty()
    }

    fn assign_terrain(&mut self, terrain: TerrainKind) {
        self.terrain = terrain;
        self.walkable = terrain.walkable();
        self.buildable = terrain.buildable();
    }

    pub(crate) fn bind(&mut self, entity: EntityId) {
        self.occupant = Some(entity);
    }

    pub(crate) fn unbind(&mut self) {
        self.occupant = None;
    }
}

/// Number of tiles per terrain kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainCensus {
    counts: [usize; TerrainKind::ALL.len()],
}

impl TerrainCensus {
    /// Number of tiles of the provided kind.
    #[must_use]
    pub fn count(&self, kind: TerrainKind) -> usize {
        self.counts[census_slot(kind)]
    }

    /// Iterates `(kind, count)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (TerrainKind, usize)> + '_ {
        TerrainKind::ALL
            .iter()
            .map(|kind| (*kind, self.counts[census_slot(*kind)]))
    }
}

fn census_slot(kind: TerrainKind) -> usize {
    match kind {
        TerrainKind::Grass => 0,
        TerrainKind::Water => 1,
        TerrainKind::Sand => 2,
        TerrainKind::Rock => 3,
        TerrainKind::Tree => 4,
        TerrainKind::Border => 5,
    }
}

/// Fixed-size 2D array of tiles stored row-major.
#[derive(Clone, Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Allocates `width * height` grass tiles.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: allocate_tiles(width, height),
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether signed coordinates fall inside the grid.
    #[must_use]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    /// Tile at the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<&Tile> {
        self.index(cell).and_then(|index| self.tiles.get(index))
    }

    /// Tile at signed coordinates, or `None` outside the grid.
    #[must_use]
    pub fn tile_at(&self, x: i64, y: i64) -> Option<&Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let cell = CellCoord::new(u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        self.tile(cell)
    }

    pub(crate) fn tile_mut(&mut self, cell: CellCoord) -> Option<&mut Tile> {
        self.index(cell).and_then(|index| self.tiles.get_mut(index))
    }

    /// Every tile in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Iterates rows of tiles from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        let width = usize::try_from(self.width).unwrap_or(0).max(1);
        self.tiles.chunks(width)
    }

    /// Overwrites a tile's terrain, applying the kind's walkable and
    /// buildable defaults. Returns the previous terrain.
    pub fn set_terrain(&mut self, cell: CellCoord, terrain: TerrainKind) -> Option<TerrainKind> {
        let tile = self.tile_mut(cell)?;
        let previous = tile.terrain;
        tile.assign_terrain(terrain);
        Some(previous)
    }

    /// Assigns terrain to every tile from seeded fractal noise, then rings
    /// the grid with border tiles.
    ///
    /// Occupancy is left untouched. The caller is expected to validate the
    /// configuration first.
    pub fn generate_terrain(&mut self, seed: u64, config: &GenerationConfig) {
        let noise = NoiseField::new(seed);
        let mut decoration = Lcg::new(derive_seed(seed, DECORATION_STREAM));

        for tile in &mut self.tiles {
            let value = noise.fractal(
                f64::from(tile.x()),
                f64::from(tile.y()),
                config.octaves,
                config.persistence,
                config.lacunarity,
                config.scale,
            );
            tile.assign_terrain(classify(value, config, &mut decoration));
        }

        self.apply_border();
    }

    fn apply_border(&mut self) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        let last_column = self.width - 1;
        let last_row = self.height - 1;
        for x in 0..self.width {
            let _ = self.set_terrain(CellCoord::new(x, 0), TerrainKind::Border);
            let _ = self.set_terrain(CellCoord::new(x, last_row), TerrainKind::Border);
        }
        for y in 0..self.height {
            let _ = self.set_terrain(CellCoord::new(0, y), TerrainKind::Border);
            let _ = self.set_terrain(CellCoord::new(last_column, y), TerrainKind::Border);
        }
    }

    /// Counts tiles per terrain kind.
    #[must_use]
    pub fn census(&self) -> TerrainCensus {
        let mut census = TerrainCensus::default();
        for tile in &self.tiles {
            census.counts[census_slot(tile.terrain)] += 1;
        }
        census
    }

    /// Tiles of the provided terrain kind in row-major order.
    pub fn tiles_by_terrain(&self, terrain: TerrainKind) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(move |tile| tile.terrain == terrain)
    }

    /// True when every tile of the rectangle exists, is buildable and is
    /// unoccupied.
    #[must_use]
    pub fn is_area_free(&self, area: CellRect) -> bool {
        self.contains_rect(area)
            && area
                .cells()
                .all(|cell| self.tile(cell).is_some_and(Tile::can_build))
    }

    /// Reports whether the whole rectangle lies inside the grid.
    #[must_use]
    pub fn contains_rect(&self, area: CellRect) -> bool {
        let origin = area.origin();
        let size = area.size();
        u64::from(origin.x()) + u64::from(size.width()) <= u64::from(self.width)
            && u64::from(origin.y()) + u64::from(size.height()) <= u64::from(self.height)
    }

    /// Binds `entity` to every in-bounds tile of the rectangle.
    ///
    /// No validation is performed; callers check [`Grid::is_area_free`] first.
    pub fn reserve_area(&mut self, area: CellRect, entity: EntityId) {
        for cell in area.cells() {
            if let Some(tile) = self.tile_mut(cell) {
                tile.bind(entity);
            }
        }
    }

    /// Clears the occupant of every in-bounds tile of the rectangle.
    pub fn free_area(&mut self, area: CellRect) {
        for cell in area.cells() {
            if let Some(tile) = self.tile_mut(cell) {
                tile.unbind();
            }
        }
    }

    /// The orthogonal neighbours of a cell (east, west, south, north) that lie
    /// inside the grid.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = (Direction, &Tile)> {
        Direction::ALL.into_iter().filter_map(move |direction| {
            let neighbour = cell.step(direction)?;
            Some((direction, self.tile(neighbour)?))
        })
    }

    /// Straight-line stepper from `from` to `to`, closing the column gap
    /// before the row gap. The start cell is not included.
    ///
    /// This is not a shortest-path search: walkability and occupancy are
    /// ignored entirely.
    #[must_use]
    pub fn find_path(&self, from: CellCoord, to: CellCoord) -> Vec<CellCoord> {
        let mut path = Vec::with_capacity(usize::try_from(from.manhattan_distance(to)).unwrap_or(0));
        let (mut x, mut y) = (from.x(), from.y());
        while (x, y) != (to.x(), to.y()) {
            if x < to.x() {
                x += 1;
            } else if x > to.x() {
                x -= 1;
            } else if y < to.y() {
                y += 1;
            } else {
                y -= 1;
            }
            path.push(CellCoord::new(x, y));
        }
        path
    }

    /// Reallocates every tile to the default grass record.
    pub fn clear(&mut self) {
        self.tiles = allocate_tiles(self.width, self.height);
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.x() < self.width && cell.y() < self.height {
            let row = usize::try_from(cell.y()).ok()?;
            let column = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

fn allocate_tiles(width: u32, height: u32) -> Vec<Tile> {
    let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
    let mut tiles = Vec::with_capacity(capacity);
    for y in 0..height {
        for x in 0..width {
            tiles.push(Tile::new(CellCoord::new(x, y)));
        }
    }
    tiles
}

/// Maps a normalised noise value to a terrain kind.
///
/// Thresholds are compared with strict less-than in ascending order, so a
/// value equal to a threshold falls into the next band. Decoration rolls are
/// drawn only in the bands that use them.
pub(crate) fn classify(value: f64, config: &GenerationConfig, decoration: &mut Lcg) -> TerrainKind {
    if value < config.water_level {
        TerrainKind::Water
    } else if value < config.sand_level {
        if decoration.next_unit() < config.scattered_rock_chance {
            TerrainKind::Rock
        } else {
            TerrainKind::Sand
        }
    } else if value < config.grass_level {
        if decoration.next_unit() < config.tree_chance {
            TerrainKind::Tree
        } else if decoration.next_unit() < config.scattered_rock_chance {
            TerrainKind::Rock
        } else {
            TerrainKind::Grass
        }
    } else {
        // Rock band below `rock_level` and the mountain band above it share a kind.
        TerrainKind::Rock
    }
}

fn derive_seed(seed: u64, purpose: u64) -> u64 {
    let mut hash = seed ^ purpose;
    hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
    hash ^ (hash >> 32)
}
