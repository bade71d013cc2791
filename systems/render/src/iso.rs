//! Isometric projection between grid and screen space.

use glam::Vec2;
use isoworld_core::CellCoord;

/// Width of a tile diamond in screen pixels.
pub const TILE_WIDTH: f32 = 32.0;
/// Height of a tile diamond in screen pixels.
pub const TILE_HEIGHT: f32 = 16.0;

const HALF_TILE: Vec2 = Vec2::new(TILE_WIDTH / 2.0, TILE_HEIGHT / 2.0);

/// Projects fractional grid coordinates onto the screen.
#[must_use]
pub fn grid_to_screen(grid: Vec2) -> Vec2 {
    Vec2::new(grid.x - grid.y, grid.x + grid.y) * HALF_TILE
}

/// Screen position of a cell's top corner.
#[must_use]
pub fn cell_to_screen(cell: CellCoord) -> Vec2 {
    grid_to_screen(Vec2::new(cell.x() as f32, cell.y() as f32))
}

/// Inverse of [`grid_to_screen`], yielding fractional grid coordinates.
#[must_use]
pub fn screen_to_grid(screen: Vec2) -> Vec2 {
    let scaled = screen / HALF_TILE;
    Vec2::new(scaled.x + scaled.y, scaled.y - scaled.x) / 2.0
}

/// Cell containing the provided screen position.
///
/// Returns `None` when the position maps to negative or non-finite grid
/// coordinates.
#[must_use]
pub fn screen_to_cell(screen: Vec2) -> Option<CellCoord> {
    let grid = screen_to_grid(screen).floor();
    if !grid.is_finite() || grid.x < 0.0 || grid.y < 0.0 {
        return None;
    }
    if grid.x > u32::MAX as f32 || grid.y > u32::MAX as f32 {
        return None;
    }
    Some(CellCoord::new(grid.x as u32, grid.y as u32))
}
