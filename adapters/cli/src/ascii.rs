//! Text rendering of the world for terminal output.

use glam::Vec2;
use isoworld_core::{CellCoord, EntityId, Sprite, TerrainKind};
use isoworld_system_render::SpriteDrawer;
use isoworld_world::Grid;

/// Character grid that terrain and sprites are painted onto.
#[derive(Clone, Debug)]
pub(crate) struct AsciiCanvas {
    width: usize,
    glyphs: Vec<char>,
}

impl AsciiCanvas {
    /// Paints the terrain of every tile.
    pub(crate) fn from_grid(grid: &Grid) -> Self {
        Self {
            width: usize::try_from(grid.width()).unwrap_or(0),
            glyphs: grid
                .tiles()
                .iter()
                .map(|tile| terrain_glyph(tile.terrain()))
                .collect(),
        }
    }

    /// Joins the painted rows with newlines.
    pub(crate) fn render(&self) -> String {
        if self.width == 0 {
            return String::new();
        }
        self.glyphs
            .chunks(self.width)
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn paint(&mut self, cell: CellCoord, glyph: char) {
        let (Ok(x), Ok(y)) = (usize::try_from(cell.x()), usize::try_from(cell.y())) else {
            return;
        };
        if x >= self.width {
            return;
        }
        if let Some(slot) = self.glyphs.get_mut(y * self.width + x) {
            *slot = glyph;
        }
    }
}

impl SpriteDrawer for AsciiCanvas {
    fn draw_sprite(&mut self, _entity: EntityId, sprite: &Sprite, cell: CellCoord, _screen: Vec2) {
        self.paint(cell, sprite_glyph(&sprite.texture));
    }
}

fn terrain_glyph(terrain: TerrainKind) -> char {
    match terrain {
        TerrainKind::Grass => '.',
        TerrainKind::Water => '~',
        TerrainKind::Sand => ':',
        TerrainKind::Rock => '^',
        TerrainKind::Tree => 'T',
        TerrainKind::Border => '#',
    }
}

fn sprite_glyph(texture: &str) -> char {
    match texture {
        "building_house" => 'H',
        "building_storage" => 'S',
        "settler" => '@',
        other => other
            .chars()
            .next()
            .map_or('?', |glyph| glyph.to_ascii_uppercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprites_overwrite_terrain_glyphs() {
        let grid = Grid::new(3, 2);
        let mut canvas = AsciiCanvas::from_grid(&grid);
        canvas.draw_sprite(
            EntityId::new(0),
            &Sprite::new("settler"),
            CellCoord::new(1, 1),
            Vec2::ZERO,
        );
        canvas.draw_sprite(
            EntityId::new(1),
            &Sprite::new("wagon"),
            CellCoord::new(2, 0),
            Vec2::ZERO,
        );
        canvas.draw_sprite(
            EntityId::new(2),
            &Sprite::new("lost"),
            CellCoord::new(7, 0),
            Vec2::ZERO,
        );
        assert_eq!(canvas.render(), "..W\n.@.");
    }

    #[test]
    fn every_terrain_has_a_distinct_glyph() {
        let mut glyphs: Vec<char> = TerrainKind::ALL.iter().map(|kind| terrain_glyph(*kind)).collect();
        glyphs.sort_unstable();
        glyphs.dedup();
        assert_eq!(glyphs.len(), TerrainKind::ALL.len());
    }
}
