#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure render system that orders drawable entities back to front.
//!
//! The system never touches pixels. It filters entities carrying both a
//! position and a sprite, sorts them by isometric depth and hands each one to
//! an adapter-provided [`SpriteDrawer`].

use std::time::Duration;

use glam::Vec2;
use isoworld_core::{CellCoord, Command, ComponentKind, EntityId, EntityView, Sprite, System};

pub mod iso;

const DRAWABLE: &[ComponentKind] = &[ComponentKind::Position, ComponentKind::Sprite];

/// Adapter hook receiving sprites in draw order.
pub trait SpriteDrawer {
    /// Draws a single sprite.
    ///
    /// `screen` is the isometric projection of `cell` shifted by the sprite's
    /// pixel offset.
    fn draw_sprite(&mut self, entity: EntityId, sprite: &Sprite, cell: CellCoord, screen: Vec2);
}

impl<F> SpriteDrawer for F
where
    F: FnMut(EntityId, &Sprite, CellCoord, Vec2),
{
    fn draw_sprite(&mut self, entity: EntityId, sprite: &Sprite, cell: CellCoord, screen: Vec2) {
        self(entity, sprite, cell, screen);
    }
}

/// Drawable entity resolved from the entity table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Renderable<'a> {
    /// Entity being drawn.
    pub entity: EntityId,
    /// Cell the entity occupies.
    pub cell: CellCoord,
    /// Sprite attached to the entity.
    pub sprite: &'a Sprite,
}

impl Renderable<'_> {
    /// Screen position of the sprite, including its pixel offset.
    #[must_use]
    pub fn screen_position(&self) -> Vec2 {
        iso::cell_to_screen(self.cell)
            + Vec2::new(self.sprite.offset_x as f32, self.sprite.offset_y as f32)
    }
}

/// Collects drawable entities sorted by ascending `x + y`.
///
/// The sort is stable, so entities sharing a depth keep ascending identifier
/// order.
#[must_use]
pub fn draw_order(entities: EntityView<'_>) -> Vec<Renderable<'_>> {
    let mut renderables: Vec<Renderable<'_>> = entities
        .with(DRAWABLE)
        .filter_map(|(entity, record)| {
            Some(Renderable {
                entity,
                cell: record.position()?.cell(),
                sprite: record.sprite()?,
            })
        })
        .collect();
    renderables.sort_by_key(|renderable| renderable.cell.depth());
    renderables
}

/// System forwarding drawable entities to a [`SpriteDrawer`] every tick.
#[derive(Debug)]
pub struct RenderSystem<D> {
    drawer: D,
    frames: u64,
}

impl<D: SpriteDrawer> RenderSystem<D> {
    /// Creates a render system drawing through the provided adapter.
    #[must_use]
    pub const fn new(drawer: D) -> Self {
        Self { drawer, frames: 0 }
    }

    /// Draws every renderable entity once and returns how many were drawn.
    pub fn render(&mut self, entities: EntityView<'_>) -> usize {
        let renderables = draw_order(entities);
        for renderable in &renderables {
            self.drawer.draw_sprite(
                renderable.entity,
                renderable.sprite,
                renderable.cell,
                renderable.screen_position(),
            );
        }
        self.frames = self.frames.saturating_add(1);
        renderables.len()
    }

    /// Number of frames rendered so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Shared access to the drawing adapter.
    #[must_use]
    pub const fn drawer(&self) -> &D {
        &self.drawer
    }

    /// Consumes the system, returning the drawing adapter.
    #[must_use]
    pub fn into_drawer(self) -> D {
        self.drawer
    }
}

impl<D: SpriteDrawer> System for RenderSystem<D> {
    fn name(&self) -> &'static str {
        "render"
    }

    fn update(&mut self, entities: EntityView<'_>, _dt: Duration, _out: &mut Vec<Command>) {
        let _ = self.render(entities);
    }
}
