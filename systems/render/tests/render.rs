use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use isoworld_core::{
    CellCoord, Entity, EntityId, EntityView, Inventory, Position, Sprite, System,
};
use isoworld_system_render::{draw_order, iso, RenderSystem};

fn table(entities: Vec<Entity>) -> BTreeMap<EntityId, Entity> {
    entities
        .into_iter()
        .enumerate()
        .map(|(index, mut entity)| {
            let id = EntityId::new(index as u64);
            entity.assign_id(id);
            (id, entity)
        })
        .collect()
}

fn drawable(x: u32, y: u32, texture: &str) -> Entity {
    Entity::new()
        .with(Position::new(x, y))
        .with(Sprite::new(texture))
}

#[test]
fn entities_are_drawn_back_to_front() {
    let entities = table(vec![
        drawable(4, 4, "far"),
        drawable(0, 1, "near"),
        drawable(2, 0, "middle"),
        drawable(1, 1, "middle_tie"),
    ]);

    let order: Vec<&str> = draw_order(EntityView::new(&entities))
        .iter()
        .map(|renderable| renderable.sprite.texture.as_str())
        .collect();

    assert_eq!(order, ["near", "middle", "middle_tie", "far"]);
}

#[test]
fn entities_missing_position_or_sprite_are_skipped() {
    let entities = table(vec![
        Entity::new().with(Position::new(1, 1)).with(Inventory::default()),
        Entity::new().with(Sprite::new("floating")),
        drawable(3, 3, "visible"),
    ]);

    let order = draw_order(EntityView::new(&entities));
    assert_eq!(order.len(), 1);
    assert_eq!(order[0].entity, EntityId::new(2));
}

#[test]
fn render_system_forwards_projection_and_offset() {
    let entities = table(vec![
        Entity::new()
            .with(Position::new(2, 1))
            .with(Sprite::new("worker").with_offset(0, -12)),
        drawable(0, 0, "marker"),
    ]);

    let mut calls = Vec::new();
    {
        let mut system = RenderSystem::new(
            |entity: EntityId, sprite: &Sprite, cell: CellCoord, screen: Vec2| {
                calls.push((entity, sprite.texture.clone(), cell, screen));
            },
        );
        let mut commands = Vec::new();
        system.update(EntityView::new(&entities), Duration::from_millis(16), &mut commands);
        assert!(commands.is_empty());
        assert_eq!(system.frames(), 1);
    }

    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, "marker");
    assert_eq!(calls[1].2, CellCoord::new(2, 1));
    assert_eq!(
        calls[1].3,
        iso::cell_to_screen(CellCoord::new(2, 1)) + Vec2::new(0.0, -12.0)
    );
    assert_eq!(calls[1].3, Vec2::new(16.0, 12.0));
}
