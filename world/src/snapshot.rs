//! Serialisable world snapshots.
//!
//! Snapshots record dimensions, entities, counters and the terrain recipe.
//! Terrain is regenerated from the recipe on restore, so tiles edited after
//! generation come back as generated.

use isoworld_core::{Component, ComponentKind, ConfigError, Entity, EntityId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{TerrainRecipe, World};

/// Serialisable image of a [`World`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot {
    /// Grid width in tiles.
    pub width: u32,
    /// Grid height in tiles.
    pub height: u32,
    /// Registered entities in ascending identifier order.
    pub entities: Vec<EntitySnapshot>,
    /// Ticks processed when the snapshot was taken.
    pub tick_count: u64,
    /// Identifier the next registered entity would receive.
    #[serde(default)]
    pub next_entity_id: u64,
    /// Recipe of the generated terrain, absent for ungenerated grids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain: Option<TerrainRecipe>,
}

/// Serialisable image of a single entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Identifier of the entity.
    pub id: EntityId,
    /// `[kind, data]` pairs, one per attached component.
    pub components: Vec<(ComponentKind, Component)>,
}

/// Failures raised while restoring or encoding a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The grid must have at least one row and one column.
    #[error("snapshot dimensions {width}x{height} describe an empty grid")]
    InvalidDimensions {
        /// Width recorded in the snapshot.
        width: u32,
        /// Height recorded in the snapshot.
        height: u32,
    },
    /// A component was filed under a kind that does not match its data.
    #[error("{entity} lists {found:?} data under the {declared:?} kind")]
    ComponentKindMismatch {
        /// Entity carrying the component.
        entity: EntityId,
        /// Kind recorded next to the data.
        declared: ComponentKind,
        /// Kind of the data itself.
        found: ComponentKind,
    },
    /// Two entities share an identifier.
    #[error("{0} appears more than once")]
    DuplicateEntity(EntityId),
    /// An inventory stores more items than its capacity allows.
    #[error("{entity} stores {stored} items in an inventory of capacity {capacity}")]
    InventoryOverflow {
        /// Entity carrying the inventory.
        entity: EntityId,
        /// Capacity recorded for the inventory.
        capacity: u32,
        /// Total quantity recorded across every item kind.
        stored: u64,
    },
    /// The recorded terrain recipe cannot be generated.
    #[error("terrain recipe is invalid")]
    InvalidTerrain(#[source] ConfigError),
    /// JSON encoding or decoding failed.
    #[error("snapshot JSON is malformed")]
    Json(#[from] serde_json::Error),
}

impl World {
    /// Captures the world as a snapshot.
    #[must_use]
    pub fn serialize(&self) -> WorldSnapshot {
        let entities = self
            .entities
            .iter()
            .map(|(id, entity)| EntitySnapshot {
                id: *id,
                components: entity
                    .components()
                    .map(|component| (component.kind(), component.clone()))
                    .collect(),
            })
            .collect();

        WorldSnapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            entities,
            tick_count: self.tick_count,
            next_entity_id: self.next_entity_id,
            terrain: self.recipe.clone(),
        }
    }

    /// Rebuilds a world from a snapshot.
    ///
    /// Terrain is regenerated from the recorded recipe and every entity is
    /// registered under its recorded identifier in ascending order, binding
    /// tiles the way [`World::add_entity`] does. Inventories holding more
    /// than their capacity are rejected.
    pub fn deserialize(snapshot: WorldSnapshot) -> Result<Self, SnapshotError> {
        let WorldSnapshot {
            width,
            height,
            entities,
            tick_count,
            next_entity_id,
            terrain,
        } = snapshot;

        if width == 0 || height == 0 {
            return Err(SnapshotError::InvalidDimensions { width, height });
        }

        let mut world = Self::new(width, height);
        if let Some(recipe) = terrain {
            world
                .generate(recipe.seed, &recipe.config)
                .map_err(SnapshotError::InvalidTerrain)?;
        }

        for record in entities {
            if world.entities.contains_key(&record.id) {
                return Err(SnapshotError::DuplicateEntity(record.id));
            }

            let mut entity = Entity::with_id(record.id);
            for (declared, component) in record.components {
                if declared != component.kind() {
                    return Err(SnapshotError::ComponentKindMismatch {
                        entity: record.id,
                        declared,
                        found: component.kind(),
                    });
                }
                let _ = entity.add_component(component);
            }

            if let Some(inventory) = entity.inventory() {
                let stored: u64 = inventory.items().map(|(_, quantity)| u64::from(quantity)).sum();
                if stored > u64::from(inventory.capacity()) {
                    return Err(SnapshotError::InventoryOverflow {
                        entity: record.id,
                        capacity: inventory.capacity(),
                        stored,
                    });
                }
            }

            let _ = world.add_entity(entity);
        }

        world.next_entity_id = world.next_entity_id.max(next_entity_id);
        world.tick_count = tick_count;
        debug!(
            width,
            height,
            entities = world.entities.len(),
            tick_count,
            "world restored from snapshot"
        );
        Ok(world)
    }

    /// Encodes the world snapshot as JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&self.serialize())?)
    }

    /// Decodes a JSON snapshot and rebuilds the world from it.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: WorldSnapshot = serde_json::from_str(json)?;
        Self::deserialize(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{query, GenerationConfig};
    use isoworld_core::{
        Building, BuildingKind, CellCoord, CellRectSize, Inventory, ItemKind, Position, Sprite,
    };

    #[test]
    fn json_uses_camel_case_tick_count() {
        let mut world = World::new(3, 2);
        world.update(std::time::Duration::from_secs(1));
        let json = world.to_json().expect("encodes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["tickCount"], 1);
        assert_eq!(value["width"], 3);
        assert!(value.get("terrain").is_none());
    }

    #[test]
    fn components_serialize_as_kind_data_pairs() {
        let mut world = World::new(4, 4);
        let _ = world.add_entity(Entity::new().with(Position::new(1, 2)));
        let value = serde_json::to_value(world.serialize()).expect("encodes");
        assert_eq!(
            value["entities"][0]["components"][0],
            serde_json::json!(["Position", {"x": 1, "y": 2}])
        );
    }

    #[test]
    fn restore_rebinds_entities_and_counters() {
        let mut world = World::new(12, 12);
        let house = world
            .place_building(CellCoord::new(1, 1), BuildingKind::House, CellRectSize::new(2, 2))
            .expect("fresh grid accepts placement");
        let mut inventory = Inventory::new(10);
        let _ = inventory.add_item(ItemKind::Sand, 4);
        let worker = world.add_entity(
            Entity::new()
                .with(Position::new(5, 5))
                .with(Sprite::new("worker").with_offset(0, -8))
                .with(inventory),
        );
        world
            .generate(99, &GenerationConfig::default())
            .expect("defaults are valid");
        let scratch = world.add_entity(Entity::new());
        assert!(world.remove_entity(scratch));
        world.update(std::time::Duration::from_millis(16));

        let json = world.to_json().expect("encodes");
        let mut restored = World::from_json(&json).expect("decodes");

        assert_eq!(restored.serialize(), world.serialize());
        assert_eq!(
            query::grid(&restored).census(),
            query::grid(&world).census()
        );
        for tile in query::grid(&world).tiles() {
            assert_eq!(
                query::entity_at(&restored, tile.cell()),
                tile.occupant(),
                "occupant at {}",
                tile.cell()
            );
        }
        assert_eq!(query::entity_at(&restored, CellCoord::new(2, 2)), Some(house));
        assert_eq!(query::entity_at(&restored, CellCoord::new(5, 5)), Some(worker));
        assert_eq!(
            restored.add_entity(Entity::new()),
            EntityId::new(scratch.get() + 1)
        );
    }

    #[test]
    fn spawned_building_restores_beside_worker() {
        let mut world = World::new(6, 6);
        let worker = world.add_entity(Entity::new().with(Position::new(2, 2)));
        let shed = world.add_entity(Entity::new().with(Position::new(1, 1)).with(Building {
            kind: BuildingKind::Storage,
            footprint: CellRectSize::new(2, 2),
        }));
        assert_eq!(query::entity_at(&world, CellCoord::new(2, 2)), Some(worker));
        assert_eq!(query::entity_at(&world, CellCoord::new(2, 1)), Some(shed));

        let restored = World::from_json(&world.to_json().expect("encodes")).expect("decodes");

        assert_eq!(query::entity_at(&restored, CellCoord::new(2, 2)), Some(worker));
        for tile in query::grid(&world).tiles() {
            assert_eq!(
                query::entity_at(&restored, tile.cell()),
                tile.occupant(),
                "occupant at {}",
                tile.cell()
            );
        }
    }

    #[test]
    fn over_capacity_inventories_are_rejected() {
        let json = r#"{
            "width": 4,
            "height": 4,
            "tickCount": 0,
            "entities": [{
                "id": 0,
                "components": [
                    ["Inventory", {"capacity": 5, "items": {"dirt": 4000000000, "sand": 4000000000}}]
                ]
            }]
        }"#;
        assert!(matches!(
            World::from_json(json),
            Err(SnapshotError::InventoryOverflow {
                capacity: 5,
                stored: 8_000_000_000,
                ..
            })
        ));
    }

    #[test]
    fn zero_sized_snapshots_are_rejected() {
        let snapshot = WorldSnapshot {
            width: 0,
            height: 4,
            entities: Vec::new(),
            tick_count: 0,
            next_entity_id: 0,
            terrain: None,
        };
        assert!(matches!(
            World::deserialize(snapshot),
            Err(SnapshotError::InvalidDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn mismatched_kinds_are_rejected() {
        let snapshot = WorldSnapshot {
            width: 4,
            height: 4,
            entities: vec![EntitySnapshot {
                id: EntityId::new(0),
                components: vec![(ComponentKind::Sprite, Position::new(1, 1).into())],
            }],
            tick_count: 0,
            next_entity_id: 1,
            terrain: None,
        };
        assert!(matches!(
            World::deserialize(snapshot),
            Err(SnapshotError::ComponentKindMismatch {
                declared: ComponentKind::Sprite,
                found: ComponentKind::Position,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let record = EntitySnapshot {
            id: EntityId::new(3),
            components: Vec::new(),
        };
        let snapshot = WorldSnapshot {
            width: 4,
            height: 4,
            entities: vec![record.clone(), record],
            tick_count: 0,
            next_entity_id: 4,
            terrain: None,
        };
        assert!(matches!(
            World::deserialize(snapshot),
            Err(SnapshotError::DuplicateEntity(id)) if id == EntityId::new(3)
        ));
    }

    #[test]
    fn malformed_json_reports_decode_error() {
        assert!(matches!(
            World::from_json("{\"width\": 4"),
            Err(SnapshotError::Json(_))
        ));
    }
}
