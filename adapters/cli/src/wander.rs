//! Random walk system for settlers.

use std::time::Duration;

use isoworld_core::{Command, ComponentKind, Direction, EntityView, System};
use isoworld_world::Grid;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

const WANDERERS: &[ComponentKind] = &[ComponentKind::Position, ComponentKind::Inventory];

/// Moves every settler one step in a random walkable direction per tick.
///
/// Walkability is captured when the system is built; terrain edits made later
/// are not observed.
#[derive(Debug)]
pub(crate) struct Wanderer {
    rng: ChaCha8Rng,
    width: u32,
    walkable: Vec<bool>,
}

impl Wanderer {
    pub(crate) fn new(seed: u64, grid: &Grid) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            width: grid.width(),
            walkable: grid.tiles().iter().map(|tile| tile.walkable()).collect(),
        }
    }

    fn is_walkable(&self, x: u32, y: u32) -> bool {
        if x >= self.width {
            return false;
        }
        let index = u64::from(y) * u64::from(self.width) + u64::from(x);
        usize::try_from(index)
            .ok()
            .and_then(|index| self.walkable.get(index))
            .copied()
            .unwrap_or(false)
    }
}

impl System for Wanderer {
    fn name(&self) -> &'static str {
        "wanderer"
    }

    fn update(&mut self, entities: EntityView<'_>, _dt: Duration, out: &mut Vec<Command>) {
        for (entity, record) in entities.with(WANDERERS) {
            if record.building().is_some() {
                continue;
            }
            let Some(position) = record.position() else {
                continue;
            };

            let mut directions = Direction::ALL;
            directions.shuffle(&mut self.rng);
            let destination = directions
                .into_iter()
                .filter_map(|direction| position.cell().step(direction))
                .find(|cell| self.is_walkable(cell.x(), cell.y()));

            if let Some(to) = destination {
                out.push(Command::MoveEntity { entity, to });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isoworld_core::{CellCoord, Entity, EntityId, Inventory, Position, TerrainKind};
    use std::collections::BTreeMap;

    #[test]
    fn settlers_only_step_onto_walkable_tiles() {
        let mut grid = Grid::new(3, 3);
        for cell in [(1, 0), (0, 1), (2, 1)] {
            let _ = grid.set_terrain(CellCoord::new(cell.0, cell.1), TerrainKind::Water);
        }
        let mut wanderer = Wanderer::new(11, &grid);

        let mut entities = BTreeMap::new();
        let _ = entities.insert(
            EntityId::new(0),
            Entity::with_id(EntityId::new(0))
                .with(Position::new(1, 1))
                .with(Inventory::default()),
        );

        for _ in 0..16 {
            let mut commands = Vec::new();
            wanderer.update(EntityView::new(&entities), Duration::ZERO, &mut commands);
            assert_eq!(
                commands,
                vec![Command::MoveEntity {
                    entity: EntityId::new(0),
                    to: CellCoord::new(1, 2),
                }]
            );
        }
    }
}
