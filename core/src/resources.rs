//! Static table of what each terrain yields when harvested.

use crate::{ItemKind, TerrainKind};

/// Item and quantity collected from a single harvest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HarvestYield {
    /// Item collected.
    pub item: ItemKind,
    /// Quantity produced before inventory limits apply.
    pub quantity: u32,
}

struct TileResource {
    terrain: TerrainKind,
    item: ItemKind,
    quantity: u32,
    required_tool: Option<ItemKind>,
}

const TILE_RESOURCES: [TileResource; 4] = [
    TileResource {
        terrain: TerrainKind::Grass,
        item: ItemKind::Dirt,
        quantity: 2,
        required_tool: None,
    },
    TileResource {
        terrain: TerrainKind::Water,
        item: ItemKind::Water,
        quantity: 5,
        required_tool: Some(ItemKind::Bucket),
    },
    TileResource {
        terrain: TerrainKind::Sand,
        item: ItemKind::Sand,
        quantity: 3,
        required_tool: None,
    },
    TileResource {
        terrain: TerrainKind::Rock,
        item: ItemKind::Stone,
        quantity: 1,
        required_tool: Some(ItemKind::Pickaxe),
    },
];

/// Resolves the yield of a terrain kind for the held tool.
///
/// Returns `None` when the terrain yields nothing or the required tool is
/// not held.
#[must_use]
pub fn resource_for(terrain: TerrainKind, tool: Option<ItemKind>) -> Option<HarvestYield> {
    let resource = TILE_RESOURCES
        .iter()
        .find(|resource| resource.terrain == terrain)?;
    if resource.required_tool.is_some() && resource.required_tool != tool {
        return None;
    }
    Some(HarvestYield {
        item: resource.item,
        quantity: resource.quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grass_and_sand_need_no_tool() {
        assert_eq!(
            resource_for(TerrainKind::Grass, None),
            Some(HarvestYield {
                item: ItemKind::Dirt,
                quantity: 2
            })
        );
        assert_eq!(
            resource_for(TerrainKind::Sand, Some(ItemKind::Bucket)).map(|y| y.item),
            Some(ItemKind::Sand)
        );
    }

    #[test]
    fn water_requires_bucket() {
        assert_eq!(resource_for(TerrainKind::Water, None), None);
        assert_eq!(resource_for(TerrainKind::Water, Some(ItemKind::Pickaxe)), None);
        assert_eq!(
            resource_for(TerrainKind::Water, Some(ItemKind::Bucket)).map(|y| y.quantity),
            Some(5)
        );
    }

    #[test]
    fn border_and_tree_yield_nothing() {
        assert_eq!(resource_for(TerrainKind::Border, Some(ItemKind::Pickaxe)), None);
        assert_eq!(resource_for(TerrainKind::Tree, None), None);
    }
}
