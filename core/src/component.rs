//! Data-only component records attached to entities.
//!
//! Components carry no behaviour and never reference their owning entity.
//! Systems and the world act on them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CellCoord, CellRectSize};

/// Identifies the kind of a component; an entity holds at most one per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Grid placement of the entity.
    Position,
    /// Visual representation handed to the renderer.
    Sprite,
    /// Item storage.
    Inventory,
    /// Marks an entity as a building and records its footprint.
    Building,
}

/// Closed set of components an entity may carry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Component {
    /// Grid placement of the entity.
    Position(Position),
    /// Visual representation handed to the renderer.
    Sprite(Sprite),
    /// Item storage.
    Inventory(Inventory),
    /// Building footprint descriptor.
    Building(Building),
}

impl Component {
    /// Kind identifier used to key the component inside an entity.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Position(_) => ComponentKind::Position,
            Self::Sprite(_) => ComponentKind::Sprite,
            Self::Inventory(_) => ComponentKind::Inventory,
            Self::Building(_) => ComponentKind::Building,
        }
    }
}

impl From<Position> for Component {
    fn from(value: Position) -> Self {
        Self::Position(value)
    }
}

impl From<Sprite> for Component {
    fn from(value: Sprite) -> Self {
        Self::Sprite(value)
    }
}

impl From<Inventory> for Component {
    fn from(value: Inventory) -> Self {
        Self::Inventory(value)
    }
}

impl From<Building> for Component {
    fn from(value: Building) -> Self {
        Self::Building(value)
    }
}

/// Tile coordinates occupied by an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column of the occupied tile.
    pub x: u32,
    /// Row of the occupied tile.
    pub y: u32,
}

impl Position {
    /// Creates a position at the provided tile.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Converts the position into a cell coordinate.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        CellCoord::new(self.x, self.y)
    }
}

impl From<CellCoord> for Position {
    fn from(cell: CellCoord) -> Self {
        Self::new(cell.x(), cell.y())
    }
}

/// Visual descriptor consumed by the rendering collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    /// Texture key resolved by the renderer.
    pub texture: String,
    /// Explicit draw width in pixels; the texture's own width when absent.
    pub width: Option<u32>,
    /// Explicit draw height in pixels; the texture's own height when absent.
    pub height: Option<u32>,
    /// Horizontal pixel offset applied when drawing.
    pub offset_x: i32,
    /// Vertical pixel offset applied when drawing.
    pub offset_y: i32,
}

impl Sprite {
    /// Creates a sprite drawn at the texture's natural size without offset.
    #[must_use]
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            texture: texture.into(),
            width: None,
            height: None,
            offset_x: 0,
            offset_y: 0,
        }
    }

    /// Overrides the draw size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Overrides the draw offset.
    #[must_use]
    pub fn with_offset(mut self, offset_x: i32, offset_y: i32) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }
}

/// Items that can be stored in an inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Loose soil dug out of grass.
    Dirt,
    /// Water scooped with a bucket.
    Water,
    /// Sand collected from beaches.
    Sand,
    /// Stone broken off rock with a pickaxe.
    Stone,
    /// Tool required to collect water.
    Bucket,
    /// Tool required to break rock.
    Pickaxe,
}

impl ItemKind {
    /// Whether the item is a tool rather than a material.
    #[must_use]
    pub const fn is_tool(self) -> bool {
        matches!(self, Self::Bucket | Self::Pickaxe)
    }
}

/// Bounded item storage.
///
/// `capacity` bounds the total quantity across every item kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    capacity: u32,
    items: BTreeMap<ItemKind, u32>,
    selected: Option<ItemKind>,
}

impl Inventory {
    /// Default capacity of a freshly created inventory.
    pub const DEFAULT_CAPACITY: u32 = 20;

    /// Creates an empty inventory holding at most `capacity` items in total.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            items: BTreeMap::new(),
            selected: None,
        }
    }

    /// Maximum total quantity the inventory can hold.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Stores up to `quantity` items and returns how many actually fit.
    pub fn add_item(&mut self, item: ItemKind, quantity: u32) -> u32 {
        let added = quantity.min(self.available_space());
        if added > 0 {
            *self.items.entry(item).or_insert(0) += added;
        }
        added
    }

    /// Removes up to `quantity` items and returns how many were taken.
    pub fn remove_item(&mut self, item: ItemKind, quantity: u32) -> u32 {
        let Some(current) = self.items.get_mut(&item) else {
            return 0;
        };
        let removed = (*current).min(quantity);
        *current -= removed;
        if *current == 0 {
            let _ = self.items.remove(&item);
        }
        removed
    }

    /// Quantity currently stored for an item.
    #[must_use]
    pub fn quantity(&self, item: ItemKind) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    /// Selects an item for use; fails when none is stored.
    pub fn select_item(&mut self, item: ItemKind) -> bool {
        if self.quantity(item) > 0 {
            self.selected = Some(item);
            true
        } else {
            false
        }
    }

    /// Item currently selected for use.
    #[must_use]
    pub const fn selected_item(&self) -> Option<ItemKind> {
        self.selected
    }

    /// Iterates stored items in a stable order.
    pub fn items(&self) -> impl Iterator<Item = (ItemKind, u32)> + '_ {
        self.items.iter().map(|(item, quantity)| (*item, *quantity))
    }

    /// Total quantity stored across every item kind.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.items
            .values()
            .fold(0, |total, quantity| total.saturating_add(*quantity))
    }

    /// Reports whether no more items fit.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.total() >= self.capacity
    }

    /// Remaining room before the capacity is reached.
    #[must_use]
    pub fn available_space(&self) -> u32 {
        self.capacity.saturating_sub(self.total())
    }

    /// Empties the inventory and clears the selection.
    pub fn clear(&mut self) {
        self.items.clear();
        self.selected = None;
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// Types of buildings that can be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingKind {
    /// Dwelling for settlers.
    House,
    /// Shed that stores harvested materials.
    Storage,
}

impl BuildingKind {
    /// Texture key used for the building's sprite.
    #[must_use]
    pub const fn texture(self) -> &'static str {
        match self {
            Self::House => "building_house",
            Self::Storage => "building_storage",
        }
    }
}

/// Marks an entity as a building covering a rectangular footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Building {
    /// Type of building.
    pub kind: BuildingKind,
    /// Cells covered, anchored at the entity's position.
    pub footprint: CellRectSize,
}
