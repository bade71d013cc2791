//! Entities: an identifier plus at most one component per kind.

use std::collections::BTreeMap;

use crate::{Building, Component, ComponentKind, EntityId, Inventory, Position, Sprite};

/// Aggregate of typed components.
///
/// The identifier stays `None` until the world registers the entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Entity {
    id: Option<EntityId>,
    components: BTreeMap<ComponentKind, Component>,
}

impl Entity {
    /// Creates an entity without identifier or components.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an entity carrying a caller-chosen identifier.
    #[must_use]
    pub fn with_id(id: EntityId) -> Self {
        Self {
            id: Some(id),
            components: BTreeMap::new(),
        }
    }

    /// Identifier assigned to the entity, if any.
    #[must_use]
    pub const fn id(&self) -> Option<EntityId> {
        self.id
    }

    /// Overwrites the identifier; the world calls this when registering.
    pub fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    /// Builder-style variant of [`Entity::add_component`].
    #[must_use]
    pub fn with(mut self, component: impl Into<Component>) -> Self {
        let _ = self.add_component(component);
        self
    }

    /// Stores a component, returning the one it replaced.
    pub fn add_component(&mut self, component: impl Into<Component>) -> Option<Component> {
        let component = component.into();
        self.components.insert(component.kind(), component)
    }

    /// Retrieves the component of the provided kind.
    #[must_use]
    pub fn component(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.get(&kind)
    }

    /// Reports whether a component of the provided kind is attached.
    #[must_use]
    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.components.contains_key(&kind)
    }

    /// Reports whether components of every provided kind are attached.
    #[must_use]
    pub fn has_all(&self, kinds: &[ComponentKind]) -> bool {
        kinds.iter().all(|kind| self.has_component(*kind))
    }

    /// Detaches and returns the component of the provided kind.
    pub fn remove_component(&mut self, kind: ComponentKind) -> Option<Component> {
        self.components.remove(&kind)
    }

    /// Iterates attached components ordered by kind.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Position component, if attached.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match self.components.get(&ComponentKind::Position) {
            Some(Component::Position(position)) => Some(*position),
            _ => None,
        }
    }

    /// Sprite component, if attached.
    #[must_use]
    pub fn sprite(&self) -> Option<&Sprite> {
        match self.components.get(&ComponentKind::Sprite) {
            Some(Component::Sprite(sprite)) => Some(sprite),
            _ => None,
        }
    }

    /// Inventory component, if attached.
    #[must_use]
    pub fn inventory(&self) -> Option<&Inventory> {
        match self.components.get(&ComponentKind::Inventory) {
            Some(Component::Inventory(inventory)) => Some(inventory),
            _ => None,
        }
    }

    /// Mutable inventory component, if attached.
    pub fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        match self.components.get_mut(&ComponentKind::Inventory) {
            Some(Component::Inventory(inventory)) => Some(inventory),
            _ => None,
        }
    }

    /// Building component, if attached.
    #[must_use]
    pub fn building(&self) -> Option<Building> {
        match self.components.get(&ComponentKind::Building) {
            Some(Component::Building(building)) => Some(*building),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ItemKind;

    #[test]
    fn add_component_overwrites_same_kind() {
        let mut entity = Entity::new();
        assert!(entity.add_component(Position::new(1, 1)).is_none());
        let replaced = entity.add_component(Position::new(4, 2));
        assert_eq!(replaced, Some(Component::Position(Position::new(1, 1))));
        assert_eq!(entity.position(), Some(Position::new(4, 2)));
        assert_eq!(entity.components().count(), 1);
    }

    #[test]
    fn remove_component_only_touches_requested_kind() {
        let mut entity = Entity::new()
            .with(Position::new(0, 0))
            .with(Sprite::new("worker"));
        assert!(entity.remove_component(ComponentKind::Sprite).is_some());
        assert!(!entity.has_component(ComponentKind::Sprite));
        assert!(entity.has_component(ComponentKind::Position));
        assert!(entity.remove_component(ComponentKind::Sprite).is_none());
    }

    #[test]
    fn has_all_is_an_and_filter() {
        let entity = Entity::new()
            .with(Position::new(0, 0))
            .with(Inventory::default());
        assert!(entity.has_all(&[ComponentKind::Position, ComponentKind::Inventory]));
        assert!(!entity.has_all(&[ComponentKind::Position, ComponentKind::Sprite]));
        assert!(entity.has_all(&[]));
    }

    #[test]
    fn inventory_mut_edits_in_place() {
        let mut entity = Entity::new().with(Inventory::new(3));
        let added = entity
            .inventory_mut()
            .map(|inventory| inventory.add_item(ItemKind::Dirt, 2));
        assert_eq!(added, Some(2));
        assert_eq!(entity.inventory().map(|inventory| inventory.total()), Some(2));
    }
}
