//! Entity storage and identifier allocation.

use std::collections::BTreeMap;

use arena_battle_core::EntityId;

use crate::entity::Entity;

/// Registry that owns every entity and hands out monotonically increasing ids.
#[derive(Debug)]
pub(crate) struct EntityRegistry {
    entries: BTreeMap<EntityId, Entity>,
    next_entity_id: EntityId,
}

impl EntityRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_entity_id: EntityId::new(0),
        }
    }

    /// Reserves the next identifier.
    pub(crate) fn allocate(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id = EntityId::new(id.get().saturating_add(1));
        id
    }

    pub(crate) fn insert(&mut self, entity: Entity) {
        let _ = self.entries.insert(entity.id(), entity);
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entities in ascending id order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entries.values()
    }

    /// Identifiers in ascending order, detached from the map so callers can
    /// mutate the registry while walking them.
    pub(crate) fn snapshot(&self) -> Vec<EntityId> {
        self.entries.keys().copied().collect()
    }

    /// Identifiers of entities that will be removed by the next cleanup.
    pub(crate) fn dead(&self) -> Vec<EntityId> {
        self.entries
            .values()
            .filter(|entity| entity.is_dead())
            .map(Entity::id)
            .collect()
    }
}
