//! Entity state store — in-memory mirror of the remote store.
//!
//! Written only from inbound state-change notifications and the initial
//! snapshot; every other component reads. The remote store always wins over
//! locally computed (optimistic) dial values, which live in the pages, not
//! here.

use std::collections::HashMap;

use deckhand_domain::entity::EntityState;
use deckhand_domain::id::EntityId;

/// Strongly-typed `EntityId -> EntityState` map.
#[derive(Debug, Default)]
pub struct StateStore {
    entries: HashMap<EntityId, EntityState>,
}

impl StateStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of an entity, when known.
    #[must_use]
    pub fn get(&self, entity_id: &EntityId) -> Option<&EntityState> {
        self.entries.get(entity_id)
    }

    /// Write an entity's state, returning the previous one.
    pub fn set(&mut self, entity_id: EntityId, state: EntityState) -> Option<EntityState> {
        self.entries.insert(entity_id, state)
    }

    /// Bulk-load a snapshot (connect-time seeding).
    pub fn seed(&mut self, entries: impl IntoIterator<Item = (EntityId, EntityState)>) {
        self.entries.extend(entries);
    }

    /// Number of known entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has seen no entities yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_none_for_unknown_entity() {
        let store = StateStore::new();
        assert!(store.get(&EntityId::new("light.kitchen")).is_none());
    }

    #[test]
    fn should_overwrite_and_return_previous_state() {
        let mut store = StateStore::new();
        let id = EntityId::new("light.kitchen");
        store.set(id.clone(), EntityState::new("off"));

        let previous = store.set(id.clone(), EntityState::new("on")).unwrap();
        assert_eq!(previous.state, "off");
        assert_eq!(store.get(&id).unwrap().state, "on");
    }

    #[test]
    fn should_seed_multiple_entities() {
        let mut store = StateStore::new();
        store.seed(vec![
            (EntityId::new("light.a"), EntityState::new("on")),
            (EntityId::new("light.b"), EntityState::new("off")),
        ]);
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
    }
}
