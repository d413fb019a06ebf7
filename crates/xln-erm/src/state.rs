//! Shared mutable state behind the service: one `EntityState` per entity.

use crate::domain::EntityState;
use parking_lot::RwLock;
use shared_types::{EntityConfig, EntityId};
use std::collections::HashMap;

#[derive(Default)]
pub struct ErmState {
    entities: RwLock<HashMap<EntityId, EntityState>>,
}

impl ErmState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_open(
        &self,
        entity_id: EntityId,
        config: impl FnOnce() -> EntityConfig,
    ) -> parking_lot::MappedRwLockWriteGuard<'_, EntityState> {
        {
            let mut entities = self.entities.write();
            entities
                .entry(entity_id)
                .or_insert_with(|| EntityState::new(entity_id, config()));
        }
        parking_lot::RwLockWriteGuard::map(self.entities.write(), |m| m.get_mut(&entity_id).unwrap())
    }

    pub fn height_of(&self, entity_id: EntityId) -> Option<u64> {
        self.entities.read().get(&entity_id).map(|e| e.height)
    }

    pub fn contains(&self, entity_id: EntityId) -> bool {
        self.entities.read().contains_key(&entity_id)
    }

    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.read().keys().copied().collect()
    }
}
