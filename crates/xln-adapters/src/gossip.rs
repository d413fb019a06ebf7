//! In-memory profile directory (spec §6.1 `Gossip`). A real deployment would
//! back this with a pubsub/DHT layer; locally and in tests, a shared map
//! suffices.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{EntityId, Profile};
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait Gossip: Send + Sync {
    async fn publish_profile(&self, entity_id: EntityId, profile: Profile);

    async fn get_profiles(&self) -> Vec<(EntityId, Profile)>;
}

#[derive(Default)]
pub struct InMemoryGossip {
    profiles: RwLock<HashMap<EntityId, Profile>>,
}

impl InMemoryGossip {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl Gossip for InMemoryGossip {
    async fn publish_profile(&self, entity_id: EntityId, profile: Profile) {
        self.profiles.write().insert(entity_id, profile);
    }

    async fn get_profiles(&self) -> Vec<(EntityId, Profile)> {
        self.profiles.read().iter().map(|(id, p)| (*id, p.clone())).collect()
    }
}
