//! Side-state this crate owns that doesn't belong on `xln_erm::EntityState`:
//! the per-entity `entityNonce` counter (spec §4.4: "strictly monotonic per
//! entity") and the dedup set for counterparty-event re-delivery.

use parking_lot::RwLock;
use shared_types::EntityId;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct JbpState {
    next_nonce: RwLock<HashMap<EntityId, u64>>,
    last_finalized_nonce: RwLock<HashMap<EntityId, u64>>,
    seen_dedup_keys: RwLock<HashSet<(String, u32)>>,
}

impl JbpState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The nonce the next `j_broadcast` for this entity should use, without
    /// consuming it.
    pub fn peek_nonce(&self, entity_id: EntityId) -> u64 {
        *self.next_nonce.read().get(&entity_id).unwrap_or(&0)
    }

    /// Consumes the current nonce and advances the counter past it.
    pub fn consume_nonce(&self, entity_id: EntityId) -> u64 {
        let mut map = self.next_nonce.write();
        let entry = map.entry(entity_id).or_insert(0);
        let nonce = *entry;
        *entry += 1;
        nonce
    }

    pub fn last_finalized_nonce(&self, entity_id: EntityId) -> u64 {
        *self.last_finalized_nonce.read().get(&entity_id).unwrap_or(&0)
    }

    pub fn set_last_finalized_nonce(&self, entity_id: EntityId, nonce: u64) {
        self.last_finalized_nonce.write().insert(entity_id, nonce);
    }

    /// Records a chain-event dedup key; returns `true` if it was not seen
    /// before (spec §4.4: "idempotent on re-delivery via `(txHash, opIndex)`
    /// dedup").
    pub fn mark_seen(&self, key: (String, u32)) -> bool {
        self.seen_dedup_keys.write().insert(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_advances_monotonically_per_entity() {
        let state = JbpState::new();
        let e = EntityId([1; 32]);
        assert_eq!(state.consume_nonce(e), 0);
        assert_eq!(state.consume_nonce(e), 1);
        assert_eq!(state.peek_nonce(e), 2);
    }

    #[test]
    fn dedup_key_rejects_repeat() {
        let state = JbpState::new();
        let key = ("0xaa".to_string(), 0u32);
        assert!(state.mark_seen(key.clone()));
        assert!(!state.mark_seen(key));
    }
}
