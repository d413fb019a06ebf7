//! `EntityState`: an entity's entire durable state (spec §3.6). Everything
//! here advances only by applying `EntityTx` in strict insertion order; the
//! per-pair `AccountMachine`s an entity's accounts resolve to are owned by
//! `xln-ace`, not duplicated here — this struct only tracks which
//! counterparties it has opened an account with.

use shared_types::{
    Amount, BatchHistoryEntry, CanonicalEncode, DraftBatch, EntityConfig, EntityId, GENESIS_HASH,
    Hash, Profile, SentBatch, TokenId,
};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Durable per-entity state (spec §3.6). `height` and `state_hash` advance
/// once per scheduler tick that touches this entity (spec §4.3 "Frame
/// production").
#[derive(Debug, Clone)]
pub struct EntityState {
    pub entity_id: EntityId,
    pub height: u64,
    /// `stateHash` as of the last applied frame; recomputed by the service
    /// after every `submit_entity_input` call (spec §4.3 step 3).
    pub state_hash: Hash,
    pub reserves: BTreeMap<TokenId, Amount>,
    /// Counterparties this entity has an open `AccountMachine` with, kept in
    /// sorted order so iteration for frame production is deterministic
    /// (spec §4.3 "Determinism requirement": "accounts by counterpartyId
    /// ascending").
    pub open_accounts: BTreeSet<EntityId>,
    pub batch: DraftBatch,
    pub sent_batch: Option<SentBatch>,
    pub batch_history: Vec<BatchHistoryEntry>,
    pub last_finalized_j_height: u64,
    pub config: EntityConfig,
    pub profile: Profile,
}

impl EntityState {
    pub fn new(entity_id: EntityId, config: EntityConfig) -> Self {
        EntityState {
            entity_id,
            height: 0,
            state_hash: GENESIS_HASH,
            reserves: BTreeMap::new(),
            open_accounts: BTreeSet::new(),
            batch: DraftBatch::default(),
            sent_batch: None,
            batch_history: Vec::new(),
            last_finalized_j_height: 0,
            config,
            profile: Profile::default(),
        }
    }

    pub fn reserve_of(&self, token: TokenId) -> Amount {
        self.reserves.get(&token).cloned().unwrap_or_else(Amount::zero)
    }

    pub fn set_reserve(&mut self, token: TokenId, amount: Amount) {
        self.reserves.insert(token, amount);
    }
}

impl CanonicalEncode for EntityState {
    /// Excludes volatile fields named in spec §4.3: wall-clock timestamps
    /// and network-layer buffers are not part of this entity's committed
    /// state, so two replays of the same tx history hash identically
    /// regardless of when each ran.
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        self.entity_id.0.canonical_encode(out);
        self.height.canonical_encode(out);

        (self.reserves.len() as u32).canonical_encode(out);
        for (token, amount) in &self.reserves {
            token.0.canonical_encode(out);
            out.extend_from_slice(&amount.canonical_bytes());
        }

        (self.open_accounts.len() as u32).canonical_encode(out);
        for counterparty in &self.open_accounts {
            counterparty.0.canonical_encode(out);
        }

        self.batch.canonical_encode(out);
        self.last_finalized_j_height.canonical_encode(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::JurisdictionRef;

    fn config() -> EntityConfig {
        EntityConfig {
            validators: vec![],
            jurisdiction: JurisdictionRef {
                chain_id: 1,
                contract_address: "0x0".into(),
            },
        }
    }

    #[test]
    fn reserve_of_defaults_to_zero() {
        let state = EntityState::new(EntityId([1; 32]), config());
        assert_eq!(state.reserve_of(TokenId(1)), Amount::zero());
    }

    #[test]
    fn canonical_bytes_change_when_reserve_changes() {
        let mut a = EntityState::new(EntityId([1; 32]), config());
        let b = a.clone();
        a.set_reserve(TokenId(1), Amount::from(10i64));
        assert_ne!(a.canonical_bytes(), b.canonical_bytes());
    }

    #[test]
    fn canonical_bytes_are_order_independent_of_btreemap_insertion() {
        let mut a = EntityState::new(EntityId([1; 32]), config());
        a.set_reserve(TokenId(2), Amount::from(1i64));
        a.set_reserve(TokenId(1), Amount::from(2i64));

        let mut b = EntityState::new(EntityId([1; 32]), config());
        b.set_reserve(TokenId(1), Amount::from(2i64));
        b.set_reserve(TokenId(2), Amount::from(1i64));

        assert_eq!(a.canonical_bytes(), b.canonical_bytes());
    }
}
