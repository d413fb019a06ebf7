//! Chain-observed events consumed from the `JurisdictionAdapter` (spec §4.4).

use crate::ids::EntityId;
use serde::{Deserialize, Serialize};

/// Identifies the kind of on-chain event a confirmed batch represents, for
/// UI/log disambiguation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchEventType {
    ProcessBatch,
    ExternalDeposit,
    ExternalWithdrawal,
}

/// Events the core consumes from `JurisdictionAdapter::subscribeEvents`
/// (spec §4.4 "Finalization"). Delivered in strictly increasing
/// `(j_block_number, log_index)` order per entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JurisdictionEvent {
    BatchConfirmed {
        tx_hash: String,
        j_block_number: u64,
        log_index: u64,
        entity_id: EntityId,
        entity_nonce: u64,
        event_type: BatchEventType,
    },
    BatchFailed {
        entity_id: EntityId,
        entity_nonce: u64,
        reason: String,
    },
    CounterpartyBatchConfirmed {
        tx_hash: String,
        j_block_number: u64,
        log_index: u64,
        entity_id: EntityId,
        counterparty: EntityId,
        op_index: u32,
        /// The token the counterparty's confirmed reserve<->collateral op
        /// moved, so the local side can mirror the collateral/delta change.
        token: crate::ids::TokenId,
        /// Signed collateral change observed on-chain from the
        /// counterparty's op: positive for a deposit (r2c), negative for a
        /// withdrawal (c2r).
        collateral_delta: crate::amount::Amount,
    },
    DisputeStarted {
        entity_id: EntityId,
        counterparty: EntityId,
        timeout_block: u64,
        initial_nonce: u64,
    },
    DisputeFinalized {
        entity_id: EntityId,
        counterparty: EntityId,
        cooperative: bool,
    },
}

impl JurisdictionEvent {
    pub fn entity_id(&self) -> EntityId {
        match self {
            JurisdictionEvent::BatchConfirmed { entity_id, .. }
            | JurisdictionEvent::BatchFailed { entity_id, .. }
            | JurisdictionEvent::CounterpartyBatchConfirmed { entity_id, .. }
            | JurisdictionEvent::DisputeStarted { entity_id, .. }
            | JurisdictionEvent::DisputeFinalized { entity_id, .. } => *entity_id,
        }
    }

    /// The `(j_block_number, log_index)` ordering key, when present. Events
    /// without on-chain provenance (none currently) would sort last.
    pub fn order_key(&self) -> Option<(u64, u64)> {
        match self {
            JurisdictionEvent::BatchConfirmed {
                j_block_number,
                log_index,
                ..
            }
            | JurisdictionEvent::CounterpartyBatchConfirmed {
                j_block_number,
                log_index,
                ..
            } => Some((*j_block_number, *log_index)),
            _ => None,
        }
    }

    /// Deduplication key for idempotent re-delivery (spec §4.4:
    /// "idempotent on re-delivery via `(txHash, opIndex)` dedup").
    pub fn dedup_key(&self) -> Option<(String, u32)> {
        match self {
            JurisdictionEvent::CounterpartyBatchConfirmed {
                tx_hash, op_index, ..
            } => Some((tx_hash.clone(), *op_index)),
            JurisdictionEvent::BatchConfirmed { tx_hash, .. } => Some((tx_hash.clone(), 0)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_key_present_for_chain_confirmed_events() {
        let ev = JurisdictionEvent::BatchConfirmed {
            tx_hash: "0xaa".into(),
            j_block_number: 10,
            log_index: 0,
            entity_id: EntityId([1; 32]),
            entity_nonce: 1,
            event_type: BatchEventType::ProcessBatch,
        };
        assert_eq!(ev.order_key(), Some((10, 0)));
    }

    #[test]
    fn order_key_absent_for_dispute_events() {
        let ev = JurisdictionEvent::DisputeStarted {
            entity_id: EntityId([1; 32]),
            counterparty: EntityId([2; 32]),
            timeout_block: 100,
            initial_nonce: 1,
        };
        assert_eq!(ev.order_key(), None);
    }
}
