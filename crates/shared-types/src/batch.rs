//! Jurisdiction batch shape (spec §4.4).

use crate::amount::Amount;
use crate::canonical::CanonicalEncode;
use crate::ids::{EntityId, Hash, TokenId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveToCollateralOp {
    pub counterparty: EntityId,
    pub token: TokenId,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralToReserveOp {
    pub counterparty: EntityId,
    pub token: TokenId,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveToReserveOp {
    pub to_entity: EntityId,
    pub token: TokenId,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementOp {
    pub counterparty: EntityId,
    pub workspace_version: u32,
    pub token: TokenId,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeStartOp {
    pub counterparty: EntityId,
    pub last_cosigned_state_hash: Hash,
    pub frame_height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeFinalizationOp {
    pub counterparty: EntityId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalTokenToReserveOp {
    pub token: TokenId,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveToExternalTokenOp {
    pub token: TokenId,
    pub amount: Amount,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealSecretOp {
    pub counterparty: EntityId,
    pub lock_id: u64,
    pub preimage: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashloanOp {
    pub token: TokenId,
    pub amount: Amount,
}

/// A draft batch of on-chain operations accumulating for one entity
/// (spec §4.4: "Batch shape").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftBatch {
    pub flashloans: Vec<FlashloanOp>,
    pub reserve_to_collateral: Vec<ReserveToCollateralOp>,
    pub collateral_to_reserve: Vec<CollateralToReserveOp>,
    pub reserve_to_reserve: Vec<ReserveToReserveOp>,
    pub settlements: Vec<SettlementOp>,
    pub dispute_starts: Vec<DisputeStartOp>,
    pub dispute_finalizations: Vec<DisputeFinalizationOp>,
    pub external_token_to_reserve: Vec<ExternalTokenToReserveOp>,
    pub reserve_to_external_token: Vec<ReserveToExternalTokenOp>,
    pub reveal_secrets: Vec<RevealSecretOp>,
}

impl DraftBatch {
    pub fn is_empty(&self) -> bool {
        self.flashloans.is_empty()
            && self.reserve_to_collateral.is_empty()
            && self.collateral_to_reserve.is_empty()
            && self.reserve_to_reserve.is_empty()
            && self.settlements.is_empty()
            && self.dispute_starts.is_empty()
            && self.dispute_finalizations.is_empty()
            && self.external_token_to_reserve.is_empty()
            && self.reserve_to_external_token.is_empty()
            && self.reveal_secrets.is_empty()
    }
}

macro_rules! encode_vec_field {
    ($out:expr, $field:expr) => {
        ($field.len() as u32).canonical_encode($out);
    };
}

impl CanonicalEncode for DraftBatch {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        // Ops accumulate in insertion order within each slot, which is the
        // canonical order the batch hash commits to (spec §4.4); only the
        // cross-category ordering is fixed here, not a map to sort.
        encode_vec_field!(out, self.flashloans);
        for op in &self.flashloans {
            op.token.0.canonical_encode(out);
            out.extend_from_slice(&op.amount.canonical_bytes());
        }
        encode_vec_field!(out, self.reserve_to_collateral);
        for op in &self.reserve_to_collateral {
            op.counterparty.0.canonical_encode(out);
            op.token.0.canonical_encode(out);
            out.extend_from_slice(&op.amount.canonical_bytes());
        }
        encode_vec_field!(out, self.collateral_to_reserve);
        for op in &self.collateral_to_reserve {
            op.counterparty.0.canonical_encode(out);
            op.token.0.canonical_encode(out);
            out.extend_from_slice(&op.amount.canonical_bytes());
        }
        encode_vec_field!(out, self.reserve_to_reserve);
        for op in &self.reserve_to_reserve {
            op.to_entity.0.canonical_encode(out);
            op.token.0.canonical_encode(out);
            out.extend_from_slice(&op.amount.canonical_bytes());
        }
        encode_vec_field!(out, self.settlements);
        for op in &self.settlements {
            op.counterparty.0.canonical_encode(out);
            op.workspace_version.canonical_encode(out);
            op.token.0.canonical_encode(out);
            out.extend_from_slice(&op.amount.canonical_bytes());
        }
        encode_vec_field!(out, self.dispute_starts);
        for op in &self.dispute_starts {
            op.counterparty.0.canonical_encode(out);
            op.last_cosigned_state_hash.canonical_encode(out);
            op.frame_height.canonical_encode(out);
        }
        encode_vec_field!(out, self.dispute_finalizations);
        for op in &self.dispute_finalizations {
            op.counterparty.0.canonical_encode(out);
        }
        encode_vec_field!(out, self.external_token_to_reserve);
        for op in &self.external_token_to_reserve {
            op.token.0.canonical_encode(out);
            out.extend_from_slice(&op.amount.canonical_bytes());
        }
        encode_vec_field!(out, self.reserve_to_external_token);
        for op in &self.reserve_to_external_token {
            op.token.0.canonical_encode(out);
            out.extend_from_slice(&op.amount.canonical_bytes());
            op.destination.canonical_encode(out);
        }
        encode_vec_field!(out, self.reveal_secrets);
        for op in &self.reveal_secrets {
            op.counterparty.0.canonical_encode(out);
            op.lock_id.canonical_encode(out);
            (op.preimage.len() as u32).canonical_encode(out);
            out.extend_from_slice(&op.preimage);
        }
    }
}

/// Status of a finalized batch-history entry (spec §7: batch status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    Confirmed,
    Failed,
}

/// Where a batch-history entry came from: our own submission, or a
/// counterparty's on-chain action observed via the adapter (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchSource {
    Local,
    CounterpartyEvent,
}

/// A batch that has been broadcast and is awaiting a chain-observed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentBatch {
    pub ops: DraftBatch,
    pub entity_nonce: u64,
    pub batch_hash: Hash,
    pub submit_attempts: u32,
    pub last_submitted_at_ms: u64,
    pub tx_hash: Option<String>,
}

/// A finalized batch retained in `batchHistory` (spec §3.6, §4.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHistoryEntry {
    pub ops: DraftBatch,
    pub entity_nonce: u64,
    pub batch_hash: Hash,
    pub status: BatchStatus,
    pub source: BatchSource,
    pub j_block_number: Option<u64>,
    pub tx_hash: Option<String>,
}
