//! Pure batch-lifecycle transitions (spec §4.4 "Lifecycle state machine":
//! `NoBatch -> Draft(ops) -> Sent{..} -> Finalized(historyEntry)`). None of
//! these perform I/O, hashing, or signing; callers supply an
//! already-computed `batchHash` and apply the resulting state back onto the
//! owning `EntityState`.

use super::error::{JbpError, JbpResult};
use shared_types::{BatchHistoryEntry, BatchSource, BatchStatus, DraftBatch, Hash, SentBatch};

pub const DEFAULT_GAS_BUMP_BPS: u32 = 1_000;
pub const MAX_GAS_BUMP_BPS: u32 = 50_000;

/// `j_broadcast`: only legal while no batch is in flight. Moves `Draft` into
/// `Sent` at the given nonce, with the hash the caller already computed over
/// `draft.canonical_bytes() ++ nonce`.
pub fn broadcast(
    draft: &DraftBatch,
    sent_batch: &Option<SentBatch>,
    entity_nonce: u64,
    batch_hash: Hash,
    now_ms: u64,
) -> JbpResult<SentBatch> {
    if sent_batch.is_some() {
        return Err(JbpError::AlreadySent);
    }
    if draft.is_empty() {
        return Err(JbpError::EmptyDraft);
    }
    Ok(SentBatch {
        ops: draft.clone(),
        entity_nonce,
        batch_hash,
        submit_attempts: 1,
        last_submitted_at_ms: now_ms,
        tx_hash: None,
    })
}

/// `j_rebroadcast{gasBumpBps}`: only legal on an in-flight `Sent` batch. The
/// `entityNonce` and `batchHash` are unchanged; only the submission attempt
/// count and timestamp advance (spec §4.4: "No new ops are added").
pub fn rebroadcast(sent: &mut SentBatch, gas_bump_bps: u32, now_ms: u64) -> JbpResult<()> {
    if gas_bump_bps > MAX_GAS_BUMP_BPS {
        return Err(JbpError::GasBumpTooLarge(gas_bump_bps));
    }
    sent.submit_attempts += 1;
    sent.last_submitted_at_ms = now_ms;
    Ok(())
}

/// `j_clear_batch`: discards `Draft` ops. Refused while a `Sent` batch
/// exists (spec §4.4).
pub fn clear_batch(draft: &mut DraftBatch, sent_batch: &Option<SentBatch>) -> JbpResult<()> {
    if sent_batch.is_some() {
        return Err(JbpError::AlreadySent);
    }
    *draft = DraftBatch::default();
    Ok(())
}

/// Moves a `Sent` batch into `batchHistory` on chain confirmation (spec
/// §4.4 `BatchConfirmed`).
pub fn confirm(sent: SentBatch, j_block_number: u64, tx_hash: String) -> BatchHistoryEntry {
    BatchHistoryEntry {
        ops: sent.ops,
        entity_nonce: sent.entity_nonce,
        batch_hash: sent.batch_hash,
        status: BatchStatus::Confirmed,
        source: BatchSource::Local,
        j_block_number: Some(j_block_number),
        tx_hash: Some(tx_hash),
    }
}

/// Moves a `Sent` batch into `batchHistory` on chain rejection (spec §4.4
/// `BatchFailed`).
pub fn fail(sent: SentBatch, _reason: String) -> BatchHistoryEntry {
    BatchHistoryEntry {
        ops: sent.ops,
        entity_nonce: sent.entity_nonce,
        batch_hash: sent.batch_hash,
        status: BatchStatus::Failed,
        source: BatchSource::Local,
        j_block_number: None,
        tx_hash: None,
    }
}

/// Spec §4.4 "Ordering guarantees": rejects observations with nonces lower
/// than the last finalized one.
pub fn check_nonce_not_stale(observed: u64, last_finalized: u64) -> JbpResult<()> {
    if observed < last_finalized {
        return Err(JbpError::StaleNonce { observed, last_finalized: last_finalized });
    }
    Ok(())
}
