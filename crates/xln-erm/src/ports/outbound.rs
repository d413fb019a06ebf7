//! Outbound capabilities ERM needs from the account/settlement layer it
//! drives and from the jurisdiction batch pipeline sitting on top of it
//! (spec §4.3).

use async_trait::async_trait;
use shared_types::{AccountPair, AccountTx, Amount, FeePreset, Side, TokenId};
use std::time::{SystemTime, UNIX_EPOCH};

/// Everything ERM needs from `xln-ace`'s shared account state: opening an
/// account idempotently, forwarding delegated `AccountTx`s, reading a credit
/// limit for `extendCredit`, and marking dispute transitions. Implemented by
/// an adapter over `xln_ace::AceState`/`AceApi`.
#[async_trait]
pub trait AceGateway: Send + Sync {
    /// Idempotent: creates the `AccountMachine` on first call, no-ops after.
    async fn open_account(&self, pair: AccountPair);

    async fn queue_account_tx(&self, pair: AccountPair, tx: AccountTx);

    async fn credit_limit(&self, pair: AccountPair, token: TokenId, side: Side) -> Amount;

    /// The last cosigned `(stateHash, height)`, used to populate a
    /// `DisputeStartOp` (spec §4.4).
    async fn last_cosigned_frame(&self, pair: AccountPair) -> (shared_types::Hash, u64);

    /// Flips the account to `Disputed` (spec §4.3 "on local success mark the
    /// account Disputed"). The dispute's real timeout/nonce are filled in
    /// once the jurisdiction's `DisputeStarted` event is reconciled.
    async fn mark_dispute_started(&self, pair: AccountPair);

    async fn mark_dispute_finalized(&self, pair: AccountPair);
}

/// The jurisdiction-batch lifecycle operations ERM's `j_broadcast`/
/// `j_rebroadcast`/`j_clear_batch` transactions forward to. Implemented by
/// `xln-jbp`, which reads/writes the draft/sent batch fields this crate's
/// `EntityState` holds.
#[async_trait]
pub trait JbpGateway: Send + Sync {
    async fn broadcast(&self, entity_id: shared_types::EntityId, fee_override: Option<FeePreset>);

    async fn rebroadcast(&self, entity_id: shared_types::EntityId, gas_bump_bps: u32);

    async fn clear_batch(&self, entity_id: shared_types::EntityId, reason: String);
}

pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before epoch")
            .as_millis() as u64
    }
}
