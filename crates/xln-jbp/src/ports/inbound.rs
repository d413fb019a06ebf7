//! Inbound API this crate exposes: the `j_*` operations ERM's `JbpGateway`
//! forwards to, plus jurisdiction event reconciliation (spec §4.4).

use crate::domain::JbpResult;
use async_trait::async_trait;
use shared_types::{EntityId, FeePreset, JurisdictionEvent};

#[async_trait]
pub trait JbpApi: Send + Sync {
    async fn j_broadcast(&self, entity_id: EntityId, fee_override: Option<FeePreset>) -> JbpResult<()>;

    async fn j_rebroadcast(&self, entity_id: EntityId, gas_bump_bps: u32) -> JbpResult<()>;

    async fn j_clear_batch(&self, entity_id: EntityId, reason: String) -> JbpResult<()>;

    /// Reconciles one chain-observed event into local state (spec §4.4
    /// "Finalization"). Events for a given entity arrive in strictly
    /// increasing `(jBlockNumber, logIndex)` order; the caller is
    /// responsible for that ordering and for `txHash` dedup.
    async fn handle_jurisdiction_event(&self, event: JurisdictionEvent) -> JbpResult<()>;
}
