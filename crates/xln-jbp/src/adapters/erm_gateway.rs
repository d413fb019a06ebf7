//! Adapts this crate's [`JbpApi`](crate::ports::inbound::JbpApi) to the
//! [`xln_erm::JbpGateway`] outbound port, and adapts direct access to
//! `xln-erm`'s shared entity state to `xln-ace`'s
//! [`xln_ace::DisputeGateway`] outbound port and `xln-settlement`'s
//! [`xln_settlement::JbpDraftSink`] outbound port.

use crate::ports::inbound::JbpApi;
use async_trait::async_trait;
use shared_types::{AccountPair, Amount, DisputeStartOp, EntityId, FeePreset, Hash, ReserveToReserveOp, TokenId};
use std::sync::Arc;
use tracing::warn;
use xln_erm::ErmState;

pub struct ErmJbpGateway<J: JbpApi> {
    jbp: Arc<J>,
}

impl<J: JbpApi> ErmJbpGateway<J> {
    pub fn new(jbp: Arc<J>) -> Self {
        Self { jbp }
    }
}

#[async_trait]
impl<J: JbpApi> xln_erm::JbpGateway for ErmJbpGateway<J> {
    async fn broadcast(&self, entity_id: EntityId, fee_override: Option<FeePreset>) {
        if let Err(e) = self.jbp.j_broadcast(entity_id, fee_override).await {
            warn!(entity = ?entity_id, error = %e, "j_broadcast rejected");
        }
    }

    async fn rebroadcast(&self, entity_id: EntityId, gas_bump_bps: u32) {
        if let Err(e) = self.jbp.j_rebroadcast(entity_id, gas_bump_bps).await {
            warn!(entity = ?entity_id, error = %e, "j_rebroadcast rejected");
        }
    }

    async fn clear_batch(&self, entity_id: EntityId, reason: String) {
        if let Err(e) = self.jbp.j_clear_batch(entity_id, reason.clone()).await {
            warn!(entity = ?entity_id, error = %e, reason = %reason, "j_clear_batch rejected");
        }
    }
}

/// One instance per locally-hosted entity, mirroring how
/// `xln_ace::AccountConsensusService` and `xln_settlement::SettlementService`
/// are each fixed to a `local_entity_id` (spec §4.1 escalation path: "once
/// local consensus cannot make progress").
pub struct JbpDisputeGateway {
    local_entity_id: EntityId,
    erm_state: Arc<ErmState>,
}

impl JbpDisputeGateway {
    pub fn new(local_entity_id: EntityId, erm_state: Arc<ErmState>) -> Self {
        Self { local_entity_id, erm_state }
    }
}

#[async_trait]
impl xln_ace::DisputeGateway for JbpDisputeGateway {
    async fn open_dispute(&self, pair: AccountPair, last_cosigned_state_hash: Hash, frame_height: u64) {
        let counterparty = pair.counterparty_of(&self.local_entity_id);
        // An account can only reach a disputable state after its owning
        // entity processed `OpenAccount`, which already opened this entity's
        // replicated state — unlike the `JbpService` call sites, there is no
        // ordering race to guard against here.
        let mut state = self.erm_state.get_or_open(self.local_entity_id, || {
            unreachable!("dispute escalation for an entity with no replicated state")
        });
        state.batch.dispute_starts.push(DisputeStartOp {
            counterparty,
            last_cosigned_state_hash,
            frame_height,
        });
    }
}

/// One instance per locally-hosted entity; adapts `xln-settlement`'s
/// `account_settle` execution (which only knows the pair and the settled
/// token/amount) into a `reserveToReserve` op on the owning entity's draft
/// batch (spec §4.2 "Execute").
pub struct SettlementJbpSink {
    local_entity_id: EntityId,
    erm_state: Arc<ErmState>,
}

impl SettlementJbpSink {
    pub fn new(local_entity_id: EntityId, erm_state: Arc<ErmState>) -> Self {
        Self { local_entity_id, erm_state }
    }
}

#[async_trait]
impl xln_settlement::JbpDraftSink for SettlementJbpSink {
    async fn enqueue_reserve_to_reserve(&self, pair: AccountPair, token: TokenId, amount: Amount) {
        let to_entity = pair.counterparty_of(&self.local_entity_id);
        let mut state = self.erm_state.get_or_open(self.local_entity_id, || {
            unreachable!("settlement execution for an entity with no replicated state")
        });
        state.batch.reserve_to_reserve.push(ReserveToReserveOp { to_entity, token, amount });
    }
}
