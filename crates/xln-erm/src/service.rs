//! `EntityService`: applies one signer's `EntityTx` batch against an
//! entity's replicated state (spec §4.3), delegating account-scope effects
//! to ACE/Settlement and jurisdiction-scope effects to JBP.

use crate::domain::{apply, ErmError, ErmResult};
use crate::ports::inbound::ErmApi;
use crate::ports::outbound::{AceGateway, JbpGateway, TimeSource};
use crate::state::ErmState;
use async_trait::async_trait;
use shared_crypto::Crypto;
use shared_types::{
    AccountPair, AccountTx, CanonicalEncode, DisputeFinalizationOp, DisputeStartOp, EntityConfig,
    EntityId, EntityInput, EntityTx,
};
use std::sync::Arc;
use tracing::{debug, warn};
use xln_settlement::SettlementApi;

pub struct EntityService<G, J, S, C>
where
    G: AceGateway,
    J: JbpGateway,
    S: SettlementApi,
    C: Crypto,
{
    ace: Arc<G>,
    jbp: Arc<J>,
    settlement: Arc<S>,
    crypto: Arc<C>,
    time_source: Box<dyn TimeSource>,
    state: Arc<ErmState>,
    default_config: EntityConfig,
}

impl<G, J, S, C> EntityService<G, J, S, C>
where
    G: AceGateway,
    J: JbpGateway,
    S: SettlementApi,
    C: Crypto,
{
    pub fn new(
        ace: Arc<G>,
        jbp: Arc<J>,
        settlement: Arc<S>,
        crypto: Arc<C>,
        time_source: Box<dyn TimeSource>,
        state: Arc<ErmState>,
        default_config: EntityConfig,
    ) -> Self {
        Self {
            ace,
            jbp,
            settlement,
            crypto,
            time_source,
            state,
            default_config,
        }
    }

    async fn apply_one(&self, entity_id: EntityId, tx: EntityTx) -> ErmResult<()> {
        match tx {
            EntityTx::OpenAccount {
                target_entity_id,
                credit_amount,
                token_id,
                rebalance_policy: _,
            } => {
                let pair = AccountPair::new(entity_id, target_entity_id);
                self.ace.open_account(pair).await;
                {
                    let mut state = self.state.get_or_open(entity_id, || self.default_config.clone());
                    state.open_accounts.insert(target_entity_id);
                }
                if let (Some(amount), Some(token)) = (credit_amount, token_id) {
                    let side = side_of(pair, entity_id);
                    self.ace
                        .queue_account_tx(pair, AccountTx::SetCreditLimit { token, side, amount })
                        .await;
                }
                Ok(())
            }
            EntityTx::DirectPayment {
                counterparty,
                token,
                amount,
                description,
            } => {
                let pair = AccountPair::new(entity_id, counterparty);
                self.ace
                    .queue_account_tx(pair, AccountTx::DirectPayment { token, amount, description })
                    .await;
                Ok(())
            }
            EntityTx::ExtendCredit {
                counterparty,
                token,
                side,
                amount,
            } => {
                let pair = AccountPair::new(entity_id, counterparty);
                let current = self.ace.credit_limit(pair, token, side).await;
                let new_limit = &current + &amount;
                self.ace
                    .queue_account_tx(
                        pair,
                        AccountTx::SetCreditLimit { token, side, amount: new_limit },
                    )
                    .await;
                Ok(())
            }
            EntityTx::SetCreditLimit {
                counterparty,
                token,
                side,
                amount,
            } => {
                let pair = AccountPair::new(entity_id, counterparty);
                self.ace
                    .queue_account_tx(pair, AccountTx::SetCreditLimit { token, side, amount })
                    .await;
                Ok(())
            }
            EntityTx::AccountTxQueued { counterparty, tx } => {
                let pair = AccountPair::new(entity_id, counterparty);
                self.ace.queue_account_tx(pair, tx).await;
                Ok(())
            }
            EntityTx::DepositCollateral { counterparty, token, amount } => {
                let mut state = self.state.get_or_open(entity_id, || self.default_config.clone());
                apply::deposit_collateral(&mut state, counterparty, token, amount)
            }
            EntityTx::RequestWithdrawal { counterparty, token, amount } => {
                let mut state = self.state.get_or_open(entity_id, || self.default_config.clone());
                apply::request_withdrawal(&mut state, counterparty, token, amount)
            }
            EntityTx::ReserveToReserve { to_entity, token, amount } => {
                let mut state = self.state.get_or_open(entity_id, || self.default_config.clone());
                apply::reserve_to_reserve(&mut state, to_entity, token, amount)
            }
            EntityTx::SettlePropose { counterparty, ops, memo } => {
                let pair = AccountPair::new(entity_id, counterparty);
                self.settlement.settle_propose(pair, ops, memo).await?;
                Ok(())
            }
            EntityTx::SettleUpdate { counterparty, ops, memo } => {
                let pair = AccountPair::new(entity_id, counterparty);
                self.settlement.settle_update(pair, ops, memo).await?;
                Ok(())
            }
            EntityTx::SettleApprove { counterparty } => {
                let pair = AccountPair::new(entity_id, counterparty);
                self.settlement.settle_approve(pair).await?;
                Ok(())
            }
            EntityTx::SettleExecute { counterparty } => {
                let pair = AccountPair::new(entity_id, counterparty);
                self.settlement.settle_execute(pair).await?;
                Ok(())
            }
            EntityTx::SettleReject { counterparty } => {
                let pair = AccountPair::new(entity_id, counterparty);
                self.settlement.settle_reject(pair).await?;
                Ok(())
            }
            EntityTx::DisputeStart { counterparty } => {
                let pair = AccountPair::new(entity_id, counterparty);
                let (last_cosigned_state_hash, frame_height) = self.ace.last_cosigned_frame(pair).await;
                self.ace.mark_dispute_started(pair).await;
                let mut state = self.state.get_or_open(entity_id, || self.default_config.clone());
                state.batch.dispute_starts.push(DisputeStartOp {
                    counterparty,
                    last_cosigned_state_hash,
                    frame_height,
                });
                Ok(())
            }
            EntityTx::DisputeFinalize { counterparty } => {
                let pair = AccountPair::new(entity_id, counterparty);
                self.ace.mark_dispute_finalized(pair).await;
                let mut state = self.state.get_or_open(entity_id, || self.default_config.clone());
                state.batch.dispute_finalizations.push(DisputeFinalizationOp { counterparty });
                Ok(())
            }
            EntityTx::JBroadcast { fee_override } => {
                self.jbp.broadcast(entity_id, fee_override).await;
                Ok(())
            }
            EntityTx::JRebroadcast { gas_bump_bps } => {
                self.jbp.rebroadcast(entity_id, gas_bump_bps).await;
                Ok(())
            }
            EntityTx::JClearBatch { reason } => {
                self.jbp.clear_batch(entity_id, reason).await;
                Ok(())
            }
            EntityTx::ProfileUpdate { profile } => {
                let mut state = self.state.get_or_open(entity_id, || self.default_config.clone());
                apply::profile_update(&mut state, profile);
                Ok(())
            }
        }
    }
}

/// Which side of the pair `entity_id` sits on (spec §3.1: `left`/`right` is
/// decided by unordered-entity-id comparison, not by who initiated the tx).
fn side_of(pair: AccountPair, entity_id: EntityId) -> shared_types::Side {
    if pair.is_left(&entity_id) {
        shared_types::Side::Left
    } else {
        shared_types::Side::Right
    }
}

#[async_trait]
impl<G, J, S, C> ErmApi for EntityService<G, J, S, C>
where
    G: AceGateway,
    J: JbpGateway,
    S: SettlementApi,
    C: Crypto,
{
    async fn submit_entity_input(&self, input: EntityInput) -> ErmResult<()> {
        if !self.default_config.validators.is_empty()
            && !self.default_config.validators.contains(&input.signer_id)
        {
            warn!(entity = ?input.entity_id, signer = ?input.signer_id, "unauthorized signer for entity input");
            return Err(ErmError::NoSuchAccount);
        }

        for tx in input.entity_txs {
            self.apply_one(input.entity_id, tx).await?;
        }

        let mut state = self.state.get_or_open(input.entity_id, || self.default_config.clone());
        state.height += 1;
        let _ = self.time_source.now_ms();
        state.state_hash = self.crypto.hash(&state.canonical_bytes());
        debug!(entity = ?input.entity_id, height = state.height, "entity frame advanced");
        Ok(())
    }

    async fn current_height(&self, entity_id: EntityId) -> Option<u64> {
        self.state.height_of(entity_id)
    }
}
