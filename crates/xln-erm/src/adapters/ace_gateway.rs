//! Adapts `xln-ace`'s shared account state and service to the
//! [`AceGateway`] port.

use crate::ports::outbound::AceGateway;
use async_trait::async_trait;
use shared_types::{AccountPair, AccountTx, Amount, Side};
use std::sync::Arc;
use tracing::warn;
use xln_ace::{AceApi, AceState};

pub struct AceErmGateway<A: AceApi> {
    state: Arc<AceState>,
    ace: Arc<A>,
}

impl<A: AceApi> AceErmGateway<A> {
    pub fn new(state: Arc<AceState>, ace: Arc<A>) -> Self {
        Self { state, ace }
    }
}

#[async_trait]
impl<A: AceApi> AceGateway for AceErmGateway<A> {
    async fn open_account(&self, pair: AccountPair) {
        let _ = self.state.get_or_open(pair);
    }

    async fn queue_account_tx(&self, pair: AccountPair, tx: AccountTx) {
        if let Err(e) = self.ace.queue_tx(pair, tx).await {
            warn!(pair = ?pair, error = %e, "entity-delegated account tx rejected by ACE mempool");
        }
    }

    async fn credit_limit(&self, pair: AccountPair, token: shared_types::TokenId, side: Side) -> Amount {
        let machine = self.state.get_or_open(pair);
        match machine.deltas.get(&token) {
            Some(delta) => match side {
                Side::Left => delta.left_credit_limit.clone(),
                Side::Right => delta.right_credit_limit.clone(),
            },
            None => Amount::zero(),
        }
    }

    async fn last_cosigned_frame(&self, pair: AccountPair) -> (shared_types::Hash, u64) {
        let machine = self.state.get_or_open(pair);
        (machine.current_frame.state_hash, machine.current_frame.height)
    }

    async fn mark_dispute_started(&self, pair: AccountPair) {
        let mut machine = self.state.get_or_open(pair);
        machine.status = xln_ace::AccountStatus::Disputed;
        machine.active_dispute = Some(xln_ace::domain::ActiveDispute {
            dispute_timeout: 0,
            initial_nonce: 0,
            final_nonce: None,
        });
    }

    async fn mark_dispute_finalized(&self, pair: AccountPair) {
        let mut machine = self.state.get_or_open(pair);
        machine.status = xln_ace::AccountStatus::Closed;
    }
}
