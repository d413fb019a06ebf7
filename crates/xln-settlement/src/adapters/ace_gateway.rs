//! Adapts `xln-ace`'s shared account state to the [`AccountGateway`] port.

use crate::ports::outbound::AccountGateway;
use async_trait::async_trait;
use shared_types::{AccountPair, AccountTx, SettlementWorkspace};
use std::sync::Arc;
use tracing::warn;
use xln_ace::{AceApi, AceState};

pub struct AceAccountGateway<A: AceApi> {
    state: Arc<AceState>,
    ace: Arc<A>,
}

impl<A: AceApi> AceAccountGateway<A> {
    pub fn new(state: Arc<AceState>, ace: Arc<A>) -> Self {
        Self { state, ace }
    }
}

#[async_trait]
impl<A: AceApi> AccountGateway for AceAccountGateway<A> {
    async fn workspace(&self, pair: AccountPair) -> Option<SettlementWorkspace> {
        self.state.get_or_open(pair).settlement_workspace.clone()
    }

    async fn set_workspace(&self, pair: AccountPair, workspace: Option<SettlementWorkspace>) {
        self.state.get_or_open(pair).settlement_workspace = workspace;
    }

    async fn queue_account_tx(&self, pair: AccountPair, tx: AccountTx) {
        if let Err(e) = self.ace.queue_tx(pair, tx).await {
            warn!(pair = ?pair, error = %e, "account_settle tx rejected by ACE mempool");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{CompiledDiff, EntityId, TokenId, WorkspaceStatus};

    struct NoopAce;

    #[async_trait]
    impl AceApi for NoopAce {
        async fn queue_tx(&self, _pair: AccountPair, _tx: AccountTx) -> xln_ace::AceResult<()> {
            Ok(())
        }
        async fn propose_ready_accounts(&self) -> xln_ace::AceResult<()> {
            Ok(())
        }
        async fn handle_input(&self, _input: shared_types::AccountInput) -> xln_ace::AceResult<()> {
            Ok(())
        }
        async fn current_height(&self, _pair: AccountPair) -> Option<u64> {
            None
        }
    }

    #[tokio::test]
    async fn workspace_round_trips_through_ace_state() {
        let state = Arc::new(AceState::new());
        let gateway = AceAccountGateway::new(state, Arc::new(NoopAce));
        let pair = AccountPair::new(EntityId([1; 32]), EntityId([2; 32]));

        assert!(gateway.workspace(pair).await.is_none());

        let mut ws = SettlementWorkspace::new(true, vec![], "memo".into(), 0);
        ws.compiled_diffs = vec![CompiledDiff::zero(TokenId(1))];
        ws.status = WorkspaceStatus::ReadyToSubmit;
        gateway.set_workspace(pair, Some(ws)).await;

        let fetched = gateway.workspace(pair).await.unwrap();
        assert_eq!(fetched.status, WorkspaceStatus::ReadyToSubmit);
    }
}
