//! `SettlementService`: drives one entity's side of the settlement-workspace
//! lifecycle (spec §4.2).

use crate::domain::{lifecycle, SettleError, SettleResult};
use crate::ports::inbound::SettlementApi;
use crate::ports::outbound::{AccountGateway, JbpDraftSink, TimeSource};
use async_trait::async_trait;
use shared_crypto::{Crypto, KeyStore};
use shared_types::{AccountPair, AccountTx, CanonicalEncode, EntityId, SettleOp};
use std::sync::Arc;
use xln_ace::signer_id_for_entity;

pub struct SettlementService<G, J, C, K>
where
    G: AccountGateway,
    J: JbpDraftSink,
    C: Crypto,
    K: KeyStore,
{
    local_entity_id: EntityId,
    gateway: Arc<G>,
    jbp_sink: Arc<J>,
    crypto: Arc<C>,
    keystore: Arc<K>,
    time_source: Box<dyn TimeSource>,
    seed: Vec<u8>,
}

impl<G, J, C, K> SettlementService<G, J, C, K>
where
    G: AccountGateway,
    J: JbpDraftSink,
    C: Crypto,
    K: KeyStore,
{
    pub fn new(
        local_entity_id: EntityId,
        gateway: Arc<G>,
        jbp_sink: Arc<J>,
        crypto: Arc<C>,
        keystore: Arc<K>,
        seed: Vec<u8>,
    ) -> Self {
        Self::with_time_source(
            local_entity_id,
            gateway,
            jbp_sink,
            crypto,
            keystore,
            seed,
            Box::new(crate::ports::outbound::SystemTimeSource),
        )
    }

    pub fn with_time_source(
        local_entity_id: EntityId,
        gateway: Arc<G>,
        jbp_sink: Arc<J>,
        crypto: Arc<C>,
        keystore: Arc<K>,
        seed: Vec<u8>,
        time_source: Box<dyn TimeSource>,
    ) -> Self {
        Self {
            local_entity_id,
            gateway,
            jbp_sink,
            crypto,
            keystore,
            time_source,
            seed,
        }
    }

    fn sign(&self, hash: &shared_types::Hash) -> shared_types::Signature {
        let signer = signer_id_for_entity(self.local_entity_id);
        let key = self.keystore.derive_signer(&self.seed, signer);
        self.crypto.sign(&key, hash)
    }

    fn hash_of(&self, ws: &shared_types::SettlementWorkspace) -> shared_types::Hash {
        self.crypto.hash(&ws.canonical_bytes())
    }

    fn is_left(&self, pair: AccountPair) -> bool {
        pair.is_left(&self.local_entity_id)
    }
}

#[async_trait]
impl<G, J, C, K> SettlementApi for SettlementService<G, J, C, K>
where
    G: AccountGateway,
    J: JbpDraftSink,
    C: Crypto,
    K: KeyStore,
{
    async fn settle_propose(
        &self,
        pair: AccountPair,
        ops: Vec<SettleOp>,
        memo: String,
    ) -> SettleResult<()> {
        if self.gateway.workspace(pair).await.is_some() {
            return Err(SettleError::AlreadyOpen);
        }
        let is_left = self.is_left(pair);
        let now = self.time_source.now_ms();
        // Sign a provisional empty-hanko hash first, then fix up the real
        // hanko once the workspace (and therefore its canonical hash) exists.
        let mut ws = lifecycle::propose(ops, memo, is_left, Vec::new(), now)?;
        let sig = self.sign(&self.hash_of(&ws));
        if is_left {
            ws.left_hanko = Some(sig);
        } else {
            ws.right_hanko = Some(sig);
        }
        self.gateway.set_workspace(pair, Some(ws)).await;
        Ok(())
    }

    async fn settle_update(
        &self,
        pair: AccountPair,
        ops: Vec<SettleOp>,
        memo: String,
    ) -> SettleResult<()> {
        let mut ws = self.gateway.workspace(pair).await.ok_or(SettleError::NoWorkspace)?;
        let is_left = self.is_left(pair);
        let now = self.time_source.now_ms();
        lifecycle::update(&mut ws, ops, memo, is_left, Vec::new(), now)?;
        let sig = self.sign(&self.hash_of(&ws));
        if is_left {
            ws.left_hanko = Some(sig);
        } else {
            ws.right_hanko = Some(sig);
        }
        self.gateway.set_workspace(pair, Some(ws)).await;
        Ok(())
    }

    async fn settle_approve(&self, pair: AccountPair) -> SettleResult<()> {
        let mut ws = self.gateway.workspace(pair).await.ok_or(SettleError::NoWorkspace)?;
        let is_left = self.is_left(pair);
        let now = self.time_source.now_ms();
        lifecycle::approve(&mut ws, is_left, Vec::new(), now)?;
        let sig = self.sign(&self.hash_of(&ws));
        if is_left {
            ws.left_hanko = Some(sig);
        } else {
            ws.right_hanko = Some(sig);
        }
        self.gateway.set_workspace(pair, Some(ws)).await;
        Ok(())
    }

    async fn settle_execute(&self, pair: AccountPair) -> SettleResult<()> {
        let mut ws = self.gateway.workspace(pair).await.ok_or(SettleError::NoWorkspace)?;
        let is_left = self.is_left(pair);
        let now = self.time_source.now_ms();
        let (version, compiled_diffs, r2r) = lifecycle::execute(&mut ws, is_left, now)?;

        self.gateway
            .queue_account_tx(
                pair,
                AccountTx::AccountSettle {
                    workspace_version: version,
                    compiled_diffs,
                },
            )
            .await;
        for (token, amount) in r2r {
            self.jbp_sink.enqueue_reserve_to_reserve(pair, token, amount).await;
        }
        self.gateway.set_workspace(pair, Some(ws)).await;
        Ok(())
    }

    async fn settle_reject(&self, pair: AccountPair) -> SettleResult<()> {
        let ws = self.gateway.workspace(pair).await.ok_or(SettleError::NoWorkspace)?;
        lifecycle::reject(&ws)?;
        self.gateway.set_workspace(pair, None).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use shared_crypto::{DeterministicKeyStore, Secp256k1Crypto};
    use shared_types::{Amount, TokenId};
    use std::collections::HashMap;
    use xln_ace::{AceApi, AceResult};

    struct InMemoryGateway {
        workspaces: Mutex<HashMap<AccountPair, shared_types::SettlementWorkspace>>,
        queued: Mutex<Vec<(AccountPair, AccountTx)>>,
    }

    impl InMemoryGateway {
        fn new() -> Self {
            Self {
                workspaces: Mutex::new(HashMap::new()),
                queued: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AccountGateway for InMemoryGateway {
        async fn workspace(&self, pair: AccountPair) -> Option<shared_types::SettlementWorkspace> {
            self.workspaces.lock().get(&pair).cloned()
        }
        async fn set_workspace(&self, pair: AccountPair, ws: Option<shared_types::SettlementWorkspace>) {
            match ws {
                Some(w) => {
                    self.workspaces.lock().insert(pair, w);
                }
                None => {
                    self.workspaces.lock().remove(&pair);
                }
            }
        }
        async fn queue_account_tx(&self, pair: AccountPair, tx: AccountTx) {
            self.queued.lock().push((pair, tx));
        }
    }

    struct NoopJbpSink;

    #[async_trait]
    impl JbpDraftSink for NoopJbpSink {
        async fn enqueue_reserve_to_reserve(&self, _pair: AccountPair, _token: TokenId, _amount: Amount) {}
    }

    fn make_service(
        entity: EntityId,
        gateway: Arc<InMemoryGateway>,
    ) -> SettlementService<InMemoryGateway, NoopJbpSink, Secp256k1Crypto, DeterministicKeyStore> {
        SettlementService::new(
            entity,
            gateway,
            Arc::new(NoopJbpSink),
            Arc::new(Secp256k1Crypto),
            Arc::new(DeterministicKeyStore::new()),
            b"seed".to_vec(),
        )
    }

    fn pair() -> AccountPair {
        AccountPair::new(EntityId([1; 32]), EntityId([2; 32]))
    }

    #[tokio::test]
    async fn full_lifecycle_reaches_submitted_and_queues_tx() {
        let gateway = Arc::new(InMemoryGateway::new());
        let left = make_service(EntityId([1; 32]), gateway.clone());
        let right = make_service(EntityId([2; 32]), gateway.clone());
        let p = pair();

        left.settle_propose(
            p,
            vec![SettleOp::R2c {
                token: TokenId(1),
                amount: Amount::from(100i64),
            }],
            "top up".into(),
        )
        .await
        .unwrap();

        right.settle_approve(p).await.unwrap();
        right.settle_execute(p).await.unwrap();

        let ws = gateway.workspace(p).await.unwrap();
        assert_eq!(ws.status, shared_types::WorkspaceStatus::Submitted);
        assert_eq!(gateway.queued.lock().len(), 1);
    }

    #[tokio::test]
    async fn double_propose_is_rejected() {
        let gateway = Arc::new(InMemoryGateway::new());
        let left = make_service(EntityId([1; 32]), gateway.clone());
        let p = pair();
        let ops = || {
            vec![SettleOp::R2c {
                token: TokenId(1),
                amount: Amount::from(10i64),
            }]
        };
        left.settle_propose(p, ops(), "m".into()).await.unwrap();
        let err = left.settle_propose(p, ops(), "m2".into()).await.unwrap_err();
        assert_eq!(err, SettleError::AlreadyOpen);
    }

    #[allow(dead_code)]
    fn _assert_object_compiles(_: &dyn AceApi) -> AceResult<()> {
        Ok(())
    }
}
