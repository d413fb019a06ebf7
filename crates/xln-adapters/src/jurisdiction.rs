//! In-memory stand-in for the jurisdiction chain adapter (spec §6.1
//! `JurisdictionAdapter`). No real chain, mempool, or finality — just enough
//! bookkeeping to drive the JBP through its broadcast/confirm lifecycle in
//! tests and local runs: a monotonic block counter, a fixed fee quote, a
//! reserve ledger credited by `externalTokenToReserve`, and synthetic tx
//! hashes derived from a submission counter.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Amount, EntityId, SignerId, TokenId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use xln_jbp::domain::{FeeData, FeeOverrides};
use xln_jbp::JurisdictionAdapter;

/// Every real submission this adapter has accepted, retained so a test can
/// assert on what was actually broadcast without needing a real chain.
#[derive(Debug, Clone)]
pub struct SubmittedBatch {
    pub tx_hash: String,
    pub payload: Vec<u8>,
    pub fee_overrides: FeeOverrides,
}

pub struct MockJurisdictionAdapter {
    block_number: AtomicU64,
    fee_data: FeeData,
    submission_count: AtomicU64,
    submitted: RwLock<Vec<SubmittedBatch>>,
    reserves: RwLock<HashMap<(TokenId, EntityId), Amount>>,
}

impl MockJurisdictionAdapter {
    pub fn new(fee_data: FeeData) -> Arc<Self> {
        Arc::new(Self {
            block_number: AtomicU64::new(1),
            fee_data,
            submission_count: AtomicU64::new(0),
            submitted: RwLock::new(Vec::new()),
            reserves: RwLock::new(HashMap::new()),
        })
    }

    /// Advances the synthetic chain by one block, as a test driver would
    /// after observing a submission it wants to confirm.
    pub fn mine_block(&self) -> u64 {
        self.block_number.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn submitted_batches(&self) -> Vec<SubmittedBatch> {
        self.submitted.read().clone()
    }

    /// Seeds an external balance directly, bypassing `external_token_to_reserve`,
    /// for tests that want a holder to already own funds on the mock chain.
    pub fn seed_external_balance(&self, token: TokenId, holder: EntityId, amount: Amount) {
        self.reserves.write().insert((token, holder), amount);
    }

    fn next_tx_hash(&self) -> String {
        let n = self.submission_count.fetch_add(1, Ordering::SeqCst) + 1;
        format!("0x{n:064x}")
    }
}

#[async_trait]
impl JurisdictionAdapter for MockJurisdictionAdapter {
    async fn block_number(&self) -> u64 {
        self.block_number.load(Ordering::SeqCst)
    }

    async fn fee_data(&self) -> FeeData {
        self.fee_data.clone()
    }

    async fn submit_process_batch(
        &self,
        payload: Vec<u8>,
        _signature: shared_types::Signature,
        fee_overrides: FeeOverrides,
    ) -> String {
        let tx_hash = self.next_tx_hash();
        self.submitted.write().push(SubmittedBatch {
            tx_hash: tx_hash.clone(),
            payload,
            fee_overrides,
        });
        tx_hash
    }

    async fn erc20_balance(&self, token: TokenId, holder: EntityId) -> Amount {
        self.reserves
            .read()
            .get(&(token, holder))
            .cloned()
            .unwrap_or_else(Amount::zero)
    }

    async fn external_token_to_reserve(
        &self,
        _signer: SignerId,
        entity: EntityId,
        token: TokenId,
        amount: Amount,
    ) -> String {
        let mut reserves = self.reserves.write();
        let entry = reserves.entry((token, entity)).or_insert_with(Amount::zero);
        *entry += amount;
        drop(reserves);
        self.next_tx_hash()
    }
}
