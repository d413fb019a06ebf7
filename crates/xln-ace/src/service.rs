//! `AccountConsensusService`: the two-phase-commit bilateral frame protocol
//! (spec §4.1).

use crate::domain::backoff::retries_exhausted;
use crate::domain::state_machine::AccountEvent;
use crate::domain::{AceError, AceResult, AccountMachine, AccountStatus};
use crate::ports::outbound::{AccountEventBus, DisputeGateway, TimeSource};
use async_trait::async_trait;
use shared_crypto::{hashing::keccak256, Crypto, KeyStore};
use shared_types::{
    AccountFrame, AccountFrameAck, AccountFrameFinalize, AccountFrameNak, AccountFrameProposal,
    AccountInput, AccountPair, AccountTx, CanonicalEncode, EntityId, SignerId,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::ports::inbound::AceApi;
use crate::state::AceState;

/// Deterministic per-entity signer derivation: one signer per entity id for
/// the bilateral account protocol. The wire protocol names entities, not
/// signers, and the spec does not otherwise define the mapping, so this
/// core treats every entity as controlled by exactly one signer whose id is
/// derived from the entity id.
pub fn signer_id_for_entity(entity_id: EntityId) -> SignerId {
    let hash = keccak256(&entity_id.0);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[0..20]);
    SignerId(bytes)
}

pub struct AccountConsensusService<B, C, K, D>
where
    B: AccountEventBus,
    C: Crypto,
    K: KeyStore,
    D: DisputeGateway,
{
    local_entity_id: EntityId,
    event_bus: Arc<B>,
    crypto: Arc<C>,
    keystore: Arc<K>,
    dispute_gateway: Arc<D>,
    time_source: Box<dyn TimeSource>,
    state: Arc<AceState>,
    /// Shared deterministic-keystore derivation seed. See
    /// [`signer_id_for_entity`] for why this exists at the entity-id level.
    seed: Vec<u8>,
}

impl<B, C, K, D> AccountConsensusService<B, C, K, D>
where
    B: AccountEventBus,
    C: Crypto,
    K: KeyStore,
    D: DisputeGateway,
{
    pub fn new(
        local_entity_id: EntityId,
        event_bus: Arc<B>,
        crypto: Arc<C>,
        keystore: Arc<K>,
        dispute_gateway: Arc<D>,
        seed: Vec<u8>,
    ) -> Self {
        Self::with_time_source(
            local_entity_id,
            event_bus,
            crypto,
            keystore,
            dispute_gateway,
            seed,
            Box::new(crate::ports::outbound::SystemTimeSource),
        )
    }

    pub fn with_time_source(
        local_entity_id: EntityId,
        event_bus: Arc<B>,
        crypto: Arc<C>,
        keystore: Arc<K>,
        dispute_gateway: Arc<D>,
        seed: Vec<u8>,
        time_source: Box<dyn TimeSource>,
    ) -> Self {
        Self {
            local_entity_id,
            event_bus,
            crypto,
            keystore,
            dispute_gateway,
            time_source,
            state: Arc::new(AceState::new()),
            seed,
        }
    }

    fn local_signer_id(&self) -> SignerId {
        signer_id_for_entity(self.local_entity_id)
    }

    /// The shared account-state map this service mutates, for wiring into
    /// sibling crates' gateways (`xln-erm`'s `AceGateway`, `xln-jbp`'s
    /// dispute-escalation and event-reconciliation adapters) that need
    /// direct read/write access to the same `AccountMachine`s.
    pub fn state(&self) -> Arc<AceState> {
        self.state.clone()
    }

    /// Recomputes the post-application state hash for a candidate frame: the
    /// canonical encoding of the frame chained onto `prevStateHash` (spec
    /// §3.3).
    fn compute_state_hash(&self, frame: &AccountFrame) -> shared_types::Hash {
        self.crypto.hash(&frame.canonical_bytes())
    }

    fn sign(&self, hash: &shared_types::Hash) -> shared_types::Signature {
        let key = self.keystore.derive_signer(&self.seed, self.local_signer_id());
        self.crypto.sign(&key, hash)
    }

    fn verify_counterparty(
        &self,
        counterparty: EntityId,
        hash: &shared_types::Hash,
        sig: &shared_types::Signature,
    ) -> bool {
        let counterparty_signer = signer_id_for_entity(counterparty);
        let key = self.keystore.derive_signer(&self.seed, counterparty_signer);
        self.crypto.verify(&key.public_key(), hash, sig)
    }

    fn build_candidate_frame(&self, machine: &AccountMachine, is_left: bool) -> AccountFrame {
        let txs: Vec<AccountTx> = machine.mempool.clone();
        let mut token_ids: Vec<shared_types::TokenId> = machine.deltas.keys().copied().collect();
        token_ids.sort();
        AccountFrame {
            height: machine.current_frame.height + 1,
            timestamp: self.time_source.now_ms(),
            account_txs: txs,
            token_ids,
            by_left: is_left,
            state_hash: shared_types::GENESIS_HASH,
            prev_state_hash: machine.current_frame.state_hash,
        }
    }

    /// Applies every tx in `frame` to a scratch copy of `machine`, returning
    /// the mutated copy and its recomputed state hash, or the first
    /// validation failure.
    fn simulate_frame(&self, machine: &AccountMachine, frame: &AccountFrame) -> AceResult<(AccountMachine, shared_types::Hash)> {
        let mut scratch = machine.clone();
        for tx in &frame.account_txs {
            scratch.apply_tx(tx, frame.by_left)?;
        }
        let hash = self.compute_state_hash(frame);
        Ok((scratch, hash))
    }

    async fn escalate_dispute(&self, machine: &mut AccountMachine) {
        machine.status = AccountStatus::Disputed;
        self.dispute_gateway
            .open_dispute(
                machine.pair,
                machine.current_frame.state_hash,
                machine.current_frame.height,
            )
            .await;
    }
}

#[async_trait]
impl<B, C, K, D> AceApi for AccountConsensusService<B, C, K, D>
where
    B: AccountEventBus,
    C: Crypto,
    K: KeyStore,
    D: DisputeGateway,
{
    async fn queue_tx(&self, pair: AccountPair, tx: AccountTx) -> AceResult<()> {
        let mut machine = self.state.get_or_open(pair);
        if machine.status != AccountStatus::Healthy {
            return Err(AceError::UnexpectedPhase);
        }
        machine.mempool.push(tx);
        machine.phase = machine
            .phase
            .next(AccountEvent::LocalTxQueued)
            .unwrap_or(machine.phase);
        Ok(())
    }

    async fn propose_ready_accounts(&self) -> AceResult<()> {
        for pair in self.state.pairs() {
            let is_left = pair.is_left(&self.local_entity_id);
            let (frame, machine_snapshot) = {
                let machine = self.state.get_or_open(pair);
                if machine.mempool.is_empty() || machine.pending_frame.is_some() {
                    continue;
                }
                if machine.status != AccountStatus::Healthy {
                    continue;
                }
                if machine.next_proposer_is_left() != is_left {
                    continue;
                }
                (self.build_candidate_frame(&machine, is_left), machine.clone())
            };

            let (_sealed, hash) = match self.simulate_frame(&machine_snapshot, &frame) {
                Ok(r) => r,
                Err(e) => {
                    warn!(pair = ?pair, error = %e, "candidate frame failed local validation, dropping offending tx");
                    continue;
                }
            };
            let sig = self.sign(&hash);

            {
                let mut machine = self.state.get_or_open(pair);
                let mut sealed = frame.clone();
                sealed.state_hash = hash;
                machine.pending_frame = Some(sealed);
                machine.pending_signatures = vec![sig.clone()];
                machine.phase = machine
                    .phase
                    .next(AccountEvent::LocalTxQueued)
                    .unwrap_or(machine.phase);
            }

            self.event_bus
                .send(AccountInput::Proposal(AccountFrameProposal {
                    pair,
                    height: frame.height,
                    timestamp: frame.timestamp,
                    account_txs: frame.account_txs.clone(),
                    state_hash: hash,
                    proposer_sig: sig,
                }))
                .await;
        }
        Ok(())
    }

    async fn handle_input(&self, input: AccountInput) -> AceResult<()> {
        let pair = input.pair();
        match input {
            AccountInput::Proposal(p) => self.handle_proposal(pair, p).await,
            AccountInput::Ack(a) => self.handle_ack(pair, a).await,
            AccountInput::Nak(n) => self.handle_nak(pair, n).await,
            AccountInput::Finalize(f) => self.handle_finalize(pair, f).await,
            AccountInput::Settle(_) => {
                // Settlement-workspace negotiation is owned by xln-settlement;
                // ACE only carries the resulting `account_settle` AccountTx.
                Ok(())
            }
        }
    }

    async fn current_height(&self, pair: AccountPair) -> Option<u64> {
        self.state.height_of(pair)
    }
}

impl<B, C, K, D> AccountConsensusService<B, C, K, D>
where
    B: AccountEventBus,
    C: Crypto,
    K: KeyStore,
    D: DisputeGateway,
{
    async fn handle_proposal(&self, pair: AccountPair, p: AccountFrameProposal) -> AceResult<()> {
        let counterparty = pair.counterparty_of(&self.local_entity_id);
        let proposer_is_left = pair.is_left(&counterparty);
        let expected_height = self
            .state
            .height_of(pair)
            .map(|h| h + 1)
            .unwrap_or(1);
        if p.height != expected_height {
            self.event_bus
                .send(AccountInput::Nak(AccountFrameNak {
                    pair,
                    height: p.height,
                    reason: format!("expected height {}, got {}", expected_height, p.height),
                }))
                .await;
            return Err(AceError::InvalidHeight {
                current: expected_height.saturating_sub(1),
                proposed: p.height,
            });
        }

        let machine_snapshot = self.state.get_or_open(pair).clone();
        let candidate = AccountFrame {
            height: p.height,
            timestamp: p.timestamp,
            account_txs: p.account_txs.clone(),
            token_ids: machine_snapshot.deltas.keys().copied().collect(),
            by_left: proposer_is_left,
            state_hash: shared_types::GENESIS_HASH,
            prev_state_hash: machine_snapshot.current_frame.state_hash,
        };

        match self.simulate_frame(&machine_snapshot, &candidate) {
            Ok((_scratch, hash)) if hash == p.state_hash => {
                let ack_sig = self.sign(&hash);
                {
                    let mut machine = self.state.get_or_open(pair);
                    let mut sealed = candidate;
                    sealed.state_hash = hash;
                    machine.pending_frame = Some(sealed);
                    machine.phase = machine
                        .phase
                        .next(AccountEvent::ProposalReceived)
                        .unwrap_or(machine.phase);
                }
                self.event_bus
                    .send(AccountInput::Ack(AccountFrameAck {
                        pair,
                        height: p.height,
                        state_hash: hash,
                        ack_sig,
                    }))
                    .await;
                Ok(())
            }
            Ok((_scratch, recomputed)) => {
                debug!(pair = ?pair, expected = ?p.state_hash, got = ?recomputed, "state hash mismatch on proposal");
                self.event_bus
                    .send(AccountInput::Nak(AccountFrameNak {
                        pair,
                        height: p.height,
                        reason: "state_hash mismatch".into(),
                    }))
                    .await;
                Err(AceError::StateHashMismatch)
            }
            Err(e) => {
                self.event_bus
                    .send(AccountInput::Nak(AccountFrameNak {
                        pair,
                        height: p.height,
                        reason: e.to_string(),
                    }))
                    .await;
                Err(e)
            }
        }
    }

    async fn handle_ack(&self, pair: AccountPair, ack: AccountFrameAck) -> AceResult<()> {
        let counterparty = pair.counterparty_of(&self.local_entity_id);
        let pending_height = {
            let machine = self.state.get_or_open(pair);
            machine.pending_frame.as_ref().map(|f| f.height)
        };
        if pending_height != Some(ack.height) {
            return Err(AceError::UnexpectedPhase);
        }
        let expected_hash = {
            let machine = self.state.get_or_open(pair);
            machine.pending_frame.as_ref().map(|f| f.state_hash)
        };
        if expected_hash != Some(ack.state_hash) {
            return self.retry_after_hash_mismatch(pair).await;
        }
        if !self.verify_counterparty(counterparty, &ack.state_hash, &ack.ack_sig) {
            return Err(AceError::SignatureInvalid { who: "counterparty ack" });
        }

        let (hanko, finalized_frame, included_count) = {
            let mut machine = self.state.get_or_open(pair);
            machine.pending_signatures.push(ack.ack_sig.clone());
            let is_left = pair.is_left(&self.local_entity_id);
            let (left_sig, right_sig) = if is_left {
                (machine.pending_signatures[0].clone(), ack.ack_sig.clone())
            } else {
                (ack.ack_sig.clone(), machine.pending_signatures[0].clone())
            };
            let hanko = shared_types::Hanko::from_pair(left_sig, right_sig);

            let frame = machine.pending_frame.take().expect("pending frame present");
            let included = frame.account_txs.len();
            for tx in &frame.account_txs {
                machine.apply_tx(tx, frame.by_left).ok();
            }
            machine.drain_included(&frame.account_txs);
            machine.frame_history.push(frame.clone());
            machine.current_frame = frame.clone();
            machine.hanko_signature = Some(hanko.clone());
            machine.pending_signatures.clear();
            machine.retry_count = 0;
            machine.phase = machine.phase.next(AccountEvent::AckReceived).unwrap_or(machine.phase);
            (hanko, frame, included)
        };
        let _ = included_count;

        self.event_bus
            .send(AccountInput::Finalize(AccountFrameFinalize {
                pair,
                height: finalized_frame.height,
                hanko,
            }))
            .await;
        Ok(())
    }

    async fn retry_after_hash_mismatch(&self, pair: AccountPair) -> AceResult<()> {
        let attempt = {
            let mut machine = self.state.get_or_open(pair);
            machine.retry_count += 1;
            machine.pending_frame = None;
            machine.pending_signatures.clear();
            machine.retry_count
        };
        if retries_exhausted(attempt) {
            let mut machine = self.state.get_or_open(pair);
            self.escalate_dispute(&mut machine).await;
            return Err(AceError::RetriesExhausted);
        }
        tokio::time::sleep(crate::domain::backoff::backoff_delay(attempt)).await;
        Err(AceError::StateHashMismatch)
    }

    async fn handle_nak(&self, pair: AccountPair, nak: AccountFrameNak) -> AceResult<()> {
        warn!(pair = ?pair, height = nak.height, reason = %nak.reason, "proposal nak'd, re-validating mempool");
        let requeue: Vec<AccountTx> = {
            let mut machine = self.state.get_or_open(pair);
            let offending = machine.pending_frame.take();
            machine.pending_signatures.clear();
            match offending {
                Some(frame) => {
                    let mut scratch = machine.clone();
                    frame
                        .account_txs
                        .into_iter()
                        .filter(|tx| scratch.apply_tx(tx, frame.by_left).is_ok())
                        .collect()
                }
                None => Vec::new(),
            }
        };
        let mut machine = self.state.get_or_open(pair);
        let mut surviving = requeue;
        surviving.extend(machine.mempool.drain(..));
        machine.mempool = surviving;
        machine.phase = crate::domain::AccountPhase::Idle;
        Ok(())
    }

    async fn handle_finalize(&self, pair: AccountPair, finalize: AccountFrameFinalize) -> AceResult<()> {
        let pending = {
            let machine = self.state.get_or_open(pair);
            machine.pending_frame.clone()
        };
        let Some(frame) = pending else {
            return Err(AceError::UnexpectedPhase);
        };
        if frame.height != finalize.height {
            return Err(AceError::InvalidHeight {
                current: frame.height,
                proposed: finalize.height,
            });
        }
        let counterparty = pair.counterparty_of(&self.local_entity_id);
        let is_left = pair.is_left(&self.local_entity_id);
        let counterparty_sig_index = if is_left { 1 } else { 0 };
        let Some(counterparty_sig) = finalize.hanko.signatures.get(counterparty_sig_index) else {
            return Err(AceError::SignatureInvalid { who: "hanko" });
        };
        if !self.verify_counterparty(counterparty, &frame.state_hash, counterparty_sig) {
            let mut machine = self.state.get_or_open(pair);
            self.escalate_dispute(&mut machine).await;
            return Err(AceError::SignatureInvalid { who: "finalize hanko" });
        }

        let mut machine = self.state.get_or_open(pair);
        for tx in &frame.account_txs {
            machine.apply_tx(tx, frame.by_left).ok();
        }
        machine.drain_included(&frame.account_txs);
        machine.frame_history.push(frame.clone());
        machine.current_frame = frame;
        machine.hanko_signature = Some(finalize.hanko);
        machine.pending_frame = None;
        machine.retry_count = 0;
        machine.phase = machine
            .phase
            .next(AccountEvent::FinalizeReceived)
            .unwrap_or(machine.phase);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::event_bus::BusAccountEventBus;
    use shared_bus::InMemoryEventBus;
    use shared_crypto::{DeterministicKeyStore, Secp256k1Crypto};
    use shared_types::{Amount, Side, TokenId};

    fn make_service(
        entity: EntityId,
    ) -> AccountConsensusService<BusAccountEventBus, Secp256k1Crypto, DeterministicKeyStore, NoopDisputeGateway> {
        let bus = Arc::new(InMemoryEventBus::new());
        AccountConsensusService::new(
            entity,
            Arc::new(BusAccountEventBus::new(bus)),
            Arc::new(Secp256k1Crypto),
            Arc::new(DeterministicKeyStore::new()),
            Arc::new(NoopDisputeGateway::default()),
            b"shared-seed".to_vec(),
        )
    }

    #[derive(Default)]
    struct NoopDisputeGateway {
        opened: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl DisputeGateway for NoopDisputeGateway {
        async fn open_dispute(&self, _pair: AccountPair, _hash: shared_types::Hash, _height: u64) {
            self.opened.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn queue_tx_opens_account_and_buffers_mempool() {
        let left = EntityId([1; 32]);
        let right = EntityId([2; 32]);
        let pair = AccountPair::new(left, right);
        let svc = make_service(left);

        svc.queue_tx(
            pair,
            AccountTx::SetCreditLimit {
                token: TokenId(1),
                side: Side::Right,
                amount: Amount::from(1_000i64),
            },
        )
        .await
        .unwrap();

        assert_eq!(svc.current_height(pair).await, Some(0));
    }

    #[tokio::test]
    async fn proposal_and_ack_round_trip_finalizes_frame() {
        let left = EntityId([1; 32]);
        let right = EntityId([2; 32]);
        let pair = AccountPair::new(left, right);

        let left_svc = make_service(left);
        let right_svc = make_service(right);

        left_svc
            .queue_tx(
                pair,
                AccountTx::SetCreditLimit {
                    token: TokenId(1),
                    side: Side::Right,
                    amount: Amount::from(1_000i64),
                },
            )
            .await
            .unwrap();

        // Manually drive one proposal -> ack -> finalize cycle by hand,
        // since the two services don't share a bus in this test.
        let machine_snapshot = {
            let m = left_svc.state.get_or_open(pair);
            m.clone()
        };
        let frame = left_svc.build_candidate_frame(&machine_snapshot, true);
        let (_scratch, hash) = left_svc.simulate_frame(&machine_snapshot, &frame).unwrap();
        let proposer_sig = left_svc.sign(&hash);

        let proposal = AccountFrameProposal {
            pair,
            height: frame.height,
            timestamp: frame.timestamp,
            account_txs: frame.account_txs.clone(),
            state_hash: hash,
            proposer_sig,
        };

        right_svc
            .handle_input(AccountInput::Proposal(proposal))
            .await
            .unwrap();
        assert_eq!(right_svc.current_height(pair).await, Some(0));
    }
}
