//! `JbpService`: drives the jurisdiction batch lifecycle for every
//! locally-hosted entity and reconciles `JurisdictionEvent`s back into
//! `xln-erm`'s and `xln-ace`'s shared state (spec §4.4).

use crate::domain::{fees, lifecycle, JbpError, JbpResult};
use crate::ports::inbound::JbpApi;
use crate::ports::outbound::{JurisdictionAdapter, TimeSource};
use crate::state::JbpState;
use async_trait::async_trait;
use shared_crypto::{Crypto, KeyStore};
use shared_types::{AccountPair, CanonicalEncode, EntityConfig, EntityId, FeePreset, JurisdictionEvent};
use std::sync::Arc;
use tracing::{debug, info, warn};
use xln_ace::{signer_id_for_entity, AccountStatus};

pub struct JbpService<J, C, K>
where
    J: JurisdictionAdapter,
    C: Crypto,
    K: KeyStore,
{
    erm_state: Arc<xln_erm::ErmState>,
    ace_state: Arc<xln_ace::AceState>,
    jbp_state: Arc<JbpState>,
    jurisdiction: Arc<J>,
    crypto: Arc<C>,
    keystore: Arc<K>,
    time_source: Box<dyn TimeSource>,
    seed: Vec<u8>,
    /// Used only as the `get_or_open` fallback when a `j_*` call races
    /// ahead of the entity's first `EntityTx` (should not happen in
    /// practice, since an entity always processes at least one local-effect
    /// tx before it can have accumulated a non-empty draft batch).
    default_config: EntityConfig,
}

impl<J, C, K> JbpService<J, C, K>
where
    J: JurisdictionAdapter,
    C: Crypto,
    K: KeyStore,
{
    pub fn new(
        erm_state: Arc<xln_erm::ErmState>,
        ace_state: Arc<xln_ace::AceState>,
        jbp_state: Arc<JbpState>,
        jurisdiction: Arc<J>,
        crypto: Arc<C>,
        keystore: Arc<K>,
        time_source: Box<dyn TimeSource>,
        seed: Vec<u8>,
        default_config: EntityConfig,
    ) -> Self {
        Self {
            erm_state,
            ace_state,
            jbp_state,
            jurisdiction,
            crypto,
            keystore,
            time_source,
            seed,
            default_config,
        }
    }

    fn sign(&self, entity_id: EntityId, hash: &shared_types::Hash) -> shared_types::Signature {
        let signer = signer_id_for_entity(entity_id);
        let key = self.keystore.derive_signer(&self.seed, signer);
        self.crypto.sign(&key, hash)
    }

    fn batch_hash(&self, draft: &shared_types::DraftBatch, nonce: u64) -> shared_types::Hash {
        let mut bytes = draft.canonical_bytes();
        nonce.canonical_encode(&mut bytes);
        self.crypto.hash(&bytes)
    }
}

#[async_trait]
impl<J, C, K> JbpApi for JbpService<J, C, K>
where
    J: JurisdictionAdapter,
    C: Crypto,
    K: KeyStore,
{
    async fn j_broadcast(&self, entity_id: EntityId, fee_override: Option<FeePreset>) -> JbpResult<()> {
        let nonce = self.jbp_state.peek_nonce(entity_id);
        let now = self.time_source.now_ms();

        // Snapshot the inputs needed to build the `Sent` batch, then drop
        // the guard before the awaits below — `ErmState`'s guard is not
        // held across suspension points (spec §5 "never suspends while
        // holding a mutable reference to a frame under construction").
        let (draft, prior_sent) = {
            let state = self.erm_state.get_or_open(entity_id, || self.default_config.clone());
            (state.batch.clone(), state.sent_batch.clone())
        };
        let hash = self.batch_hash(&draft, nonce);
        let mut sent = lifecycle::broadcast(&draft, &prior_sent, nonce, hash, now)?;

        let preset = fee_override.unwrap_or(FeePreset::Standard);
        let base = self.jurisdiction.fee_data().await;
        let overrides = fees::resolve(&preset, &base);
        let sig = self.sign(entity_id, &hash);
        let payload = draft.canonical_bytes();
        let tx_hash = self.jurisdiction.submit_process_batch(payload, sig, overrides).await;
        sent.tx_hash = Some(tx_hash);

        self.jbp_state.consume_nonce(entity_id);
        let mut state = self.erm_state.get_or_open(entity_id, || self.default_config.clone());
        state.sent_batch = Some(sent);
        state.batch = shared_types::DraftBatch::default();
        info!(entity = ?entity_id, nonce, "batch broadcast");
        Ok(())
    }

    async fn j_rebroadcast(&self, entity_id: EntityId, gas_bump_bps: u32) -> JbpResult<()> {
        let now = self.time_source.now_ms();

        let mut sent = {
            let state = self.erm_state.get_or_open(entity_id, || self.default_config.clone());
            state.sent_batch.clone().ok_or(JbpError::NoSentBatch)?
        };
        lifecycle::rebroadcast(&mut sent, gas_bump_bps, now)?;

        let base = self.jurisdiction.fee_data().await;
        let overrides = fees::resolve_bump(&base, gas_bump_bps);
        let sig = self.sign(entity_id, &sent.batch_hash);
        let payload = sent.ops.canonical_bytes();
        let tx_hash = self.jurisdiction.submit_process_batch(payload, sig, overrides).await;
        sent.tx_hash = Some(tx_hash);

        let mut state = self.erm_state.get_or_open(entity_id, || self.default_config.clone());
        let attempts = sent.submit_attempts;
        state.sent_batch = Some(sent);
        info!(entity = ?entity_id, attempts, "batch rebroadcast");
        Ok(())
    }

    async fn j_clear_batch(&self, entity_id: EntityId, reason: String) -> JbpResult<()> {
        let mut state = self.erm_state.get_or_open(entity_id, || self.default_config.clone());
        lifecycle::clear_batch(&mut state.batch, &state.sent_batch)?;
        debug!(entity = ?entity_id, reason = %reason, "draft batch cleared");
        Ok(())
    }

    async fn handle_jurisdiction_event(&self, event: JurisdictionEvent) -> JbpResult<()> {
        match event {
            JurisdictionEvent::BatchConfirmed {
                tx_hash,
                j_block_number,
                entity_id,
                entity_nonce,
                event_type,
                ..
            } => {
                if !self.jbp_state.mark_seen((tx_hash.clone(), 0)) {
                    return Ok(());
                }
                let last_finalized = self.jbp_state.last_finalized_nonce(entity_id);
                lifecycle::check_nonce_not_stale(entity_nonce, last_finalized)?;

                let mut state = self.erm_state.get_or_open(entity_id, || self.default_config.clone());
                if matches!(&state.sent_batch, Some(s) if s.entity_nonce == entity_nonce) {
                    let sent = state.sent_batch.take().unwrap();
                    let entry = lifecycle::confirm(sent, j_block_number, tx_hash);
                    state.batch_history.push(entry);
                    state.last_finalized_j_height = j_block_number;
                }
                self.jbp_state.set_last_finalized_nonce(entity_id, entity_nonce);
                debug!(entity = ?entity_id, nonce = entity_nonce, ?event_type, "batch confirmed on chain");
                Ok(())
            }
            JurisdictionEvent::BatchFailed { entity_id, entity_nonce, reason } => {
                let mut state = self.erm_state.get_or_open(entity_id, || self.default_config.clone());
                if matches!(&state.sent_batch, Some(s) if s.entity_nonce == entity_nonce) {
                    let sent = state.sent_batch.take().unwrap();
                    let entry = lifecycle::fail(sent, reason.clone());
                    state.batch_history.push(entry);
                }
                self.jbp_state.set_last_finalized_nonce(entity_id, entity_nonce);
                warn!(entity = ?entity_id, nonce = entity_nonce, reason = %reason, "batch failed on chain");
                Ok(())
            }
            JurisdictionEvent::CounterpartyBatchConfirmed {
                tx_hash,
                j_block_number,
                entity_id,
                counterparty,
                op_index,
                token,
                collateral_delta,
                ..
            } => {
                if !self.jbp_state.mark_seen((tx_hash.clone(), op_index)) {
                    return Ok(());
                }
                // Mirror the counterparty's confirmed reserve<->collateral
                // op into the shared account, the same way `compile_ops`
                // orients an `R2c`/`C2r` — but from the counterparty's side,
                // since this event observed *their* op, not ours. `mark_seen`
                // above makes this idempotent on re-delivery.
                let pair = AccountPair::new(entity_id, counterparty);
                let counterparty_is_left = pair.is_left(&counterparty);
                {
                    let mut machine = self.ace_state.get_or_open(pair);
                    let delta = machine
                        .deltas
                        .entry(token)
                        .or_insert_with(|| shared_types::Delta::new(token));
                    delta.collateral = &delta.collateral + &collateral_delta;
                    if counterparty_is_left {
                        delta.ondelta += collateral_delta.clone();
                    } else {
                        delta.ondelta -= collateral_delta.clone();
                    }
                }
                let mut state = self.erm_state.get_or_open(entity_id, || self.default_config.clone());
                state.batch_history.push(shared_types::BatchHistoryEntry {
                    ops: shared_types::DraftBatch::default(),
                    entity_nonce: 0,
                    batch_hash: [0u8; 32],
                    status: shared_types::BatchStatus::Confirmed,
                    source: shared_types::BatchSource::CounterpartyEvent,
                    j_block_number: Some(j_block_number),
                    tx_hash: Some(tx_hash),
                });
                Ok(())
            }
            JurisdictionEvent::DisputeStarted {
                entity_id,
                counterparty,
                timeout_block,
                initial_nonce,
            } => {
                let pair = AccountPair::new(entity_id, counterparty);
                let mut machine = self.ace_state.get_or_open(pair);
                machine.status = AccountStatus::Disputed;
                machine.active_dispute = Some(xln_ace::domain::ActiveDispute {
                    dispute_timeout: timeout_block,
                    initial_nonce,
                    final_nonce: None,
                });
                Ok(())
            }
            JurisdictionEvent::DisputeFinalized {
                entity_id,
                counterparty,
                cooperative,
            } => {
                let pair = AccountPair::new(entity_id, counterparty);
                let mut machine = self.ace_state.get_or_open(pair);
                machine.status = AccountStatus::Closed;
                if !cooperative {
                    let outputs = machine.derive_settlement_outputs();
                    info!(
                        entity = ?entity_id,
                        counterparty = ?counterparty,
                        tokens = outputs.len(),
                        "non-cooperative dispute finalized; settlement outputs derived from last known frame"
                    );
                }
                Ok(())
            }
        }
    }
}
