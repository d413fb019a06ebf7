//! `RuntimeContainer`: the single cooperative tick loop over every
//! locally-hosted entity (spec §5). Owns no state of its own beyond the
//! host map and the shared crypto/keystore/chain-adapter instances every
//! host is built from; all mutable domain state lives inside each
//! `RuntimeHost`.

use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::host::RuntimeHost;
use shared_crypto::{DeterministicKeyStore, Secp256k1Crypto};
use shared_types::{EntityConfig, EntityId, JurisdictionEvent, RuntimeInput};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use xln_ace::AceApi;
use xln_adapters::MockJurisdictionAdapter;
use xln_erm::ErmApi;
use xln_jbp::JbpApi;

pub struct RuntimeContainer {
    hosts: HashMap<EntityId, RuntimeHost>,
    jurisdiction: Arc<MockJurisdictionAdapter>,
    crypto: Arc<Secp256k1Crypto>,
    keystore: Arc<DeterministicKeyStore>,
    seed: Vec<u8>,
    config: RuntimeConfig,
}

impl RuntimeContainer {
    pub fn new(jurisdiction: Arc<MockJurisdictionAdapter>, seed: Vec<u8>, config: RuntimeConfig) -> Self {
        Self {
            hosts: HashMap::new(),
            jurisdiction,
            crypto: Arc::new(Secp256k1Crypto),
            keystore: Arc::new(DeterministicKeyStore::new()),
            seed,
            config,
        }
    }

    pub fn config(&self) -> RuntimeConfig {
        self.config
    }

    /// Registers a new locally-hosted entity. Idempotent: re-registering an
    /// already-hosted entity replaces its host, discarding any in-flight
    /// state — callers should only do this once per entity at startup.
    pub fn register_host(&mut self, entity_id: EntityId, default_config: EntityConfig) {
        let host = RuntimeHost::new(
            entity_id,
            self.jurisdiction.clone(),
            self.crypto.clone(),
            self.keystore.clone(),
            self.seed.clone(),
            default_config,
        );
        self.hosts.insert(entity_id, host);
    }

    pub fn host(&self, entity_id: EntityId) -> RuntimeResult<&RuntimeHost> {
        self.hosts.get(&entity_id).ok_or(RuntimeError::UnknownEntity(entity_id))
    }

    pub fn hosted_entities(&self) -> Vec<EntityId> {
        self.hosts.keys().copied().collect()
    }

    /// Ingress (spec §6.2 `enqueueRuntimeInput`): forwards each signer's
    /// batch of `EntityTx` to its entity's `EntityService`.
    pub async fn enqueue_runtime_input(&self, input: RuntimeInput) -> RuntimeResult<()> {
        for entity_input in input.entity_inputs {
            let host = self.host(entity_input.entity_id)?;
            host.entity.submit_entity_input(entity_input).await?;
        }
        Ok(())
    }

    /// Reconciles one chain-observed event (spec §4.4). The adapter is
    /// assumed to deliver events for a given entity in strictly increasing
    /// `(jBlockNumber, logIndex)` order (spec §4.4 "Ordering guarantees");
    /// this method does not itself buffer or reorder.
    pub async fn submit_jurisdiction_event(&self, event: JurisdictionEvent) -> RuntimeResult<()> {
        let host = self.host(event.entity_id())?;
        host.jbp.handle_jurisdiction_event(event).await?;
        Ok(())
    }

    /// Runs one scheduler tick: proposes frames for every account ready to
    /// advance, then drains and delivers every resulting `AccountInput`
    /// until no host has anything left to publish (spec §5 "Ordering
    /// guarantees": cross-entity causality is enforced by finalization, so a
    /// single proposal can cascade through several rounds of ack/finalize
    /// before the tick settles).
    pub async fn tick(&self) -> RuntimeResult<()> {
        for host in self.hosts.values() {
            host.ace.propose_ready_accounts().await?;
        }
        self.route_until_quiescent().await
    }

    async fn route_until_quiescent(&self) -> RuntimeResult<()> {
        loop {
            let mut delivered_any = false;
            for (entity_id, host) in &self.hosts {
                for message in host.drain_outbox().await {
                    delivered_any = true;
                    let counterparty = message.pair().counterparty_of(entity_id);
                    match self.hosts.get(&counterparty) {
                        Some(target) => target.ace.handle_input(message).await?,
                        None => warn!(
                            from = ?entity_id,
                            to = ?counterparty,
                            "account message addressed to an unhosted entity, dropped"
                        ),
                    }
                }
            }
            if !delivered_any {
                return Ok(());
            }
        }
    }
}
