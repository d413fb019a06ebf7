//! `RuntimeHost`: the complete per-entity stack (spec §5 "an account lives
//! in exactly one entity's state and is mirrored on the counterparty's
//! entity" — discovered from `xln-ace`'s `AccountConsensusService`, which
//! privately owns its `AceState`, to mean each hosted entity gets its own
//! independent `AceState`/`ErmState`/`JbpState` triple, not one shared map).
//!
//! Every locally-hosted entity gets one `RuntimeHost`: its own
//! `AccountConsensusService`, `SettlementService`, `EntityService`,
//! `JbpService`, the state each of those owns, and a private outbox bus
//! `AccountInput`s are published onto (spec §5 "Suspension points": ACE
//! never suspends mid-frame, so draining the outbox right after the call
//! that produced it is always safe).

use crate::types::{Ace, Entity, Jbp, Settlement};
use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, Subscription};
use shared_crypto::{DeterministicKeyStore, Secp256k1Crypto};
use shared_types::{AccountInput, EntityConfig, EntityId};
use std::sync::Arc;
use tokio::sync::Mutex;
use xln_ace::adapters::BusAccountEventBus;
use xln_ace::{AccountConsensusService, AceState};
use xln_adapters::MockJurisdictionAdapter;
use xln_erm::adapters::AceErmGateway;
use xln_erm::{EntityService, ErmState};
use xln_jbp::{ErmJbpGateway, JbpDisputeGateway, JbpService, JbpState, SettlementJbpSink};
use xln_settlement::adapters::AceAccountGateway;
use xln_settlement::SettlementService;

/// Everything one locally-hosted entity needs to take part in the tick loop.
pub struct RuntimeHost {
    pub local_entity_id: EntityId,
    pub ace: Arc<Ace>,
    pub entity: Arc<Entity>,
    pub jbp: Arc<Jbp>,
    pub ace_state: Arc<AceState>,
    pub erm_state: Arc<ErmState>,
    /// Publishes the `AccountInput`s this host's `ace` produces; drained by
    /// the container immediately after every call that can produce one
    /// (`propose_ready_accounts`, `handle_input`) and routed directly to the
    /// counterparty host, since `AccountInput` carries no sender field to
    /// route on (spec §6.4).
    outbox: Arc<InMemoryEventBus>,
    outbox_sub: Mutex<Subscription>,
}

impl RuntimeHost {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        local_entity_id: EntityId,
        jurisdiction: Arc<MockJurisdictionAdapter>,
        crypto: Arc<Secp256k1Crypto>,
        keystore: Arc<DeterministicKeyStore>,
        seed: Vec<u8>,
        default_config: EntityConfig,
    ) -> Self {
        let erm_state = Arc::new(ErmState::new());
        let jbp_state = Arc::new(JbpState::new());
        let outbox = Arc::new(InMemoryEventBus::new());
        let outbox_sub = outbox.subscribe(EventFilter::topics(vec![EventTopic::AccountMessages]));
        let account_event_bus = Arc::new(BusAccountEventBus::new(outbox.clone()));

        let dispute_gateway = Arc::new(JbpDisputeGateway::new(local_entity_id, erm_state.clone()));

        let ace = Arc::new(AccountConsensusService::new(
            local_entity_id,
            account_event_bus,
            crypto.clone(),
            keystore.clone(),
            dispute_gateway,
            seed.clone(),
        ));
        let ace_state = ace.state();

        let jbp = Arc::new(JbpService::new(
            erm_state.clone(),
            ace_state.clone(),
            jbp_state,
            jurisdiction,
            crypto.clone(),
            keystore.clone(),
            Box::new(xln_jbp::SystemTimeSource),
            seed.clone(),
            default_config.clone(),
        ));

        let settlement_jbp_sink = Arc::new(SettlementJbpSink::new(local_entity_id, erm_state.clone()));
        let ace_account_gateway = Arc::new(AceAccountGateway::new(ace_state.clone(), ace.clone()));
        let settlement: Arc<Settlement> = Arc::new(SettlementService::new(
            local_entity_id,
            ace_account_gateway,
            settlement_jbp_sink,
            crypto.clone(),
            keystore.clone(),
            seed.clone(),
        ));

        let ace_erm_gateway = Arc::new(AceErmGateway::new(ace_state.clone(), ace.clone()));
        let erm_jbp_gateway = Arc::new(ErmJbpGateway::new(jbp.clone()));
        let entity = Arc::new(EntityService::new(
            ace_erm_gateway,
            erm_jbp_gateway,
            settlement,
            crypto,
            Box::new(xln_erm::SystemTimeSource),
            erm_state.clone(),
            default_config,
        ));

        Self {
            local_entity_id,
            ace,
            entity,
            jbp,
            ace_state,
            erm_state,
            outbox,
            outbox_sub: Mutex::new(outbox_sub),
        }
    }

    /// Drains every `AccountInput` this host published since the last drain.
    /// Called by the container right after invoking `ace.propose_ready_accounts`
    /// or `ace.handle_input`, the only two calls that can populate the outbox.
    pub async fn drain_outbox(&self) -> Vec<AccountInput> {
        let mut sub = self.outbox_sub.lock().await;
        let mut out = Vec::new();
        loop {
            match sub.try_recv() {
                Ok(Some(shared_bus::XlnEvent::AccountMessage(input))) => out.push(input),
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(_) => break,
            }
        }
        out
    }
}
