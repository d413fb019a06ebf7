//! Shared fixtures for the end-to-end scenario and property tests. Not part
//! of the public workspace surface — this crate is `publish = false` and
//! exists only to drive `xln-runtime`'s `RuntimeContainer` and the
//! individual domain services the way an embedding application would.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{AccountPair, Amount, EntityConfig, EntityId, JurisdictionRef, TokenId};
use std::sync::Arc;
use xln_adapters::MockJurisdictionAdapter;
use xln_jbp::domain::FeeData;
use xln_runtime::{RuntimeConfig, RuntimeContainer};
use xln_settlement::JbpDraftSink;

/// Shared signing seed for every fixture in this crate. `xln-ace` derives
/// every entity's signer deterministically from `(seed, signer_id)`
/// (`signer_id_for_entity`), so two hosts built from the same seed can
/// validate each other's signatures without any out-of-band key exchange.
pub const TEST_SEED: &[u8] = b"xln-tests-fixture-seed";

pub const USDC: TokenId = TokenId(1);

/// Config tests should register hosts with: empty `validators` so
/// `EntityService::submit_entity_input` does not reject a `SignerId` the
/// test did not bother tracking (`xln-runtime`'s own demo `main.rs` uses a
/// real validator set; fixtures here intentionally don't).
pub fn test_entity_config() -> EntityConfig {
    EntityConfig {
        validators: vec![],
        jurisdiction: JurisdictionRef {
            chain_id: 1337,
            contract_address: "0x0000000000000000000000000000000000000001".to_string(),
        },
    }
}

/// Builds an `EntityId` from a single trailing byte, e.g. `entity(1)` and
/// `entity(2)` — low bytes keep `entity(1) < entity(2)` so tests can reason
/// about which side is `left` without computing a hash.
pub fn entity(byte: u8) -> EntityId {
    let mut bytes = [0u8; 32];
    bytes[31] = byte;
    EntityId(bytes)
}

pub fn amount(v: i64) -> Amount {
    Amount::from(v)
}

fn default_fee_data() -> FeeData {
    FeeData {
        max_fee_per_gas: amount(20_000_000_000),
        max_priority_fee_per_gas: amount(1_500_000_000),
    }
}

/// A fresh two-host container wired against an in-memory jurisdiction, with
/// entities `entity(1)` and `entity(2)` already registered.
pub fn two_host_container() -> RuntimeContainer {
    let jurisdiction = MockJurisdictionAdapter::new(default_fee_data());
    let mut container = RuntimeContainer::new(jurisdiction, TEST_SEED.to_vec(), RuntimeConfig::default());
    container.register_host(entity(1), test_entity_config());
    container.register_host(entity(2), test_entity_config());
    container
}

/// A container with `n` hosts registered as `entity(1)..=entity(n)`.
pub fn n_host_container(n: u8) -> RuntimeContainer {
    let jurisdiction = MockJurisdictionAdapter::new(default_fee_data());
    let mut container = RuntimeContainer::new(jurisdiction, TEST_SEED.to_vec(), RuntimeConfig::default());
    for i in 1..=n {
        container.register_host(entity(i), test_entity_config());
    }
    container
}

/// Builds a bare `MockJurisdictionAdapter` for fixtures that construct a
/// single `JbpService`/`AccountConsensusService` directly instead of going
/// through a `RuntimeContainer`.
pub fn mock_jurisdiction() -> Arc<MockJurisdictionAdapter> {
    MockJurisdictionAdapter::new(default_fee_data())
}

/// A `JbpDraftSink` that records every `reserve_to_reserve` enqueue instead
/// of discarding it, for fixtures that want to assert on what `settle_execute`
/// forwarded to JBP. Mirrors `xln-settlement`'s own `NoopJbpSink` test
/// double, but keeps what it's given rather than throwing it away.
#[derive(Default)]
pub struct RecordingJbpSink {
    pub calls: Mutex<Vec<(AccountPair, TokenId, Amount)>>,
}

impl RecordingJbpSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JbpDraftSink for RecordingJbpSink {
    async fn enqueue_reserve_to_reserve(&self, pair: AccountPair, token: TokenId, amount: Amount) {
        self.calls.lock().push((pair, token, amount));
    }
}
