//! Monomorphized aliases tying every domain crate's generic service to the
//! concrete crypto, keystore, and chain-adapter types this binary runs with.
//! Threading four independent generic parameters through a multi-host
//! container buys nothing here — there is exactly one production choice of
//! `Crypto`/`KeyStore` (`shared-crypto`'s secp256k1/Keccak pair) and exactly
//! one chain adapter per deployment — so the container is built against
//! these concrete types instead.

use shared_crypto::{DeterministicKeyStore, Secp256k1Crypto};
use xln_ace::adapters::BusAccountEventBus;
use xln_ace::AccountConsensusService;
use xln_adapters::MockJurisdictionAdapter;
use xln_erm::adapters::AceErmGateway;
use xln_erm::EntityService;
use xln_jbp::{ErmJbpGateway, JbpDisputeGateway, JbpService, SettlementJbpSink};
use xln_settlement::adapters::AceAccountGateway;
use xln_settlement::SettlementService;

pub type Ace = AccountConsensusService<BusAccountEventBus, Secp256k1Crypto, DeterministicKeyStore, JbpDisputeGateway>;

pub type Jbp = JbpService<MockJurisdictionAdapter, Secp256k1Crypto, DeterministicKeyStore>;

pub type Settlement =
    SettlementService<AceAccountGateway<Ace>, SettlementJbpSink, Secp256k1Crypto, DeterministicKeyStore>;

pub type Entity = EntityService<AceErmGateway<Ace>, ErmJbpGateway<Jbp>, Settlement, Secp256k1Crypto>;
