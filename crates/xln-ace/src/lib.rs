//! # Account Consensus Engine (xln-ace)
//!
//! Bilateral two-phase-commit frame consensus between an account pair
//! (spec §4.1). Each `AccountMachine` is owned jointly by exactly two
//! entities; no third party ever observes or orders its frames. The
//! engine's only job is to keep both replicas of that pair's state in
//! lockstep: propose a frame, collect the counterparty's signature over the
//! resulting `stateHash`, and distribute the combined hanko.
//!
//! ## Layout
//!
//! - [`domain`] — the pure `AccountMachine`/`Delta`/tx-application rules,
//!   the `AccountPhase` state machine, and the retry backoff policy. No I/O.
//! - [`ports`] — the inbound [`AceApi`](ports::AceApi) this crate exposes
//!   and the outbound capabilities it needs (event bus, dispute escalation,
//!   wall clock).
//! - [`adapters`] — concrete outbound port implementations for this
//!   workspace (currently: `shared-bus`).
//! - [`service`] — [`AccountConsensusService`](service::AccountConsensusService),
//!   the protocol driver that ties domain rules to the ports above.
//! - [`state`] — [`AceState`](state::AceState), the shared map of open
//!   `AccountMachine`s keyed by pair.
//!
//! Settlement-workspace negotiation (`settle_propose`/`update`/`approve`/
//! `execute`/`reject`, spec §4.2) is owned by `xln-settlement`; this crate
//! only applies the resulting `account_settle` transaction once finalized.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod state;

pub use domain::{AccountEvent, AccountMachine, AccountPhase, AccountStatus, AceError, AceResult};
pub use ports::{AccountEventBus, AceApi, DisputeGateway, SystemTimeSource, TimeSource};
pub use service::{signer_id_for_entity, AccountConsensusService};
pub use state::AceState;
