//! # Entity Replicated Machine (xln-erm)
//!
//! Per-entity deterministic state machine (spec §4.3): reserves, references
//! to the per-pair `AccountMachine`s an entity has opened via `xln-ace`, the
//! settlement-workspace lifecycle layered over a pair via `xln-settlement`,
//! and the jurisdiction draft/sent batch an entity accumulates for `xln-jbp`
//! to submit. Entities replay `EntityTx` in strict insertion order; frame
//! production (height + stateHash advance) happens once per scheduler tick
//! that touches an entity.
//!
//! ## Layout
//!
//! - [`domain`] — [`EntityState`](domain::EntityState) and the pure
//!   `EntityTx` effects that only touch an entity's own fields
//!   ([`domain::apply`]). No I/O.
//! - [`ports`] — the inbound [`ErmApi`](ports::ErmApi) this crate exposes,
//!   and the outbound [`AceGateway`](ports::AceGateway) /
//!   [`JbpGateway`](ports::JbpGateway) capabilities it needs.
//! - [`adapters`] — the concrete [`AceGateway`](ports::AceGateway)
//!   implementation over `xln-ace`'s shared account state.
//! - [`state`] — [`ErmState`], the shared map of `EntityId -> EntityState`.
//! - [`service`] — [`EntityService`](service::EntityService), which applies
//!   an `EntityInput`'s transactions and advances the entity's frame.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod state;

pub use domain::{EntityState, ErmError, ErmResult};
pub use ports::{AceGateway, ErmApi, JbpGateway, SystemTimeSource, TimeSource};
pub use service::EntityService;
pub use state::ErmState;
