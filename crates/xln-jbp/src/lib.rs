//! # Jurisdiction Batch Pipeline (xln-jbp)
//!
//! Aggregates an entity's queued reserve/collateral/dispute ops into a draft
//! batch, broadcasts it to the jurisdiction chain, and reconciles
//! `JurisdictionEvent`s observed from the chain back into `xln-erm`'s and
//! `xln-ace`'s shared state (spec §4.4).
//!
//! ## Layout
//!
//! - [`domain`] — pure batch-lifecycle transitions ([`domain::lifecycle`]),
//!   fee-preset resolution ([`domain::fees`]), and [`JbpError`]. No I/O.
//! - [`ports`] — the inbound [`JbpApi`](ports::JbpApi) this crate exposes,
//!   and the outbound [`JurisdictionAdapter`](ports::JurisdictionAdapter)
//!   capability it needs from the chain-facing adapter layer.
//! - [`adapters`] — [`ErmJbpGateway`](adapters::ErmJbpGateway), which adapts
//!   this crate to `xln-erm`'s `JbpGateway` outbound port;
//!   [`JbpDisputeGateway`](adapters::JbpDisputeGateway), which adapts it to
//!   `xln-ace`'s `DisputeGateway` outbound port; and
//!   [`SettlementJbpSink`](adapters::SettlementJbpSink), which adapts it to
//!   `xln-settlement`'s `JbpDraftSink` outbound port.
//! - [`state`] — [`JbpState`], the per-entity nonce counter and chain-event
//!   dedup set this crate owns outside of `EntityState`.
//! - [`service`] — [`JbpService`](service::JbpService), which drives
//!   broadcast/rebroadcast/clear and event reconciliation.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod state;

pub use adapters::{ErmJbpGateway, JbpDisputeGateway, SettlementJbpSink};
pub use domain::{JbpError, JbpResult};
pub use ports::{JbpApi, JurisdictionAdapter, SystemTimeSource, TimeSource};
pub use service::JbpService;
pub use state::JbpState;
