//! # Settlement Workspace (xln-settlement)
//!
//! Cooperative multi-op settlement negotiation layered over a single ACE
//! account (spec §4.2). A workspace batches `r2c`/`c2r`/`r2r`/`forgive` ops,
//! carries both sides' hankos once agreed, and collapses into a single
//! `account_settle` transaction the owning pair's `AccountMachine` absorbs
//! like any other account tx.
//!
//! ## Layout
//!
//! - [`domain`] — the pure `Draft -> AwaitingCounterparty -> ReadyToSubmit ->
//!   Submitted` lifecycle rules and the op-compilation helpers re-exported
//!   from `shared-types`. No I/O, no signing.
//! - [`ports`] — the inbound [`SettlementApi`](ports::SettlementApi) this
//!   crate exposes, and the outbound [`AccountGateway`](ports::AccountGateway)
//!   / [`JbpDraftSink`](ports::JbpDraftSink) capabilities it needs.
//! - [`adapters`] — the concrete [`AccountGateway`](ports::AccountGateway)
//!   implementation over `xln-ace`'s shared account state.
//! - [`service`] — [`SettlementService`](service::SettlementService), the
//!   protocol driver that signs and applies the lifecycle transitions.
//!
//! The workspace itself (`SettlementWorkspace`, `SettleOp`, `CompiledDiff`)
//! lives in `shared-types` since `xln-ace`'s `account_settle` transaction
//! needs to reference `CompiledDiff` without depending on this crate.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{SettleError, SettleResult};
pub use ports::{AccountGateway, JbpDraftSink, SettlementApi, SystemTimeSource, TimeSource};
pub use service::SettlementService;
