//! # Runtime Scheduler (xln-runtime)
//!
//! The single cooperative tick loop over every locally-hosted entity (spec
//! §5), and the ingress/egress/query surface the UI talks to (spec §6.2).
//! Owns no domain logic of its own — every state transition happens inside
//! `xln-ace`, `xln-settlement`, `xln-erm`, or `xln-jbp` — this crate only
//! decides *when* each runs and *where* the `AccountInput`s they produce get
//! delivered.
//!
//! ## Layout
//!
//! - [`config`] — [`RuntimeConfig`](config::RuntimeConfig), the numeric
//!   defaults named in spec §4.1/§4.2/§4.4.
//! - [`host`] — [`RuntimeHost`](host::RuntimeHost): one entity's complete
//!   stack (`AccountConsensusService`, `SettlementService`,
//!   `EntityService`, `JbpService`, and the state each owns), monomorphized
//!   against the concrete crypto/keystore/chain-adapter types this binary
//!   runs with ([`types`]).
//! - [`container`] — [`RuntimeContainer`](container::RuntimeContainer): the
//!   host map, the tick loop, and the ingress (`enqueue_runtime_input`) and
//!   chain-event (`submit_jurisdiction_event`) entry points.
//! - [`query`] — the `getAccount`/`deriveDelta`/`formatTokenAmount`/
//!   `getHubs` query helpers (spec §6.2).
//! - [`error`] — [`RuntimeError`](error::RuntimeError).
//!
//! Each hosted entity gets its own independent `AceState`/`ErmState`/
//! `JbpState` triple — an account lives in exactly one entity's state and is
//! mirrored on the counterparty's (spec §5), never a state map shared across
//! every entity this process happens to simulate.

pub mod config;
pub mod container;
pub mod error;
pub mod host;
pub mod query;
pub mod types;

pub use config::RuntimeConfig;
pub use container::RuntimeContainer;
pub use error::{RuntimeError, RuntimeResult};
pub use host::RuntimeHost;
