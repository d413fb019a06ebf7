//! # Adapters (xln-adapters)
//!
//! Concrete, in-memory implementations of every outbound port the core
//! crates declare but do not implement (spec §6.1): the chain-facing
//! [`JurisdictionAdapter`](xln_jbp::JurisdictionAdapter), and the two ports
//! declared in this crate, [`Gossip`] and [`TokenRegistry`], since neither
//! has a natural home among the consensus crates.
//!
//! None of these model a real network — no libp2p, no RPC client, no chain
//! indexer. They exist so `xln-runtime` and `xln-tests` have something
//! concrete to wire against and drive by hand (mining blocks, seeding
//! balances, publishing profiles) without needing a live jurisdiction chain.
//!
//! ## Layout
//!
//! - [`jurisdiction`] — [`MockJurisdictionAdapter`], a block-counter-backed
//!   `JurisdictionAdapter`.
//! - [`gossip`] — the [`Gossip`] port and [`InMemoryGossip`], a shared
//!   profile map.
//! - [`token_registry`] — the [`TokenRegistry`] port and
//!   [`StaticTokenRegistry`], a seeded token metadata map.
//! - [`error`] — [`AdapterError`], for the one fallible lookup
//!   (`TokenRegistry::info` on an unknown token).

pub mod error;
pub mod gossip;
pub mod jurisdiction;
pub mod token_registry;

pub use error::{AdapterError, AdapterResult};
pub use gossip::{Gossip, InMemoryGossip};
pub use jurisdiction::{MockJurisdictionAdapter, SubmittedBatch};
pub use token_registry::{StaticTokenRegistry, TokenRegistry};
