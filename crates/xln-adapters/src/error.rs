//! Error taxonomy for this crate (spec §7). Adapter calls here never fail in
//! practice — they are in-memory stand-ins for a real chain/gossip network —
//! but `TokenRegistry::info` can legitimately miss, so it still returns a
//! `Result` through this type rather than an `Option` the caller must special
//! case differently from every other port.

use shared_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("unknown token {0:?}")]
    UnknownToken(shared_types::TokenId),
}

impl AdapterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::UnknownToken(_) => ErrorKind::Validation,
        }
    }
}

pub type AdapterResult<T> = Result<T, AdapterError>;
