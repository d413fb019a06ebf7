//! Errors raised by the batch lifecycle and chain-event reconciliation.

use shared_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JbpError {
    #[error("a batch is already in flight for this entity")]
    AlreadySent,
    #[error("no batch is in flight for this entity")]
    NoSentBatch,
    #[error("draft batch is empty, nothing to broadcast")]
    EmptyDraft,
    #[error("gas bump of {0} bps exceeds the configured maximum")]
    GasBumpTooLarge(u32),
    #[error("observed entity nonce {observed} is below the last finalized nonce {last_finalized}")]
    StaleNonce { observed: u64, last_finalized: u64 },
}

impl JbpError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

pub type JbpResult<T> = Result<T, JbpError>;
