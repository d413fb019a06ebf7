//! Errors raised while applying an `EntityTx` to an `EntityState`.

use shared_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErmError {
    #[error("insufficient reserve balance for token {token:?}: have {available}, need {required}")]
    InsufficientReserve {
        token: shared_types::TokenId,
        available: String,
        required: String,
    },
    #[error("no account open with counterparty")]
    NoSuchAccount,
    #[error("an account with this counterparty is already open")]
    AccountAlreadyOpen,
    #[error("account is not healthy (status {status:?})")]
    AccountNotHealthy { status: xln_ace::AccountStatus },
    #[error("settlement error: {0}")]
    Settle(#[from] xln_settlement::SettleError),
    #[error("ace error: {0}")]
    Ace(String),
    #[error("jbp error: {0}")]
    Jbp(String),
}

impl ErmError {
    /// Mirrors `xln-ace`'s convention: every ERM-level rejection here is a
    /// local validation failure the caller can react to, never an escalation
    /// path on its own (escalation is `disputeStart`, an explicit tx).
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

pub type ErmResult<T> = Result<T, ErmError>;
