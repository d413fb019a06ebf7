//! Errors raised while validating or advancing an account's consensus state.

use shared_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AceError {
    #[error("no account machine open for this pair")]
    UnknownAccount,
    #[error("proposal height {proposed} does not follow current height {current}")]
    InvalidHeight { current: u64, proposed: u64 },
    #[error("proposed frame hash does not match recomputed hash")]
    StateHashMismatch,
    #[error("signature verification failed for {who}")]
    SignatureInvalid { who: &'static str },
    #[error("transaction failed validation: {reason}")]
    InvalidTransaction { reason: String },
    #[error("frame already has a pending proposal awaiting ack")]
    ProposalInFlight,
    #[error("received input out of turn for the current phase")]
    UnexpectedPhase,
    #[error("settlement workspace is not open")]
    NoWorkspace,
    #[error("settlement workspace version mismatch: expected {expected}, got {got}")]
    WorkspaceVersionMismatch { expected: u32, got: u32 },
    #[error("settlement workspace is not ready to submit")]
    WorkspaceNotReady,
    #[error("retry budget exhausted, escalating to dispute")]
    RetriesExhausted,
    #[error("event bus publish failed: {0}")]
    EventBusError(String),
}

impl AceError {
    /// Maps a domain error onto the shared five-way error taxonomy (spec §7),
    /// used to decide whether a failure is fatal and must freeze the account.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AceError::SignatureInvalid { .. } => ErrorKind::Signature,
            AceError::StateHashMismatch | AceError::RetriesExhausted => ErrorKind::Integrity,
            AceError::InvalidHeight { .. }
            | AceError::InvalidTransaction { .. }
            | AceError::ProposalInFlight
            | AceError::UnexpectedPhase
            | AceError::NoWorkspace
            | AceError::WorkspaceVersionMismatch { .. }
            | AceError::WorkspaceNotReady
            | AceError::UnknownAccount => ErrorKind::Validation,
            AceError::EventBusError(_) => ErrorKind::Consensus,
        }
    }
}

pub type AceResult<T> = Result<T, AceError>;
