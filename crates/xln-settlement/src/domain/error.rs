//! Errors raised while advancing a settlement workspace's lifecycle.

use shared_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettleError {
    #[error("a settlement workspace is already open for this pair")]
    AlreadyOpen,
    #[error("no settlement workspace is open for this pair")]
    NoWorkspace,
    #[error("workspace is not in a state that accepts this transition (status {status:?})")]
    WrongState { status: shared_types::WorkspaceStatus },
    #[error("sender is not the side that last modified this workspace")]
    NotLastModifier,
    #[error("sender already countersigned this workspace")]
    AlreadySigned,
    #[error("sender is not the non-proposing counterparty")]
    NotCounterparty,
    #[error("sender is not the fixed executor for this workspace")]
    NotExecutor,
    #[error("workspace version mismatch: expected {expected}, got {got}")]
    VersionMismatch { expected: u32, got: u32 },
    #[error("rawDiff ops cannot be introduced by this caller")]
    RawDiffNotAllowed,
    #[error("workspace has no ops to propose")]
    EmptyOps,
}

impl SettleError {
    /// Every settlement-lifecycle error is locally recoverable: a stale or
    /// out-of-turn call is rejected and dropped, never escalated to a
    /// dispute (spec §4.2 "Failure semantics").
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

pub type SettleResult<T> = Result<T, SettleError>;
