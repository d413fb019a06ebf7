//! Error taxonomy for this crate (spec §7). Wraps the domain crates'
//! per-operation errors under one type so ingress handlers have a single
//! `Result` to return without caring which crate rejected the input.

use shared_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no host registered for entity {0:?}")]
    UnknownEntity(shared_types::EntityId),
    #[error("entity rejected input: {0}")]
    Entity(#[from] xln_erm::ErmError),
    #[error("account consensus rejected input: {0}")]
    Ace(#[from] xln_ace::AceError),
    #[error("jurisdiction pipeline rejected input: {0}")]
    Jbp(#[from] xln_jbp::JbpError),
}

impl RuntimeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::UnknownEntity(_) => ErrorKind::Validation,
            RuntimeError::Entity(e) => e.kind(),
            RuntimeError::Ace(e) => e.kind(),
            RuntimeError::Jbp(e) => e.kind(),
        }
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
