//! Shared error taxonomy (spec §7).
//!
//! Each crate defines its own `thiserror`-derived error enum scoped to its
//! responsibility; this module fixes the cross-cutting classification so
//! logs and UI-facing failure states agree on what *kind* of failure
//! occurred.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five error kinds named in spec §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Invalid tx, negative capacity, unknown token, version skew: rejected
    /// locally, never surfaced as a hash mismatch.
    Validation,
    /// Bad signature, role mismatch: rejected at message ingress.
    Signature,
    /// Hash mismatch, timeout exhaustion: escalates to dispute.
    Consensus,
    /// Broadcast failure, nonce replayed.
    Jurisdiction,
    /// Corrupt stored state: fatal, refuse to start.
    Integrity,
}

impl ErrorKind {
    /// Integrity errors are the only kind that aborts the runtime
    /// (spec §7 propagation policy); everything else is recoverable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorKind::Integrity)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Signature => "signature",
            ErrorKind::Consensus => "consensus",
            ErrorKind::Jurisdiction => "jurisdiction",
            ErrorKind::Integrity => "integrity",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_integrity_is_fatal() {
        assert!(ErrorKind::Integrity.is_fatal());
        assert!(!ErrorKind::Validation.is_fatal());
        assert!(!ErrorKind::Consensus.is_fatal());
        assert!(!ErrorKind::Signature.is_fatal());
        assert!(!ErrorKind::Jurisdiction.is_fatal());
    }
}
