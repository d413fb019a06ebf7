//! The per-account phase state machine (spec §4.1 "State machine").

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountPhase {
    Idle,
    ProposingLocal,
    AwaitingAck,
    AwaitingFinalize,
    Disputed,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEvent {
    LocalTxQueued,
    ProposalReceived,
    AckReceived,
    FinalizeReceived,
    DisputeOpened,
    DisputeFinalized,
    CloseAgreed,
}

impl AccountPhase {
    /// The legal next phase for `(self, event)`, or `None` if the event is
    /// not valid in this phase and must be rejected or queued by the caller.
    pub fn next(self, event: AccountEvent) -> Option<AccountPhase> {
        use AccountEvent::*;
        use AccountPhase::*;
        match (self, event) {
            (Closed, _) => None,
            (_, DisputeOpened) => Some(Disputed),
            (Disputed, DisputeFinalized) => Some(Closed),
            (Disputed, _) => None,
            (Idle, LocalTxQueued) => Some(ProposingLocal),
            (Idle, ProposalReceived) => Some(AwaitingFinalize),
            (ProposingLocal, ProposalReceived) => Some(AwaitingFinalize),
            (ProposingLocal, LocalTxQueued) => Some(ProposingLocal),
            (AwaitingFinalize, AckReceived) => Some(Idle),
            (AwaitingAck, AckReceived) => Some(Idle),
            (AwaitingAck, ProposalReceived) => Some(AwaitingFinalize),
            (AwaitingFinalize, FinalizeReceived) => Some(Idle),
            (_, CloseAgreed) => Some(Closed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AccountPhase::Closed)
    }
}
