//! Wire messages exchanged between entity instances (spec §6.4) and the
//! runtime ingress/egress surface (spec §6.2).

use crate::account_tx::AccountTx;
use crate::entity_tx::EntityTx;
use crate::ids::{AccountPair, EntityId, Hanko, Hash, Signature, SignerId};
use serde::{Deserialize, Serialize};

/// The proposer's candidate frame for the counterparty to replay and ack
/// (spec §4.1 step 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFrameProposal {
    pub pair: AccountPair,
    pub height: u64,
    pub timestamp: u64,
    pub account_txs: Vec<AccountTx>,
    pub state_hash: Hash,
    pub proposer_sig: Signature,
}

/// The counterparty's co-signature over a matching `state_hash`
/// (spec §4.1 step 2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFrameAck {
    pub pair: AccountPair,
    pub height: u64,
    pub state_hash: Hash,
    pub ack_sig: Signature,
}

/// Sent instead of an ack when the counterparty cannot or will not sign
/// (spec §4.1 "Failure semantics").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFrameNak {
    pub pair: AccountPair,
    pub height: u64,
    pub reason: String,
}

/// The proposer's combined hanko, distributed after both signatures are
/// collected (spec §4.1 step 3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFrameFinalize {
    pub pair: AccountPair,
    pub height: u64,
    pub hanko: Hanko,
}

/// Proposes, updates, or echoes a settlement workspace snapshot to the
/// counterparty (spec §6.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleIntent {
    pub pair: AccountPair,
    pub workspace_version: u32,
    pub sender_sig: Signature,
}

/// Any wire message exchanged between two entity instances. Every message
/// is addressed by unordered pair and carries the sender's claimed role;
/// receivers reject messages whose claimed role disagrees with the
/// canonical `is_left` rule (spec §6.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountInput {
    Proposal(AccountFrameProposal),
    Ack(AccountFrameAck),
    Nak(AccountFrameNak),
    Finalize(AccountFrameFinalize),
    Settle(SettleIntent),
}

impl AccountInput {
    pub fn pair(&self) -> AccountPair {
        match self {
            AccountInput::Proposal(m) => m.pair,
            AccountInput::Ack(m) => m.pair,
            AccountInput::Nak(m) => m.pair,
            AccountInput::Finalize(m) => m.pair,
            AccountInput::Settle(m) => m.pair,
        }
    }
}

/// One signer's batch of entity transactions, as submitted through ingress
/// (spec §6.2 `enqueueRuntimeInput`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInput {
    pub entity_id: EntityId,
    pub signer_id: SignerId,
    pub entity_txs: Vec<EntityTx>,
}

/// A tick's worth of ingress: entity-scope transactions plus any runtime-
/// level control transactions (currently none are specified beyond entity
/// inputs; the field is kept for forward compatibility with scheduler
/// control messages).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RuntimeInput {
    pub entity_inputs: Vec<EntityInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_input_pair_dispatch() {
        let pair = AccountPair::new(EntityId([1; 32]), EntityId([2; 32]));
        let msg = AccountInput::Nak(AccountFrameNak {
            pair,
            height: 1,
            reason: "bad hash".into(),
        });
        assert_eq!(msg.pair(), pair);
    }
}
