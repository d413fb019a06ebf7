//! Account-scope transactions (spec §4.1) and the lock/swap books they
//! mutate.

use crate::amount::Amount;
use crate::canonical::CanonicalEncode;
use crate::ids::{Hash, TokenId};
use crate::settlement::{canonical_encode_diffs, CompiledDiff};
use serde::{Deserialize, Serialize};

/// Which side of the pair a `set_credit_limit` or lock direction applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl CanonicalEncode for Side {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        out.push(match self {
            Side::Left => 0,
            Side::Right => 1,
        });
    }
}

/// Opaque identifier for an HTLC in the lock book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LockId(pub u64);

/// Opaque identifier for a swap offer in the swap book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OfferId(pub u64);

/// Which side originated an HTLC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockDirection {
    LeftToRight,
    RightToLeft,
}

/// A hashlocked, time-bounded conditional claim on part of an account's
/// delta (spec glossary: HTLC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Htlc {
    pub direction: LockDirection,
    pub amount: Amount,
    pub token: TokenId,
    pub hash: Hash,
    /// Expiry height in the jurisdiction's block numbering.
    pub expiry: u64,
}

/// A standing offer in the per-account swap book (spec §3.4). Cross-account
/// matching is out of scope (spec §1 Non-goals); only per-account placement
/// is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOffer {
    pub give_token: TokenId,
    pub give_amount: Amount,
    pub want_token: TokenId,
    pub want_amount: Amount,
    /// Minimum acceptable fill ratio, expressed as basis points of the
    /// requested `want_amount`.
    pub min_fill_ratio_bps: u32,
}

/// Transactions that advance a bilateral account (spec §4.1 table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountTx {
    DirectPayment {
        token: TokenId,
        amount: Amount,
        description: String,
    },
    SetCreditLimit {
        token: TokenId,
        side: Side,
        amount: Amount,
    },
    AddDelta {
        token: TokenId,
        delta: Amount,
    },
    AccountSettle {
        workspace_version: u32,
        compiled_diffs: Vec<CompiledDiff>,
    },
    LockOpen {
        lock_id: LockId,
        htlc: Htlc,
    },
    LockReveal {
        lock_id: LockId,
        preimage: Vec<u8>,
    },
    LockCancel {
        lock_id: LockId,
    },
    SwapPlace {
        offer_id: OfferId,
        offer: SwapOffer,
    },
    SwapFill {
        offer_id: OfferId,
        fill_amount: Amount,
    },
    SwapCancel {
        offer_id: OfferId,
    },
}

impl CanonicalEncode for AccountTx {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        match self {
            AccountTx::DirectPayment {
                token,
                amount,
                description,
            } => {
                out.push(0);
                token.0.canonical_encode(out);
                out.extend_from_slice(&amount.canonical_bytes());
                description.canonical_encode(out);
            }
            AccountTx::SetCreditLimit { token, side, amount } => {
                out.push(1);
                token.0.canonical_encode(out);
                side.canonical_encode(out);
                out.extend_from_slice(&amount.canonical_bytes());
            }
            AccountTx::AddDelta { token, delta } => {
                out.push(2);
                token.0.canonical_encode(out);
                out.extend_from_slice(&delta.canonical_bytes());
            }
            AccountTx::AccountSettle {
                workspace_version,
                compiled_diffs,
            } => {
                out.push(3);
                workspace_version.canonical_encode(out);
                canonical_encode_diffs(compiled_diffs, out);
            }
            AccountTx::LockOpen { lock_id, htlc } => {
                out.push(4);
                lock_id.0.canonical_encode(out);
                htlc.token.0.canonical_encode(out);
                out.extend_from_slice(&htlc.amount.canonical_bytes());
                htlc.hash.canonical_encode(out);
                htlc.expiry.canonical_encode(out);
            }
            AccountTx::LockReveal { lock_id, preimage } => {
                out.push(5);
                lock_id.0.canonical_encode(out);
                (preimage.len() as u32).canonical_encode(out);
                out.extend_from_slice(preimage);
            }
            AccountTx::LockCancel { lock_id } => {
                out.push(6);
                lock_id.0.canonical_encode(out);
            }
            AccountTx::SwapPlace { offer_id, offer } => {
                out.push(7);
                offer_id.0.canonical_encode(out);
                offer.give_token.0.canonical_encode(out);
                out.extend_from_slice(&offer.give_amount.canonical_bytes());
                offer.want_token.0.canonical_encode(out);
                out.extend_from_slice(&offer.want_amount.canonical_bytes());
                offer.min_fill_ratio_bps.canonical_encode(out);
            }
            AccountTx::SwapFill {
                offer_id,
                fill_amount,
            } => {
                out.push(8);
                offer_id.0.canonical_encode(out);
                out.extend_from_slice(&fill_amount.canonical_bytes());
            }
            AccountTx::SwapCancel { offer_id } => {
                out.push(9);
                offer_id.0.canonical_encode(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_encoding_distinguishes_variants() {
        let a = AccountTx::DirectPayment {
            token: TokenId(1),
            amount: Amount::from(10i64),
            description: "coffee".into(),
        };
        let b = AccountTx::AddDelta {
            token: TokenId(1),
            delta: Amount::from(10i64),
        };
        assert_ne!(a.canonical_bytes(), b.canonical_bytes());
    }

    #[test]
    fn canonical_encoding_is_deterministic() {
        let a = AccountTx::SetCreditLimit {
            token: TokenId(2),
            side: Side::Left,
            amount: Amount::from(500i64),
        };
        assert_eq!(a.canonical_bytes(), a.canonical_bytes());
    }
}
