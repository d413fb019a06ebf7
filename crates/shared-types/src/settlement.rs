//! Settlement workspace operations and their compiled form (spec §3.5, §4.2).
//!
//! These types are shared between `xln-settlement` (which owns the
//! workspace lifecycle state machine) and `xln-ace` (whose `account_settle`
//! transaction carries a [`CompiledDiff`] per token).

use crate::amount::Amount;
use crate::canonical::CanonicalEncode;
use crate::ids::{Signature, TokenId};
use serde::{Deserialize, Serialize};

/// A single settlement-workspace operation (spec §4.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettleOp {
    /// Reserve-to-collateral, executed by the proposer.
    R2c { token: TokenId, amount: Amount },
    /// Collateral-to-reserve, the inverse of `R2c`.
    C2r { token: TokenId, amount: Amount },
    /// Reserve-to-reserve transfer between the two entities; registered as a
    /// jurisdiction-side op, no local delta/collateral change.
    R2r { token: TokenId, amount: Amount },
    /// Zero out the credit segments the proposer is owed on `token`.
    Forgive { token: TokenId },
    /// Direct delta surgery for admin/dispute replay. Cannot be introduced
    /// by ordinary UI-driven edits (spec §4.2).
    RawDiff {
        token: TokenId,
        left_diff: Amount,
        right_diff: Amount,
        collateral_diff: Amount,
        ondelta_diff: Amount,
    },
}

impl CanonicalEncode for SettleOp {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        match self {
            SettleOp::R2c { token, amount } => {
                out.push(0);
                token.0.canonical_encode(out);
                out.extend_from_slice(&amount.canonical_bytes());
            }
            SettleOp::C2r { token, amount } => {
                out.push(1);
                token.0.canonical_encode(out);
                out.extend_from_slice(&amount.canonical_bytes());
            }
            SettleOp::R2r { token, amount } => {
                out.push(2);
                token.0.canonical_encode(out);
                out.extend_from_slice(&amount.canonical_bytes());
            }
            SettleOp::Forgive { token } => {
                out.push(3);
                token.0.canonical_encode(out);
            }
            SettleOp::RawDiff {
                token,
                left_diff,
                right_diff,
                collateral_diff,
                ondelta_diff,
            } => {
                out.push(4);
                token.0.canonical_encode(out);
                out.extend_from_slice(&left_diff.canonical_bytes());
                out.extend_from_slice(&right_diff.canonical_bytes());
                out.extend_from_slice(&collateral_diff.canonical_bytes());
                out.extend_from_slice(&ondelta_diff.canonical_bytes());
            }
        }
    }
}

impl SettleOp {
    pub fn token(&self) -> TokenId {
        match self {
            SettleOp::R2c { token, .. }
            | SettleOp::C2r { token, .. }
            | SettleOp::R2r { token, .. }
            | SettleOp::Forgive { token }
            | SettleOp::RawDiff { token, .. } => *token,
        }
    }

    /// `rawDiff` cannot originate from an ordinary UI edit (spec §4.2); this
    /// flags ops that `settle_update` must strip from attacker- or
    /// UI-supplied input.
    pub fn is_raw_diff(&self) -> bool {
        matches!(self, SettleOp::RawDiff { .. })
    }
}

/// The canonical per-token reduction of a workspace's ops (spec §3.5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledDiff {
    pub token: TokenId,
    pub left_diff: Amount,
    pub right_diff: Amount,
    pub collateral_diff: Amount,
    pub ondelta_diff: Amount,
    /// Set when a `Forgive` op targeted this token. The clamp itself can't
    /// be precomputed here: it depends on the live delta (collateral split,
    /// credit used) at apply time, which `compile_ops` has no access to.
    /// Both replicas apply the same agreed-upon frame against the same
    /// prior delta state, so recomputing it in `apply_account_settle`
    /// stays deterministic (spec testable property 1).
    pub forgive: bool,
}

impl CompiledDiff {
    pub fn zero(token: TokenId) -> Self {
        CompiledDiff {
            token,
            left_diff: Amount::zero(),
            right_diff: Amount::zero(),
            collateral_diff: Amount::zero(),
            ondelta_diff: Amount::zero(),
            forgive: false,
        }
    }
}

impl CanonicalEncode for CompiledDiff {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        self.token.0.canonical_encode(out);
        out.extend_from_slice(&self.left_diff.canonical_bytes());
        out.extend_from_slice(&self.right_diff.canonical_bytes());
        out.extend_from_slice(&self.collateral_diff.canonical_bytes());
        out.extend_from_slice(&self.ondelta_diff.canonical_bytes());
        self.forgive.canonical_encode(out);
    }
}

/// Pure function: reduces an ordered op list into a per-token diff table,
/// sorted by token id for canonical encoding (spec §4.2: `compile`).
pub fn compile_ops(ops: &[SettleOp], proposer_is_left: bool) -> Vec<CompiledDiff> {
    use std::collections::BTreeMap;
    let mut by_token: BTreeMap<TokenId, CompiledDiff> = BTreeMap::new();

    for op in ops {
        let entry = by_token
            .entry(op.token())
            .or_insert_with(|| CompiledDiff::zero(op.token()));
        match op {
            SettleOp::R2c { amount, .. } => {
                entry.collateral_diff = &entry.collateral_diff + amount;
                if proposer_is_left {
                    entry.ondelta_diff = &entry.ondelta_diff + amount;
                } else {
                    entry.ondelta_diff = &entry.ondelta_diff - amount;
                }
            }
            SettleOp::C2r { amount, .. } => {
                entry.collateral_diff = &entry.collateral_diff - amount;
                if proposer_is_left {
                    entry.ondelta_diff = &entry.ondelta_diff - amount;
                } else {
                    entry.ondelta_diff = &entry.ondelta_diff + amount;
                }
            }
            SettleOp::R2r { .. } => {
                // No delta/collateral change locally; the jurisdiction-side
                // op is tracked separately in the JBP draft batch.
            }
            SettleOp::Forgive { .. } => {
                // `forgive` clamps the proposer's own used credit for this
                // token, not collateral/ondelta; the clamp amount depends on
                // the live delta and is computed in `apply_account_settle`
                // against it, not here.
                entry.forgive = true;
            }
            SettleOp::RawDiff {
                left_diff,
                right_diff,
                collateral_diff,
                ondelta_diff,
                ..
            } => {
                entry.left_diff = &entry.left_diff + left_diff;
                entry.right_diff = &entry.right_diff + right_diff;
                entry.collateral_diff = &entry.collateral_diff + collateral_diff;
                entry.ondelta_diff = &entry.ondelta_diff + ondelta_diff;
            }
        }
    }

    by_token.into_values().collect()
}

/// Canonically encodes a list of compiled diffs, sorting by token id first
/// so the encoding never depends on the caller's ordering.
pub fn canonical_encode_diffs(diffs: &[CompiledDiff], out: &mut Vec<u8>) {
    let mut sorted: Vec<&CompiledDiff> = diffs.iter().collect();
    sorted.sort_by_key(|d| d.token);
    (sorted.len() as u32).canonical_encode(out);
    for d in sorted {
        d.canonical_encode(out);
    }
}

impl CanonicalEncode for TokenId {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        self.0.canonical_encode(out);
    }
}

/// Lifecycle states of a settlement workspace (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkspaceStatus {
    Draft,
    AwaitingCounterparty,
    ReadyToSubmit,
    Submitted,
    Cancelled,
}

/// Bilateral settlement negotiation state held on `AccountMachine` (spec
/// §3.5). Mutated only by `settle_propose`/`settle_update`/`settle_approve`/
/// `settle_execute`/`settle_reject`; never constructed with `compiled_diffs`
/// populated ahead of a `settle_update` recompile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementWorkspace {
    pub version: u32,
    /// True if `ops` was last written by the left entity.
    pub last_modified_by_left: bool,
    /// Set once both sides have signed and `settle_execute` names who
    /// submits to the jurisdiction.
    pub executor_is_left: Option<bool>,
    pub status: WorkspaceStatus,
    pub ops: Vec<SettleOp>,
    pub compiled_diffs: Vec<CompiledDiff>,
    pub memo: String,
    pub left_hanko: Option<Signature>,
    pub right_hanko: Option<Signature>,
    /// Wall-clock stamps, used only to flag a stale proposal (spec §4.2
    /// "Failure semantics"); never part of the canonical encoding, since
    /// the two sides would otherwise never agree on a hash.
    pub created_at_ms: u64,
    pub last_modified_at_ms: u64,
}

impl SettlementWorkspace {
    /// A fresh workspace opened by `settle_propose` (spec §4.2).
    pub fn new(proposer_is_left: bool, ops: Vec<SettleOp>, memo: String, now_ms: u64) -> Self {
        let compiled_diffs = compile_ops(&ops, proposer_is_left);
        SettlementWorkspace {
            version: 0,
            last_modified_by_left: proposer_is_left,
            executor_is_left: None,
            status: WorkspaceStatus::AwaitingCounterparty,
            ops,
            compiled_diffs,
            memo,
            left_hanko: None,
            right_hanko: None,
            created_at_ms: now_ms,
            last_modified_at_ms: now_ms,
        }
    }

    pub fn is_signed_by_both(&self) -> bool {
        self.left_hanko.is_some() && self.right_hanko.is_some()
    }

    /// Default proposal timeout named in spec §4.2: a workspace that has not
    /// progressed in 60s wall clock is flagged as stale, but not cancelled.
    pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

    pub fn is_stale(&self, now_ms: u64, timeout_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_modified_at_ms) >= timeout_ms
    }
}

impl CanonicalEncode for SettlementWorkspace {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        self.version.canonical_encode(out);
        self.last_modified_by_left.canonical_encode(out);
        canonical_encode_diffs(&self.compiled_diffs, out);
        self.memo.canonical_encode(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_r2c_moves_reserve_to_collateral_and_ondelta() {
        let ops = vec![SettleOp::R2c {
            token: TokenId(1),
            amount: Amount::from(500i64),
        }];
        let diffs = compile_ops(&ops, true);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].collateral_diff, Amount::from(500i64));
        assert_eq!(diffs[0].ondelta_diff, Amount::from(500i64));
    }

    #[test]
    fn compile_r2c_ondelta_sign_depends_on_proposer_side() {
        let ops = vec![SettleOp::R2c {
            token: TokenId(1),
            amount: Amount::from(500i64),
        }];
        let as_right = compile_ops(&ops, false);
        assert_eq!(as_right[0].ondelta_diff, Amount::from(-500i64));
    }

    #[test]
    fn compile_c2r_is_inverse_of_r2c() {
        let r2c = compile_ops(
            &[SettleOp::R2c {
                token: TokenId(1),
                amount: Amount::from(100i64),
            }],
            true,
        );
        let c2r = compile_ops(
            &[SettleOp::C2r {
                token: TokenId(1),
                amount: Amount::from(100i64),
            }],
            true,
        );
        assert_eq!(r2c[0].collateral_diff, -c2r[0].collateral_diff.clone());
        assert_eq!(r2c[0].ondelta_diff, -c2r[0].ondelta_diff.clone());
    }

    #[test]
    fn compile_forgive_flags_the_token_without_touching_diffs() {
        let ops = vec![SettleOp::Forgive { token: TokenId(1) }];
        let diffs = compile_ops(&ops, true);
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].forgive);
        assert!(diffs[0].collateral_diff.is_zero());
        assert!(diffs[0].ondelta_diff.is_zero());
    }

    #[test]
    fn compile_is_sorted_by_token_for_determinism() {
        let ops = vec![
            SettleOp::R2c {
                token: TokenId(3),
                amount: Amount::from(1i64),
            },
            SettleOp::R2c {
                token: TokenId(1),
                amount: Amount::from(1i64),
            },
        ];
        let diffs = compile_ops(&ops, true);
        assert_eq!(diffs[0].token, TokenId(1));
        assert_eq!(diffs[1].token, TokenId(3));
    }

    #[test]
    fn new_workspace_starts_awaiting_counterparty_unsigned() {
        let ws = SettlementWorkspace::new(
            true,
            vec![SettleOp::R2c {
                token: TokenId(1),
                amount: Amount::from(10i64),
            }],
            "test".to_string(),
            1_000,
        );
        assert_eq!(ws.status, WorkspaceStatus::AwaitingCounterparty);
        assert!(!ws.is_signed_by_both());
        assert_eq!(ws.compiled_diffs.len(), 1);
    }
}
