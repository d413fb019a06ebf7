//! Pure settlement-workspace transition functions (spec §4.2 "Lifecycle
//! state machine"). None of these perform I/O or signing; callers supply an
//! already-computed [`Signature`] and apply the resulting workspace back
//! onto the owning `AccountMachine`.

use super::error::{SettleError, SettleResult};
use shared_types::{Signature, SettleOp, SettlementWorkspace, WorkspaceStatus};

/// `settle_propose`: only legal when no workspace exists yet for the pair
/// (enforced by the caller, which only calls this when
/// `AccountMachine::settlement_workspace` is `None`).
pub fn propose(
    ops: Vec<SettleOp>,
    memo: String,
    proposer_is_left: bool,
    proposer_sig: Signature,
    now_ms: u64,
) -> SettleResult<SettlementWorkspace> {
    if ops.is_empty() {
        return Err(SettleError::EmptyOps);
    }
    let mut ws = SettlementWorkspace::new(proposer_is_left, ops, memo, now_ms);
    set_hanko(&mut ws, proposer_is_left, proposer_sig);
    Ok(ws)
}

/// `settle_update`: only while `status ∈ {Draft, AwaitingCounterparty}`, the
/// sender is the side that last modified the workspace, and the
/// counterparty has not yet countersigned.
pub fn update(
    ws: &mut SettlementWorkspace,
    mut ops: Vec<SettleOp>,
    memo: String,
    sender_is_left: bool,
    sender_sig: Signature,
    now_ms: u64,
) -> SettleResult<()> {
    match ws.status {
        WorkspaceStatus::Draft | WorkspaceStatus::AwaitingCounterparty => {}
        other => return Err(SettleError::WrongState { status: other }),
    }
    if ws.last_modified_by_left != sender_is_left {
        return Err(SettleError::NotLastModifier);
    }
    if hanko_of(ws, !sender_is_left).is_some() {
        return Err(SettleError::AlreadySigned);
    }
    if ops.is_empty() {
        return Err(SettleError::EmptyOps);
    }
    // `rawDiff` cannot be introduced by an ordinary update (spec §4.2).
    let had_raw_diff = ops.iter().any(SettleOp::is_raw_diff);
    ops.retain(|op| !op.is_raw_diff());
    if had_raw_diff && ops.is_empty() {
        return Err(SettleError::RawDiffNotAllowed);
    }

    ws.compiled_diffs = shared_types::compile_ops(&ops, sender_is_left);
    ws.ops = ops;
    ws.version += 1;
    ws.last_modified_by_left = sender_is_left;
    ws.status = WorkspaceStatus::AwaitingCounterparty;
    ws.last_modified_at_ms = now_ms;
    clear_hankos(ws);
    set_hanko(ws, sender_is_left, sender_sig);
    Ok(())
}

/// `settle_approve`: only while `status = AwaitingCounterparty`, the sender
/// is the non-proposing side, and the sender has not already signed.
pub fn approve(
    ws: &mut SettlementWorkspace,
    sender_is_left: bool,
    sender_sig: Signature,
    now_ms: u64,
) -> SettleResult<()> {
    if ws.status != WorkspaceStatus::AwaitingCounterparty {
        return Err(SettleError::WrongState { status: ws.status });
    }
    if ws.last_modified_by_left == sender_is_left {
        return Err(SettleError::NotCounterparty);
    }
    if hanko_of(ws, sender_is_left).is_some() {
        return Err(SettleError::AlreadySigned);
    }
    set_hanko(ws, sender_is_left, sender_sig);
    ws.executor_is_left = Some(sender_is_left);
    ws.status = WorkspaceStatus::ReadyToSubmit;
    ws.last_modified_at_ms = now_ms;
    Ok(())
}

/// `settle_execute`: only while `status = ReadyToSubmit` and the sender is
/// the fixed executor. Returns the `account_settle` payload the caller
/// turns into an `AccountTx`, plus any `r2r` components that belong on the
/// JBP draft batch instead of on the account itself.
pub fn execute(
    ws: &mut SettlementWorkspace,
    sender_is_left: bool,
    now_ms: u64,
) -> SettleResult<(u32, Vec<shared_types::CompiledDiff>, Vec<(shared_types::TokenId, shared_types::Amount)>)> {
    if ws.status != WorkspaceStatus::ReadyToSubmit {
        return Err(SettleError::WrongState { status: ws.status });
    }
    if ws.executor_is_left != Some(sender_is_left) {
        return Err(SettleError::NotExecutor);
    }
    let r2r: Vec<(shared_types::TokenId, shared_types::Amount)> = ws
        .ops
        .iter()
        .filter_map(|op| match op {
            SettleOp::R2r { token, amount } => Some((*token, amount.clone())),
            _ => None,
        })
        .collect();
    ws.status = WorkspaceStatus::Submitted;
    ws.last_modified_at_ms = now_ms;
    Ok((ws.version, ws.compiled_diffs.clone(), r2r))
}

/// `settle_reject`: allowed in any non-terminal state by either side.
pub fn reject(ws: &SettlementWorkspace) -> SettleResult<()> {
    match ws.status {
        WorkspaceStatus::Submitted | WorkspaceStatus::Cancelled => {
            Err(SettleError::WrongState { status: ws.status })
        }
        _ => Ok(()),
    }
}

fn hanko_of(ws: &SettlementWorkspace, is_left: bool) -> &Option<Signature> {
    if is_left {
        &ws.left_hanko
    } else {
        &ws.right_hanko
    }
}

fn set_hanko(ws: &mut SettlementWorkspace, is_left: bool, sig: Signature) {
    if is_left {
        ws.left_hanko = Some(sig);
    } else {
        ws.right_hanko = Some(sig);
    }
}

fn clear_hankos(ws: &mut SettlementWorkspace) {
    ws.left_hanko = None;
    ws.right_hanko = None;
}
