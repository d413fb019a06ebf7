//! `AccountMachine`: per-pair bilateral account state and its `AccountTx`
//! application rules (spec §3.4, §4.1 "Transactions").

use super::error::{AceError, AceResult};
use super::state_machine::AccountPhase;
use shared_crypto::hashing::keccak256;
use shared_types::{
    AccountFrame, AccountPair, AccountTx, Amount, CompiledDiff, Delta, FrameHistory, Hanko, Htlc,
    LockDirection, LockId, OfferId, SettlementPayout, Side, SettlementWorkspace, SwapOffer, TokenId,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Healthy,
    Disputed,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDispute {
    pub dispute_timeout: u64,
    pub initial_nonce: u64,
    pub final_nonce: Option<u64>,
}

/// A resting swap offer together with the side that placed it.
/// `SwapOffer` itself carries no owner field, so the book has to remember
/// which side's capacity it debited against at `swap_place` time.
#[derive(Debug, Clone)]
pub struct PlacedOffer {
    pub owner_is_left: bool,
    pub offer: SwapOffer,
}

/// Per bilateral pair state (spec §3.4).
#[derive(Debug, Clone)]
pub struct AccountMachine {
    pub pair: AccountPair,
    pub mempool: Vec<AccountTx>,
    pub current_frame: AccountFrame,
    pub pending_frame: Option<AccountFrame>,
    pub pending_signatures: Vec<shared_types::Signature>,
    pub deltas: BTreeMap<TokenId, Delta>,
    pub frame_history: FrameHistory,
    pub lock_book: BTreeMap<LockId, Htlc>,
    pub swap_book: BTreeMap<OfferId, PlacedOffer>,
    pub settlement_workspace: Option<SettlementWorkspace>,
    pub status: AccountStatus,
    pub active_dispute: Option<ActiveDispute>,
    pub last_finalized_j_height: u64,
    pub hanko_signature: Option<Hanko>,
    pub phase: AccountPhase,
    /// Consecutive hash-mismatch retries since the last successful finalize
    /// (spec §4.1 "Failure semantics").
    pub retry_count: u32,
    /// Set when a non-cooperative dispute close derives final payouts from
    /// the last known frame (spec §4.1 "Dispute resolution"); `None` until
    /// then, and for accounts that close cooperatively.
    pub settlement_outputs: Option<Vec<SettlementPayout>>,
}

impl AccountMachine {
    pub fn new(pair: AccountPair) -> Self {
        AccountMachine {
            pair,
            mempool: Vec::new(),
            current_frame: genesis_frame(pair),
            pending_frame: None,
            pending_signatures: Vec::new(),
            deltas: BTreeMap::new(),
            frame_history: FrameHistory::default(),
            lock_book: BTreeMap::new(),
            swap_book: BTreeMap::new(),
            settlement_workspace: None,
            status: AccountStatus::Healthy,
            active_dispute: None,
            last_finalized_j_height: 0,
            hanko_signature: None,
            phase: AccountPhase::Idle,
            retry_count: 0,
            settlement_outputs: None,
        }
    }

    pub fn is_left(&self, me: &shared_types::EntityId) -> bool {
        self.pair.is_left(me)
    }

    /// Removes the txs a finalized frame included from the local mempool.
    /// Matches by content against the mempool's own prefix rather than
    /// draining by count: the finalized `account_txs` came from whichever
    /// side proposed, which may not be this machine's own queue (the
    /// counterparty's locally-queued txs are untouched and stay pending for
    /// a later frame instead of being discarded alongside someone else's).
    pub fn drain_included(&mut self, included: &[AccountTx]) {
        let mut matched = 0;
        for (local, sent) in self.mempool.iter().zip(included.iter()) {
            if local == sent {
                matched += 1;
            } else {
                break;
            }
        }
        self.mempool.drain(0..matched);
    }

    /// Derives the collateral-backed payout per token from the last known
    /// (finalized) frame's deltas and records it on the machine (spec §4.1
    /// "Dispute resolution": "if non-cooperative, produce settlement
    /// outputs according to last known frame"). Idempotent: calling it
    /// again on an already-closed account just recomputes the same split
    /// from the same frozen deltas.
    pub fn derive_settlement_outputs(&mut self) -> &[SettlementPayout] {
        let outputs: Vec<SettlementPayout> = self
            .deltas
            .values()
            .map(Delta::settlement_payout)
            .collect();
        self.settlement_outputs = Some(outputs);
        self.settlement_outputs.as_deref().unwrap()
    }

    /// The default proposer for the *next* frame: alternating policy, tied
    /// to `left` at height 1 (spec §4.1 "Role assignment").
    pub fn next_proposer_is_left(&self) -> bool {
        if self.current_frame.height == 0 {
            true
        } else {
            !self.current_frame.by_left
        }
    }

    fn delta_mut(&mut self, token: TokenId) -> &mut Delta {
        self.deltas.entry(token).or_insert_with(|| Delta::new(token))
    }

    /// Validates and applies one `AccountTx` against live state, in frame
    /// order (spec §4.1). `proposer_is_left` is the role of the frame's
    /// proposer, which orients `direct_payment` and `account_settle`.
    pub fn apply_tx(&mut self, tx: &AccountTx, proposer_is_left: bool) -> AceResult<()> {
        match tx {
            AccountTx::DirectPayment { token, amount, .. } => {
                self.apply_direct_payment(*token, amount, proposer_is_left)
            }
            AccountTx::SetCreditLimit { token, side, amount } => {
                self.apply_set_credit_limit(*token, *side, amount)
            }
            AccountTx::AddDelta { token, delta } => {
                self.delta_mut(*token).ondelta += delta.clone();
                Ok(())
            }
            AccountTx::AccountSettle {
                workspace_version,
                compiled_diffs,
            } => self.apply_account_settle(*workspace_version, compiled_diffs, proposer_is_left),
            AccountTx::LockOpen { lock_id, htlc } => {
                self.apply_lock_open(*lock_id, htlc, proposer_is_left)
            }
            AccountTx::LockReveal { lock_id, preimage } => {
                self.apply_lock_reveal(*lock_id, preimage, proposer_is_left)
            }
            AccountTx::LockCancel { lock_id } => self.apply_lock_cancel(*lock_id),
            AccountTx::SwapPlace { offer_id, offer } => {
                self.apply_swap_place(*offer_id, offer, proposer_is_left)
            }
            AccountTx::SwapFill {
                offer_id,
                fill_amount,
            } => self.apply_swap_fill(*offer_id, fill_amount),
            AccountTx::SwapCancel { offer_id } => self.apply_swap_cancel(*offer_id),
        }
    }

    fn apply_direct_payment(
        &mut self,
        token: TokenId,
        amount: &Amount,
        proposer_is_left: bool,
    ) -> AceResult<()> {
        if amount.is_negative() {
            return Err(AceError::InvalidTransaction {
                reason: "direct_payment amount must be non-negative".into(),
            });
        }
        let delta = self.delta_mut(token);
        let view = delta.derive(proposer_is_left);
        if *amount > view.out_capacity() {
            return Err(AceError::InvalidTransaction {
                reason: "direct_payment exceeds sender out_capacity".into(),
            });
        }
        if proposer_is_left {
            delta.offdelta -= amount.clone();
        } else {
            delta.offdelta += amount.clone();
        }
        Ok(())
    }

    fn apply_set_credit_limit(&mut self, token: TokenId, side: Side, amount: &Amount) -> AceResult<()> {
        if amount.is_negative() {
            return Err(AceError::InvalidTransaction {
                reason: "credit limit must be non-negative".into(),
            });
        }
        let delta = self.delta_mut(token);
        match side {
            Side::Left => delta.left_credit_limit = amount.clone(),
            Side::Right => delta.right_credit_limit = amount.clone(),
        }
        Ok(())
    }

    fn apply_account_settle(
        &mut self,
        workspace_version: u32,
        compiled_diffs: &[CompiledDiff],
        proposer_is_left: bool,
    ) -> AceResult<()> {
        match &self.settlement_workspace {
            Some(ws) if ws.version == workspace_version => {}
            Some(ws) => {
                return Err(AceError::WorkspaceVersionMismatch {
                    expected: ws.version,
                    got: workspace_version,
                })
            }
            None => return Err(AceError::NoWorkspace),
        }
        for diff in compiled_diffs {
            let delta = self.delta_mut(diff.token);
            let new_collateral = &delta.collateral + &diff.collateral_diff;
            if new_collateral.is_negative() {
                return Err(AceError::InvalidTransaction {
                    reason: "account_settle would drive collateral negative".into(),
                });
            }
            delta.collateral = new_collateral;
            delta.ondelta += diff.ondelta_diff.clone();
            delta.left_credit_limit += diff.left_diff.clone();
            delta.right_credit_limit += diff.right_diff.clone();
            if diff.forgive {
                self.forgive_own_credit(diff.token, proposer_is_left);
            }
        }
        self.settlement_workspace = None;
        Ok(())
    }

    /// Zeroes the proposer's own used credit for `token`: clamps `offdelta`
    /// toward `ondelta` just enough that the proposer's share of the claim
    /// is fully collateral-backed, leaving collateral and the counterparty's
    /// credit usage untouched. Computed against the live delta rather than
    /// at `compile_ops` time, since both sides apply this against identical
    /// prior state (spec testable property 1).
    fn forgive_own_credit(&mut self, token: TokenId, proposer_is_left: bool) {
        let delta = self.delta_mut(token);
        let view = delta.derive(proposer_is_left);
        if proposer_is_left {
            delta.offdelta += view.in_own_credit;
        } else {
            delta.offdelta -= view.in_own_credit;
        }
    }

    fn apply_lock_open(&mut self, lock_id: LockId, htlc: &Htlc, proposer_is_left: bool) -> AceResult<()> {
        if self.lock_book.contains_key(&lock_id) {
            return Err(AceError::InvalidTransaction {
                reason: "lock_id already open".into(),
            });
        }
        let locker_is_left = match htlc.direction {
            LockDirection::LeftToRight => true,
            LockDirection::RightToLeft => false,
        };
        if locker_is_left != proposer_is_left {
            return Err(AceError::InvalidTransaction {
                reason: "lock direction must originate from the proposer".into(),
            });
        }
        let view = self.delta_mut(htlc.token).derive(proposer_is_left);
        if htlc.amount > view.out_capacity() {
            return Err(AceError::InvalidTransaction {
                reason: "lock_open amount exceeds out_capacity".into(),
            });
        }
        self.lock_book.insert(lock_id, htlc.clone());
        Ok(())
    }

    fn apply_lock_reveal(
        &mut self,
        lock_id: LockId,
        preimage: &[u8],
        proposer_is_left: bool,
    ) -> AceResult<()> {
        let htlc = self
            .lock_book
            .get(&lock_id)
            .cloned()
            .ok_or_else(|| AceError::InvalidTransaction {
                reason: "lock_reveal references nonexistent lock".into(),
            })?;
        if keccak256(preimage) != htlc.hash {
            return Err(AceError::InvalidTransaction {
                reason: "preimage does not match lock hash".into(),
            });
        }
        let payer_is_left = match htlc.direction {
            LockDirection::LeftToRight => true,
            LockDirection::RightToLeft => false,
        };
        self.apply_direct_payment(htlc.token, &htlc.amount, payer_is_left)?;
        self.lock_book.remove(&lock_id);
        let _ = proposer_is_left;
        Ok(())
    }

    fn apply_lock_cancel(&mut self, lock_id: LockId) -> AceResult<()> {
        if self.lock_book.remove(&lock_id).is_none() {
            return Err(AceError::InvalidTransaction {
                reason: "lock_cancel references nonexistent lock".into(),
            });
        }
        Ok(())
    }

    fn apply_swap_place(
        &mut self,
        offer_id: OfferId,
        offer: &SwapOffer,
        proposer_is_left: bool,
    ) -> AceResult<()> {
        if self.swap_book.contains_key(&offer_id) {
            return Err(AceError::InvalidTransaction {
                reason: "offer_id already placed".into(),
            });
        }
        let view = self.delta_mut(offer.give_token).derive(proposer_is_left);
        if offer.give_amount > view.out_capacity() {
            return Err(AceError::InvalidTransaction {
                reason: "swap_place give_amount exceeds out_capacity".into(),
            });
        }
        self.swap_book.insert(
            offer_id,
            PlacedOffer {
                owner_is_left: proposer_is_left,
                offer: offer.clone(),
            },
        );
        Ok(())
    }

    fn apply_swap_fill(&mut self, offer_id: OfferId, fill_amount: &Amount) -> AceResult<()> {
        let placed = self
            .swap_book
            .get(&offer_id)
            .cloned()
            .ok_or_else(|| AceError::InvalidTransaction {
                reason: "swap_fill references nonexistent offer".into(),
            })?;
        let offer = &placed.offer;
        if *fill_amount > offer.want_amount {
            return Err(AceError::InvalidTransaction {
                reason: "swap_fill exceeds remaining want_amount".into(),
            });
        }
        let min_fill = offer.want_amount.clone() * Amount::from(offer.min_fill_ratio_bps as i64)
            / Amount::from(10_000i64);
        if *fill_amount < min_fill {
            return Err(AceError::InvalidTransaction {
                reason: "swap_fill below min_fill_ratio".into(),
            });
        }
        // Filler pays `give_token` to the offer owner and receives `want_token`
        // proportionally.
        let give_amount =
            offer.give_amount.clone() * fill_amount.clone() / offer.want_amount.clone();
        let owner_is_left = placed.owner_is_left;
        self.apply_direct_payment(offer.want_token, fill_amount, !owner_is_left)?;
        self.apply_direct_payment(offer.give_token, &give_amount, owner_is_left)?;

        if *fill_amount == offer.want_amount {
            self.swap_book.remove(&offer_id);
        } else if let Some(entry) = self.swap_book.get_mut(&offer_id) {
            entry.offer.want_amount = &entry.offer.want_amount - fill_amount;
            entry.offer.give_amount = &entry.offer.give_amount - &give_amount;
        }
        Ok(())
    }

    fn apply_swap_cancel(&mut self, offer_id: OfferId) -> AceResult<()> {
        if self.swap_book.remove(&offer_id).is_none() {
            return Err(AceError::InvalidTransaction {
                reason: "swap_cancel references nonexistent offer".into(),
            });
        }
        Ok(())
    }
}

fn genesis_frame(_pair: AccountPair) -> AccountFrame {
    AccountFrame {
        height: 0,
        timestamp: 0,
        account_txs: Vec::new(),
        token_ids: Vec::new(),
        by_left: false,
        state_hash: shared_types::GENESIS_HASH,
        prev_state_hash: shared_types::GENESIS_HASH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::EntityId;

    fn pair() -> AccountPair {
        AccountPair::new(EntityId([1; 32]), EntityId([2; 32]))
    }

    #[test]
    fn fresh_account_starts_idle_at_genesis() {
        let m = AccountMachine::new(pair());
        assert_eq!(m.current_frame.height, 0);
        assert_eq!(m.phase, AccountPhase::Idle);
        assert!(m.next_proposer_is_left());
    }

    #[test]
    fn direct_payment_shifts_offdelta_by_sender_side() {
        let mut m = AccountMachine::new(pair());
        m.deltas.insert(TokenId(1), {
            let mut d = Delta::new(TokenId(1));
            d.left_credit_limit = Amount::from(1_000i64);
            d.right_credit_limit = Amount::from(1_000i64);
            d
        });
        m.apply_tx(
            &AccountTx::DirectPayment {
                token: TokenId(1),
                amount: Amount::from(100i64),
                description: "x".into(),
            },
            true,
        )
        .unwrap();
        assert_eq!(m.deltas[&TokenId(1)].offdelta, Amount::from(-100i64));
    }

    #[test]
    fn direct_payment_over_capacity_is_rejected() {
        let mut m = AccountMachine::new(pair());
        let err = m
            .apply_tx(
                &AccountTx::DirectPayment {
                    token: TokenId(1),
                    amount: Amount::from(1i64),
                    description: "x".into(),
                },
                true,
            )
            .unwrap_err();
        assert!(matches!(err, AceError::InvalidTransaction { .. }));
    }

    #[test]
    fn forgive_clamps_offdelta_to_zero_proposer_own_credit_used() {
        let mut m = AccountMachine::new(pair());
        // left owes right 500, only 200 of it collateral-backed: left's own
        // credit used is 300.
        m.deltas.insert(TokenId(1), {
            let mut d = Delta::new(TokenId(1));
            d.collateral = Amount::from(200i64);
            d.offdelta = Amount::from(-500i64);
            d.left_credit_limit = Amount::from(1_000i64);
            d.right_credit_limit = Amount::from(1_000i64);
            d
        });
        m.settlement_workspace = Some(SettlementWorkspace::new(
            true,
            vec![shared_types::SettleOp::Forgive { token: TokenId(1) }],
            "forgive".into(),
            0,
        ));
        let diffs = m.settlement_workspace.as_ref().unwrap().compiled_diffs.clone();
        m.apply_tx(
            &AccountTx::AccountSettle {
                workspace_version: 0,
                compiled_diffs: diffs,
            },
            true,
        )
        .unwrap();
        let delta = &m.deltas[&TokenId(1)];
        assert_eq!(delta.net(), Amount::from(-200i64));
        assert_eq!(delta.collateral, Amount::from(200i64));
        let view = delta.derive(true);
        assert!(view.in_own_credit.is_zero());
    }

    #[test]
    fn derive_settlement_outputs_splits_by_collateral_backing() {
        let mut m = AccountMachine::new(pair());
        m.deltas.insert(TokenId(1), {
            let mut d = Delta::new(TokenId(1));
            d.collateral = Amount::from(300i64);
            d.offdelta = Amount::from(-500i64); // left owes right 500, only 300 backed
            d.left_credit_limit = Amount::from(1_000i64);
            d
        });
        let outputs = m.derive_settlement_outputs().to_vec();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].token, TokenId(1));
        assert_eq!(outputs[0].left_amount, Amount::zero());
        assert_eq!(outputs[0].right_amount, Amount::from(300i64));
        assert_eq!(m.settlement_outputs, Some(outputs));
    }

    #[test]
    fn lock_reveal_requires_matching_preimage() {
        let mut m = AccountMachine::new(pair());
        m.deltas.insert(TokenId(1), {
            let mut d = Delta::new(TokenId(1));
            d.left_credit_limit = Amount::from(1_000i64);
            d
        });
        let hash = keccak256(b"secret");
        m.apply_tx(
            &AccountTx::LockOpen {
                lock_id: LockId(1),
                htlc: Htlc {
                    direction: LockDirection::LeftToRight,
                    amount: Amount::from(50i64),
                    token: TokenId(1),
                    hash,
                    expiry: 100,
                },
            },
            true,
        )
        .unwrap();

        let err = m
            .apply_tx(
                &AccountTx::LockReveal {
                    lock_id: LockId(1),
                    preimage: b"wrong".to_vec(),
                },
                true,
            )
            .unwrap_err();
        assert!(matches!(err, AceError::InvalidTransaction { .. }));

        m.apply_tx(
            &AccountTx::LockReveal {
                lock_id: LockId(1),
                preimage: b"secret".to_vec(),
            },
            true,
        )
        .unwrap();
        assert!(!m.lock_book.contains_key(&LockId(1)));
    }
}
