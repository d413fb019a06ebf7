//! Entity-scope transactions (spec §4.3).

use crate::account_tx::{AccountTx, Side};
use crate::amount::Amount;
use crate::ids::{EntityId, TokenId};
use crate::settlement::SettleOp;
use serde::{Deserialize, Serialize};

/// A fee urgency preset resolved against an adapter-suggested base fee
/// (spec §4.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeePreset {
    Standard,
    Fast,
    Urgent,
    Custom {
        max_fee_per_gas: Amount,
        max_priority_fee_per_gas: Amount,
    },
}

impl FeePreset {
    /// The multiplier applied to the adapter-suggested base fee (spec §4.4:
    /// `{1.0x, 1.2x, 1.5x}`), expressed as basis points to stay integer-only.
    pub fn multiplier_bps(&self) -> Option<u32> {
        match self {
            FeePreset::Standard => Some(10_000),
            FeePreset::Fast => Some(12_000),
            FeePreset::Urgent => Some(15_000),
            FeePreset::Custom { .. } => None,
        }
    }
}

/// A rebalancing policy hint attached to `openAccount` (left free-form for
/// the embedding application; the core does not interpret it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalancePolicy {
    pub target_collateral_ratio_bps: u32,
}

/// A gossip profile card (spec §4.3 `profile-update`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Profile {
    pub display_name: String,
    pub hubs: Vec<EntityId>,
}

/// Transactions that advance an entity's replicated state (spec §4.3,
/// "subset that matters for the core").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityTx {
    OpenAccount {
        target_entity_id: EntityId,
        credit_amount: Option<Amount>,
        token_id: Option<TokenId>,
        rebalance_policy: Option<RebalancePolicy>,
    },
    DirectPayment {
        counterparty: EntityId,
        token: TokenId,
        amount: Amount,
        description: String,
    },
    ExtendCredit {
        counterparty: EntityId,
        token: TokenId,
        side: Side,
        amount: Amount,
    },
    SetCreditLimit {
        counterparty: EntityId,
        token: TokenId,
        side: Side,
        amount: Amount,
    },
    DepositCollateral {
        counterparty: EntityId,
        token: TokenId,
        amount: Amount,
    },
    RequestWithdrawal {
        counterparty: EntityId,
        token: TokenId,
        amount: Amount,
    },
    ReserveToReserve {
        to_entity: EntityId,
        token: TokenId,
        amount: Amount,
    },
    SettlePropose {
        counterparty: EntityId,
        ops: Vec<SettleOp>,
        memo: String,
    },
    SettleUpdate {
        counterparty: EntityId,
        ops: Vec<SettleOp>,
        memo: String,
    },
    SettleApprove {
        counterparty: EntityId,
    },
    SettleExecute {
        counterparty: EntityId,
    },
    SettleReject {
        counterparty: EntityId,
    },
    DisputeStart {
        counterparty: EntityId,
    },
    DisputeFinalize {
        counterparty: EntityId,
    },
    JBroadcast {
        fee_override: Option<FeePreset>,
    },
    JRebroadcast {
        gas_bump_bps: u32,
    },
    JClearBatch {
        reason: String,
    },
    ProfileUpdate {
        profile: Profile,
    },
    /// Local-mempool queueing of an account transaction, used by ERM to
    /// forward `direct_payment`/`extendCredit`/`set_credit_limit` and the
    /// lock/swap family down to the named account (spec §4.3).
    AccountTxQueued {
        counterparty: EntityId,
        tx: AccountTx,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_preset_multipliers_match_spec() {
        assert_eq!(FeePreset::Standard.multiplier_bps(), Some(10_000));
        assert_eq!(FeePreset::Fast.multiplier_bps(), Some(12_000));
        assert_eq!(FeePreset::Urgent.multiplier_bps(), Some(15_000));
    }

    #[test]
    fn custom_preset_has_no_multiplier() {
        let custom = FeePreset::Custom {
            max_fee_per_gas: Amount::from(1i64),
            max_priority_fee_per_gas: Amount::from(1i64),
        };
        assert_eq!(custom.multiplier_bps(), None);
    }
}
