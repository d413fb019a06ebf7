//! Pure effects of the `EntityTx` variants that only touch this entity's own
//! state (spec §4.3): reserves, the draft batch, and the gossip profile.
//! Everything else (`openAccount`, account-delegated txs, `settle_*`,
//! dispute txs, `j_*`) needs to reach into `xln-ace`/`xln-settlement`/
//! `xln-jbp` state and is handled by the service layer instead.

use super::entity_state::EntityState;
use super::error::{ErmError, ErmResult};
use shared_types::{
    Amount, CollateralToReserveOp, EntityId, Profile, ReserveToCollateralOp, ReserveToReserveOp,
    TokenId,
};

pub fn deposit_collateral(
    state: &mut EntityState,
    counterparty: EntityId,
    token: TokenId,
    amount: Amount,
) -> ErmResult<()> {
    let available = state.reserve_of(token);
    if available < amount {
        return Err(ErmError::InsufficientReserve {
            token,
            available: available.to_string(),
            required: amount.to_string(),
        });
    }
    state.set_reserve(token, &available - &amount);
    state.batch.reserve_to_collateral.push(ReserveToCollateralOp {
        counterparty,
        token,
        amount,
    });
    Ok(())
}

/// Withdrawal requests don't debit the reserve up front: the collateral is
/// still backing the account until the jurisdiction confirms the batch
/// (spec §4.4), at which point reconciliation credits the reserve.
pub fn request_withdrawal(
    state: &mut EntityState,
    counterparty: EntityId,
    token: TokenId,
    amount: Amount,
) -> ErmResult<()> {
    state.batch.collateral_to_reserve.push(CollateralToReserveOp {
        counterparty,
        token,
        amount,
    });
    Ok(())
}

pub fn reserve_to_reserve(
    state: &mut EntityState,
    to_entity: EntityId,
    token: TokenId,
    amount: Amount,
) -> ErmResult<()> {
    let available = state.reserve_of(token);
    if available < amount {
        return Err(ErmError::InsufficientReserve {
            token,
            available: available.to_string(),
            required: amount.to_string(),
        });
    }
    state.set_reserve(token, &available - &amount);
    state.batch.reserve_to_reserve.push(ReserveToReserveOp { to_entity, token, amount });
    Ok(())
}

pub fn profile_update(state: &mut EntityState, profile: Profile) {
    state.profile = profile;
}
