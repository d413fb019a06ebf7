//! Outbound capabilities this crate needs from the chain-facing adapter
//! layer (spec §6.1 `JurisdictionAdapter`). Implemented by `xln-adapters`.

use crate::domain::{FeeData, FeeOverrides};
use async_trait::async_trait;
use shared_types::{Amount, EntityId, Signature, TokenId};
use std::time::{SystemTime, UNIX_EPOCH};

#[async_trait]
pub trait JurisdictionAdapter: Send + Sync {
    async fn block_number(&self) -> u64;

    async fn fee_data(&self) -> FeeData;

    /// Submits an encoded `processBatch` payload plus the signature over its
    /// `batchHash`, with the resolved fee overrides, returning the chain's
    /// transaction hash.
    async fn submit_process_batch(
        &self,
        payload: Vec<u8>,
        signature: Signature,
        fee_overrides: FeeOverrides,
    ) -> String;

    async fn erc20_balance(&self, token: TokenId, holder: EntityId) -> Amount;

    /// Moves external token balance into an entity's reserve, returning the
    /// chain's transaction hash.
    async fn external_token_to_reserve(
        &self,
        signer: shared_types::SignerId,
        entity: EntityId,
        token: TokenId,
        amount: Amount,
    ) -> String;
}

pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before epoch")
            .as_millis() as u64
    }
}
