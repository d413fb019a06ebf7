//! Outbound capabilities the settlement service needs from the account it
//! is layered over (spec §4.2, §6.1).

use async_trait::async_trait;
use shared_types::{AccountPair, AccountTx, Amount, SettlementWorkspace, TokenId};
use std::time::{SystemTime, UNIX_EPOCH};

/// Reads and writes the single workspace slot held on an `AccountMachine`,
/// and queues the `account_settle` tx that absorbs it once executed.
/// Implemented by an adapter over `xln-ace`'s `AceState`.
#[async_trait]
pub trait AccountGateway: Send + Sync {
    async fn workspace(&self, pair: AccountPair) -> Option<SettlementWorkspace>;
    async fn set_workspace(&self, pair: AccountPair, workspace: Option<SettlementWorkspace>);
    async fn queue_account_tx(&self, pair: AccountPair, tx: AccountTx);
}

/// Enqueues the jurisdiction-side half of an `r2r` op onto the entity's JBP
/// draft batch (spec §4.2 "settle_execute"). Implemented by `xln-jbp`.
#[async_trait]
pub trait JbpDraftSink: Send + Sync {
    async fn enqueue_reserve_to_reserve(&self, pair: AccountPair, token: TokenId, amount: Amount);
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
