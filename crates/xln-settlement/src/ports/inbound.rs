//! Inbound API the owning entity drives the workspace lifecycle through
//! (spec §4.2, forwarded from `ERM`'s `settle_propose/update/approve/
//! execute/reject` entity transactions).

use crate::domain::SettleResult;
use async_trait::async_trait;
use shared_types::{AccountPair, SettleOp};

#[async_trait]
pub trait SettlementApi: Send + Sync {
    async fn settle_propose(
        &self,
        pair: AccountPair,
        ops: Vec<SettleOp>,
        memo: String,
    ) -> SettleResult<()>;

    async fn settle_update(
        &self,
        pair: AccountPair,
        ops: Vec<SettleOp>,
        memo: String,
    ) -> SettleResult<()>;

    async fn settle_approve(&self, pair: AccountPair) -> SettleResult<()>;

    /// Executes a `ReadyToSubmit` workspace: queues the `account_settle` tx
    /// on the account and enqueues any `r2r` components onto the JBP draft
    /// batch.
    async fn settle_execute(&self, pair: AccountPair) -> SettleResult<()>;

    async fn settle_reject(&self, pair: AccountPair) -> SettleResult<()>;
}
