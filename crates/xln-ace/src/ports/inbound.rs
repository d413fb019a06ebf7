//! Inbound API ACE exposes to the entity that owns it (spec §4.1).

use crate::domain::AceResult;
use async_trait::async_trait;
use shared_types::{AccountInput, AccountPair, AccountTx};

#[async_trait]
pub trait AceApi: Send + Sync {
    /// Queues a locally originated `AccountTx` for the named pair's mempool,
    /// opening the `AccountMachine` if this is the first transaction on it.
    async fn queue_tx(&self, pair: AccountPair, tx: AccountTx) -> AceResult<()>;

    /// Drains the mempool of every account for which we are the default
    /// proposer and no proposal is in flight, producing a frame and sending
    /// it to each counterparty (spec §4.1 step 1). Called once per runtime
    /// tick.
    async fn propose_ready_accounts(&self) -> AceResult<()>;

    /// Handles one wire message addressed to a pair we hold (spec §4.1
    /// steps 2-4).
    async fn handle_input(&self, input: AccountInput) -> AceResult<()>;

    /// Current finalized height for a pair, or `None` if no account is open.
    async fn current_height(&self, pair: AccountPair) -> Option<u64>;
}
