//! Inbound API ERM exposes to the runtime scheduler (spec §4.3, forwarded
//! from ingress via `enqueueRuntimeInput`, spec §6.2).

use crate::domain::ErmResult;
use async_trait::async_trait;
use shared_types::{EntityId, EntityInput};

#[async_trait]
pub trait ErmApi: Send + Sync {
    /// Applies one signer's batch of `EntityTx` against the named entity in
    /// order, then stamps a new frame (height + 1, recomputed `stateHash`).
    /// Opens the entity's state on first input if it does not exist yet.
    async fn submit_entity_input(&self, input: EntityInput) -> ErmResult<()>;

    async fn current_height(&self, entity_id: EntityId) -> Option<u64>;
}
