//! Entity-scoped configuration (spec §3.6).

use crate::ids::SignerId;
use serde::{Deserialize, Serialize};

/// Where an entity's jurisdiction batches settle, and which token registry
/// governs its tokens (spec §3.6, §6.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionRef {
    pub chain_id: u64,
    pub contract_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub validators: Vec<SignerId>,
    pub jurisdiction: JurisdictionRef,
}
