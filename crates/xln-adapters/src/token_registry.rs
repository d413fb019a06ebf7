//! In-memory token metadata registry (spec §6.1 `TokenRegistry`). Seeded with
//! a fixed set of tokens at construction; a real deployment would source this
//! from the jurisdiction chain's token list or a curated config file.

use crate::error::{AdapterError, AdapterResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{TokenId, TokenInfo};
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait TokenRegistry: Send + Sync {
    async fn info(&self, token_id: TokenId) -> AdapterResult<TokenInfo>;

    async fn list(&self) -> Vec<TokenInfo>;
}

pub struct StaticTokenRegistry {
    tokens: RwLock<HashMap<TokenId, TokenInfo>>,
}

impl StaticTokenRegistry {
    pub fn new(tokens: Vec<TokenInfo>) -> Arc<Self> {
        Arc::new(Self {
            tokens: RwLock::new(tokens.into_iter().map(|t| (t.token_id, t)).collect()),
        })
    }

    /// A registry seeded with the native asset and USDC, the pairing used
    /// throughout the end-to-end scenarios.
    pub fn with_defaults() -> Arc<Self> {
        Self::new(vec![
            TokenInfo { token_id: TokenId(1), symbol: "ETH".into(), decimals: 18, address: None },
            TokenInfo {
                token_id: TokenId(2),
                symbol: "USDC".into(),
                decimals: 6,
                address: Some("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".into()),
            },
        ])
    }

    pub fn register(&self, token: TokenInfo) {
        self.tokens.write().insert(token.token_id, token);
    }
}

#[async_trait]
impl TokenRegistry for StaticTokenRegistry {
    async fn info(&self, token_id: TokenId) -> AdapterResult<TokenInfo> {
        self.tokens
            .read()
            .get(&token_id)
            .cloned()
            .ok_or(AdapterError::UnknownToken(token_id))
    }

    async fn list(&self) -> Vec<TokenInfo> {
        self.tokens.read().values().cloned().collect()
    }
}
