//! Shared mutable state behind the service: one `AccountMachine` per pair.

use crate::domain::AccountMachine;
use parking_lot::RwLock;
use shared_types::AccountPair;
use std::collections::HashMap;

#[derive(Default)]
pub struct AceState {
    accounts: RwLock<HashMap<AccountPair, AccountMachine>>,
}

impl AceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_open(&self, pair: AccountPair) -> parking_lot::MappedRwLockWriteGuard<'_, AccountMachine> {
        {
            let mut accounts = self.accounts.write();
            accounts.entry(pair).or_insert_with(|| AccountMachine::new(pair));
        }
        parking_lot::RwLockWriteGuard::map(self.accounts.write(), |m| m.get_mut(&pair).unwrap())
    }

    pub fn height_of(&self, pair: AccountPair) -> Option<u64> {
        self.accounts
            .read()
            .get(&pair)
            .map(|m| m.current_frame.height)
    }

    pub fn contains(&self, pair: AccountPair) -> bool {
        self.accounts.read().contains_key(&pair)
    }

    pub fn pairs(&self) -> Vec<AccountPair> {
        self.accounts.read().keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::EntityId;

    #[test]
    fn get_or_open_creates_on_first_access() {
        let state = AceState::new();
        let pair = AccountPair::new(EntityId([1; 32]), EntityId([2; 32]));
        assert!(!state.contains(pair));
        {
            let _m = state.get_or_open(pair);
        }
        assert!(state.contains(pair));
    }
}
