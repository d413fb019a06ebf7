//! Keccak-256 state hashing (spec §6.1 `Crypto::hash`, §11 canonical encoding).
//!
//! Every `stateHash`/`batchHash` preimage is produced by
//! [`crate::canonical::CanonicalEncode`] (in `shared-types`) and then reduced
//! to a [`Hash`] with the one function in this module.

use sha3::{Digest, Keccak256};
use shared_types::Hash;

/// Hash arbitrary bytes with Keccak-256 (one-shot).
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let out = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&out);
    hash
}

/// Streaming Keccak-256 hasher, for callers assembling a preimage from
/// several disjoint buffers without a temporary concatenation.
#[derive(Default)]
pub struct StreamingHasher {
    inner: Keccak256,
}

impl StreamingHasher {
    pub fn new() -> Self {
        Self {
            inner: Keccak256::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    pub fn finalize(self) -> Hash {
        let out = self.inner.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&out);
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(keccak256(b"xln"), keccak256(b"xln"));
    }

    #[test]
    fn distinguishes_inputs() {
        assert_ne!(keccak256(b"left"), keccak256(b"right"));
    }

    #[test]
    fn streaming_matches_one_shot() {
        let one_shot = keccak256(b"hello world");
        let mut streaming = StreamingHasher::new();
        streaming.update(b"hello ").update(b"world");
        assert_eq!(one_shot, streaming.finalize());
    }
}
