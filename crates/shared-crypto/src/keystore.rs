//! Deterministic signer derivation and lookup (spec §6.1 `KeyStore`).

use crate::ecdsa::{KeyPair, PublicKey};
use crate::errors::CryptoError;
use crate::hashing::keccak256;
use shared_types::SignerId;
use std::collections::HashMap;
use std::sync::RwLock;

/// `KeyStore::deriveSigner(seed, signerId) -> PrivKey`,
/// `KeyStore::publicFor(signerId) -> PubKey` (spec §6.1).
pub trait KeyStore {
    fn derive_signer(&self, seed: &[u8], signer_id: SignerId) -> KeyPair;
    fn public_for(&self, signer_id: SignerId) -> Result<PublicKey, CryptoError>;
}

/// Derives secp256k1 keys by try-and-increment hashing of `seed || signerId`,
/// and remembers the public key of every signer it has derived so
/// `public_for` can answer without re-deriving the private key.
#[derive(Default)]
pub struct DeterministicKeyStore {
    known: RwLock<HashMap<SignerId, PublicKey>>,
}

impl DeterministicKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyStore for DeterministicKeyStore {
    fn derive_signer(&self, seed: &[u8], signer_id: SignerId) -> KeyPair {
        let mut counter: u32 = 0;
        let key_pair = loop {
            let mut preimage = Vec::with_capacity(seed.len() + 20 + 4);
            preimage.extend_from_slice(seed);
            preimage.extend_from_slice(&signer_id.0);
            preimage.extend_from_slice(&counter.to_le_bytes());
            let candidate = keccak256(&preimage);
            match KeyPair::from_bytes(candidate) {
                Ok(kp) => break kp,
                Err(_) => counter += 1,
            }
        };
        self.known
            .write()
            .expect("keystore lock poisoned")
            .insert(signer_id, key_pair.public_key());
        key_pair
    }

    fn public_for(&self, signer_id: SignerId) -> Result<PublicKey, CryptoError> {
        self.known
            .read()
            .expect("keystore lock poisoned")
            .get(&signer_id)
            .copied()
            .ok_or(CryptoError::UnknownSigner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let store = DeterministicKeyStore::new();
        let signer = SignerId([7; 20]);
        let a = store.derive_signer(b"seed", signer);
        let b = store.derive_signer(b"seed", signer);
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn different_signers_get_different_keys() {
        let store = DeterministicKeyStore::new();
        let a = store.derive_signer(b"seed", SignerId([1; 20]));
        let b = store.derive_signer(b"seed", SignerId([2; 20]));
        assert_ne!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn public_for_returns_derived_key() {
        let store = DeterministicKeyStore::new();
        let signer = SignerId([9; 20]);
        let key = store.derive_signer(b"seed", signer);
        assert_eq!(store.public_for(signer).unwrap(), key.public_key());
    }

    #[test]
    fn public_for_unknown_signer_errors() {
        let store = DeterministicKeyStore::new();
        assert!(store.public_for(SignerId([0; 20])).is_err());
    }
}
