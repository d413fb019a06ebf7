//! The `Crypto` adapter contract (spec §6.1) and its concrete secp256k1 +
//! Keccak-256 implementation.

use crate::ecdsa::{KeyPair, PublicKey};
use crate::errors::CryptoError;
use crate::hashing::keccak256;
use shared_types::{Hanko, Hash, Signature};

/// `Crypto`: `hash(bytes)->Hash`, `sign(key, Hash)->Signature`,
/// `verify(pub, Hash, Signature)->bool`, `aggregate(sigs[])->Hanko` (spec §6.1).
pub trait Crypto {
    fn hash(&self, bytes: &[u8]) -> Hash;
    fn sign(&self, key: &KeyPair, hash: &Hash) -> Signature;
    fn verify(&self, public: &PublicKey, hash: &Hash, signature: &Signature) -> bool;
    fn aggregate(&self, sigs: &[Signature]) -> Result<Hanko, CryptoError>;
}

/// The only `Crypto` implementation in this core: Keccak-256 hashing,
/// secp256k1 ECDSA over the resulting digest, and a hanko that is simply the
/// ordered list of co-signatures (no threshold/BLS aggregation is named in
/// the adapter contract).
#[derive(Debug, Default, Clone, Copy)]
pub struct Secp256k1Crypto;

impl Crypto for Secp256k1Crypto {
    fn hash(&self, bytes: &[u8]) -> Hash {
        keccak256(bytes)
    }

    fn sign(&self, key: &KeyPair, hash: &Hash) -> Signature {
        key.sign_prehashed(hash)
    }

    fn verify(&self, public: &PublicKey, hash: &Hash, signature: &Signature) -> bool {
        public.verify(hash, signature).is_ok()
    }

    fn aggregate(&self, sigs: &[Signature]) -> Result<Hanko, CryptoError> {
        if sigs.is_empty() {
            return Err(CryptoError::EmptySignatureList);
        }
        Ok(Hanko {
            signatures: sigs.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecdsa::KeyPair;

    #[test]
    fn hash_is_deterministic() {
        let crypto = Secp256k1Crypto;
        assert_eq!(crypto.hash(b"a"), crypto.hash(b"a"));
    }

    #[test]
    fn sign_then_verify_succeeds() {
        let crypto = Secp256k1Crypto;
        let key = KeyPair::from_bytes([0x44; 32]).unwrap();
        let hash = crypto.hash(b"account frame");
        let sig = crypto.sign(&key, &hash);
        assert!(crypto.verify(&key.public_key(), &hash, &sig));
    }

    #[test]
    fn aggregate_preserves_order() {
        let crypto = Secp256k1Crypto;
        let left: Signature = vec![1, 2, 3];
        let right: Signature = vec![4, 5, 6];
        let hanko = crypto.aggregate(&[left.clone(), right.clone()]).unwrap();
        assert_eq!(hanko.signatures, vec![left, right]);
    }

    #[test]
    fn aggregate_rejects_empty() {
        let crypto = Secp256k1Crypto;
        assert!(crypto.aggregate(&[]).is_err());
    }
}
