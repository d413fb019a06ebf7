//! secp256k1 ECDSA over digests already produced by `Crypto::hash` (spec
//! §6.1 `Crypto::sign/verify`).
//!
//! Signing treats the 32-byte `Hash` as the message bytes handed to the
//! `Signer`/`Verifier` traits; the crate's own Keccak-256 pass (not these
//! keys) is what collapses the frame/workspace preimage to a fixed digest.

use crate::errors::CryptoError;
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use shared_types::Hash;
use zeroize::Zeroize;

/// Compressed secp256k1 public key (33 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey([u8; 33]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; 33]) -> Result<Self, CryptoError> {
        VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    pub fn verify(&self, hash: &Hash, signature: &[u8]) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let sig = Signature::from_slice(signature).map_err(|_| CryptoError::InvalidSignature)?;
        verifying_key
            .verify(hash, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// secp256k1 ECDSA keypair. Signs digests with RFC 6979 deterministic
/// nonces, so two signers who derive the same key from the same seed always
/// produce identical signatures over the same hash.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    pub fn public_key(&self) -> PublicKey {
        let sec1_bytes = self.signing_key.verifying_key().to_sec1_bytes();
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(&sec1_bytes[..33]);
        PublicKey(bytes)
    }

    /// Signs a pre-computed 32-byte digest, returning raw `r||s` bytes.
    pub fn sign_prehashed(&self, hash: &Hash) -> Vec<u8> {
        let sig: Signature = self.signing_key.sign(hash);
        sig.to_bytes().to_vec()
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::keccak256;

    #[test]
    fn sign_verify_roundtrip() {
        let key = KeyPair::from_bytes([0x11; 32]).unwrap();
        let hash = keccak256(b"frame preimage");
        let sig = key.sign_prehashed(&hash);
        assert!(key.public_key().verify(&hash, &sig).is_ok());
    }

    #[test]
    fn wrong_hash_fails() {
        let key = KeyPair::from_bytes([0x22; 32]).unwrap();
        let sig = key.sign_prehashed(&keccak256(b"a"));
        assert!(key.public_key().verify(&keccak256(b"b"), &sig).is_err());
    }

    #[test]
    fn deterministic_signature() {
        let key = KeyPair::from_bytes([0x33; 32]).unwrap();
        let hash = keccak256(b"deterministic");
        assert_eq!(key.sign_prehashed(&hash), key.sign_prehashed(&hash));
    }
}
