//! # Shared Crypto
//!
//! Implements the `Crypto` and `KeyStore` adapter contracts (spec §6.1):
//! Keccak-256 state hashing, secp256k1 ECDSA signing over pre-hashed
//! digests, and deterministic per-signer key derivation.
//!
//! | Module | Algorithm | Use |
//! |--------|-----------|-----|
//! | `hashing` | Keccak-256 | `stateHash`/`batchHash` |
//! | `ecdsa` | secp256k1 | frame/workspace/hanko signatures |
//! | `keystore` | Keccak-256 try-and-increment | signer derivation |

pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod keystore;
pub mod traits;

pub use ecdsa::{KeyPair, PublicKey};
pub use errors::CryptoError;
pub use hashing::keccak256;
pub use keystore::{DeterministicKeyStore, KeyStore};
pub use traits::{Crypto, Secp256k1Crypto};
