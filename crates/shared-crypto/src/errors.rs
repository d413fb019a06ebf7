//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid public key bytes.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Invalid private key bytes.
    #[error("invalid private key")]
    InvalidPrivateKey,

    /// Invalid signature bytes.
    #[error("invalid signature")]
    InvalidSignature,

    /// Signature did not verify against the given hash and public key.
    #[error("signature verification failed")]
    SignatureVerificationFailed,

    /// No public key registered for the requested signer.
    #[error("unknown signer")]
    UnknownSigner,

    /// A hanko requires at least one co-signature to aggregate.
    #[error("cannot aggregate an empty signature list")]
    EmptySignatureList,
}
