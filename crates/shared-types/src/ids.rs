//! Identifiers and opaque byte primitives (spec §3.1).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A 32-byte digest. Produced by the [`crate::CanonicalEncode`] + `Crypto::hash`
/// pipeline; never constructed by hand outside of tests and genesis values.
pub type Hash = [u8; 32];

/// Opaque signature bytes, shape determined by the `Crypto` capability in use.
pub type Signature = Vec<u8>;

/// An aggregated multi-signature attesting to a frame or workspace (spec §3.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hanko {
    /// Signatures of the participants, in a fixed (left, right) order.
    pub signatures: Vec<Signature>,
}

impl Hanko {
    /// Builds a hanko from exactly two co-signatures (the common case: a
    /// bilateral account or a two-party settlement workspace).
    pub fn from_pair(left: Signature, right: Signature) -> Self {
        Self {
            signatures: vec![left, right],
        }
    }
}

/// Opaque 32-byte entity identifier, rendered as lowercase hex.
///
/// Comparison is a plain byte-wise lexicographic order, which for lowercase
/// hex rendering coincides with case-insensitive hex comparison — this is
/// the ordering used to assign the `left`/`right` role in an account pair
/// (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub [u8; 32]);

impl EntityId {
    /// Returns whether `self` is the `left` side of a pair with `other`.
    ///
    /// The smaller id is `left`; ties cannot occur since an account's
    /// counterparty is never itself.
    pub fn is_left_of(&self, other: &EntityId) -> bool {
        self < other
    }

    pub fn to_hex(&self) -> String {
        hex_lower(&self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Opaque 20-byte identifier of a signer authorized within an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignerId(pub [u8; 20]);

impl SignerId {
    pub fn to_hex(&self) -> String {
        hex_lower(&self.0)
    }
}

impl fmt::Display for SignerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A positive token identifier, sourced from the jurisdiction's token
/// registry. Zero is reserved and never assigned to a real token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub u32);

impl TokenId {
    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token#{}", self.0)
    }
}

/// Metadata for a token, sourced from the jurisdiction (`TokenRegistry`
/// adapter, spec §6.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub token_id: TokenId,
    pub symbol: String,
    pub decimals: u8,
    /// On-chain contract address, absent for the native asset.
    pub address: Option<String>,
}

/// A deterministic pair key: the unordered `{entityId, counterpartyId}` set
/// that identifies a bilateral account (spec §3.4), stored in canonical
/// `(left, right)` order so it can be used directly as a map key without
/// re-deriving roles on every lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountPair {
    pub left: EntityId,
    pub right: EntityId,
}

impl AccountPair {
    /// Builds the canonical pair for two (unordered) entities.
    pub fn new(a: EntityId, b: EntityId) -> Self {
        match a.cmp(&b) {
            Ordering::Less => AccountPair { left: a, right: b },
            _ => AccountPair { left: b, right: a },
        }
    }

    pub fn counterparty_of(&self, me: &EntityId) -> EntityId {
        if &self.left == me {
            self.right
        } else {
            self.left
        }
    }

    pub fn is_left(&self, me: &EntityId) -> bool {
        &self.left == me
    }
}

fn hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

pub const GENESIS_HASH: Hash = [0u8; 32];

#[cfg(test)]
mod tests {
    use super::*;

    fn eid(b: u8) -> EntityId {
        EntityId([b; 32])
    }

    #[test]
    fn role_assignment_is_symmetric() {
        let a = eid(1);
        let b = eid(2);
        assert!(a.is_left_of(&b));
        assert!(!b.is_left_of(&a));
    }

    #[test]
    fn account_pair_is_order_independent() {
        let a = eid(1);
        let b = eid(2);
        assert_eq!(AccountPair::new(a, b), AccountPair::new(b, a));
    }

    #[test]
    fn account_pair_counterparty_lookup() {
        let a = eid(1);
        let b = eid(2);
        let pair = AccountPair::new(a, b);
        assert_eq!(pair.counterparty_of(&a), b);
        assert_eq!(pair.counterparty_of(&b), a);
        assert!(pair.is_left(&a));
        assert!(!pair.is_left(&b));
    }

    #[test]
    fn hex_rendering_is_lowercase() {
        let id = EntityId([0xAB; 32]);
        assert_eq!(id.to_hex(), "ab".repeat(32));
    }
}
