//! Canonical, order-independent byte encoding for hashing (spec §4.3, §6.3,
//! §9: "Map iteration order").
//!
//! Anything that feeds a `stateHash` or `batchHash` must implement this
//! trait instead of relying on `serde`/`bincode`'s struct-field order over a
//! `HashMap`, which is exactly the trap spec §9 calls out in the source
//! material. Implementors sort any map-shaped data by key before encoding.

/// Produces a canonical byte representation suitable for hashing.
///
/// Implementations must be deterministic across processes and across Rust
/// versions: no `HashMap` iteration, no pointer-derived ordering, no
/// platform-dependent float formatting (amounts never use floats, per
/// spec §9).
pub trait CanonicalEncode {
    fn canonical_encode(&self, out: &mut Vec<u8>);

    fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.canonical_encode(&mut out);
        out
    }
}

impl CanonicalEncode for u8 {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        out.push(*self);
    }
}

impl CanonicalEncode for u32 {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl CanonicalEncode for u64 {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl CanonicalEncode for bool {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        out.push(if *self { 1 } else { 0 });
    }
}

impl CanonicalEncode for [u8; 32] {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }
}

impl CanonicalEncode for String {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        (self.len() as u32).canonical_encode(out);
        out.extend_from_slice(self.as_bytes());
    }
}

impl<T: CanonicalEncode> CanonicalEncode for Vec<T> {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        (self.len() as u32).canonical_encode(out);
        for item in self {
            item.canonical_encode(out);
        }
    }
}

impl<T: CanonicalEncode> CanonicalEncode for Option<T> {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        match self {
            None => out.push(0),
            Some(v) => {
                out.push(1);
                v.canonical_encode(out);
            }
        }
    }
}

/// Encodes a map-shaped collection as a length-prefixed, key-sorted sequence
/// of `(key, value)` pairs. Call sites must never pass `HashMap` iteration
/// order directly; collect and sort first.
pub fn encode_sorted_map<K, V>(mut entries: Vec<(K, V)>, out: &mut Vec<u8>)
where
    K: Ord + CanonicalEncode,
    V: CanonicalEncode,
{
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    (entries.len() as u32).canonical_encode(out);
    for (k, v) in &entries {
        k.canonical_encode(out);
        v.canonical_encode(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_map_encoding_is_order_independent() {
        let a = vec![(3u32, "c".to_string()), (1u32, "a".to_string()), (2u32, "b".to_string())];
        let b = vec![(1u32, "a".to_string()), (2u32, "b".to_string()), (3u32, "c".to_string())];
        let mut out_a = Vec::new();
        let mut out_b = Vec::new();
        encode_sorted_map(a, &mut out_a);
        encode_sorted_map(b, &mut out_b);
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn option_encoding_distinguishes_none_and_some() {
        let none: Option<u32> = None;
        let some: Option<u32> = Some(0);
        assert_ne!(none.canonical_bytes(), some.canonical_bytes());
    }
}
