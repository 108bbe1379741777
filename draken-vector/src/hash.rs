//! The FNV-1a accumulator behind every vector hash kernel.
//!
//! All native types hash through the same per-byte accumulator so results
//! are deterministic across runs and platforms: strings feed their raw
//! bytes, fixed-width values feed their little-endian representation, and
//! nulls always yield [`draken_types::NULL_HASH`].

use draken_types::{FNV_OFFSET_BASIS, FNV_PRIME};

/// Hash `bytes` from the standard seed.
#[inline]
pub fn fnv1a(bytes: &[u8]) -> u64 {
    fnv1a_extend(FNV_OFFSET_BASIS, bytes)
}

/// Fold `bytes` into an existing accumulator.
#[inline]
pub fn fnv1a_extend(mut acc: u64, bytes: &[u8]) -> u64 {
    for &byte in bytes {
        acc ^= u64::from(byte);
        acc = acc.wrapping_mul(FNV_PRIME);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_the_seed() {
        assert_eq!(fnv1a(b""), FNV_OFFSET_BASIS);
    }

    #[test]
    fn known_vectors() {
        // Reference values for the 64-bit FNV-1a parameters.
        assert_eq!(fnv1a(b"a"), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv1a(b"foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn extend_composes() {
        assert_eq!(fnv1a_extend(fnv1a(b"foo"), b"bar"), fnv1a(b"foobar"));
    }
}
