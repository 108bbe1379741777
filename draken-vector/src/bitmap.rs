//! Validity-bitmap helpers shared by the vector implementations.
//!
//! Bit layout is Arrow little-endian: bit `i` lives at `byte[i >> 3]`,
//! position `i & 7`, and a set bit means valid. Produced bitmaps start
//! all-valid and have nulls stamped in; a bitmap with no nulls is dropped
//! so consumers can treat absence as "all valid".

use arrow_buffer::bit_util;
use arrow_buffer::builder::BooleanBufferBuilder;
use arrow_buffer::{BooleanBuffer, MutableBuffer, NullBuffer};

/// A mutable bitmap of `len` bits, initialized all-valid (0xFF bytes).
pub fn all_valid(len: usize) -> MutableBuffer {
    let bytes = bit_util::ceil(len, 8);
    MutableBuffer::new(bytes).with_bitset(bytes, true)
}

/// Freeze a stamped bitmap into a `NullBuffer`, or `None` when no bit was
/// cleared.
pub fn freeze_validity(bits: MutableBuffer, len: usize) -> Option<NullBuffer> {
    let nulls = NullBuffer::new(BooleanBuffer::new(bits.into(), 0, len));
    (nulls.null_count() > 0).then_some(nulls)
}

/// Gather validity bits for `take`. Indices must already be bounds-checked.
pub(crate) fn take_validity(validity: Option<&NullBuffer>, indices: &[i32]) -> Option<NullBuffer> {
    let validity = validity?;
    let mut bits = BooleanBufferBuilder::new(indices.len());
    for &index in indices {
        bits.append(validity.is_valid(index as usize));
    }
    let nulls = NullBuffer::new(bits.finish());
    (nulls.null_count() > 0).then_some(nulls)
}

/// Per-row null flags as bytes, 1 = null. An absent bitmap means no nulls.
pub(crate) fn null_mask_bytes(len: usize, validity: Option<&NullBuffer>) -> Vec<u8> {
    match validity {
        None => vec![0u8; len],
        Some(v) => (0..len).map(|i| u8::from(v.is_null(i))).collect(),
    }
}
