//! Variable-width byte-sequence vectors.
//!
//! Values are raw bytes (UTF-8 by convention, never enforced) addressed by
//! an `i32` offsets buffer with `length + 1` entries. Owned construction
//! always produces offsets starting at 0; borrowed vectors preserve the
//! source array's window, which may start elsewhere.

use std::fmt;
use std::sync::Arc;

use arrow::array::{ArrayRef, BinaryArray};
use arrow_buffer::{Buffer, MutableBuffer, NullBuffer, OffsetBuffer, ScalarBuffer};
use draken_result::{Error, Result};
use draken_types::{CompareOp, TypeTag, Value, NULL_HASH};

use crate::bitmap;
use crate::hash::fnv1a;
use crate::mask::ByteMask;
use crate::Origin;

#[derive(Clone)]
pub struct StringVector {
    offsets: OffsetBuffer<i32>,
    data: Buffer,
    validity: Option<NullBuffer>,
    origin: Origin,
}

impl fmt::Debug for StringVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringVector")
            .field("len", &self.len())
            .field("data_bytes", &self.data.len())
            .field("null_count", &self.null_count())
            .field("origin", &self.origin)
            .finish()
    }
}

/// Validate a raw offsets vector against a data buffer of `data_len` bytes
/// and freeze it. Entries must be non-decreasing, non-negative, and end
/// within the data buffer.
pub(crate) fn offsets_from_vec(offsets: Vec<i32>, data_len: usize) -> Result<OffsetBuffer<i32>> {
    if offsets.is_empty() {
        return Err(Error::InvalidOffset(
            "offsets must hold at least one entry".into(),
        ));
    }
    if offsets[0] < 0 {
        return Err(Error::InvalidOffset(format!(
            "first offset {} is negative",
            offsets[0]
        )));
    }
    for pair in offsets.windows(2) {
        if pair[1] < pair[0] {
            return Err(Error::InvalidOffset(format!(
                "offsets decrease from {} to {}",
                pair[0], pair[1]
            )));
        }
    }
    let last = offsets[offsets.len() - 1];
    if last as usize > data_len {
        return Err(Error::InvalidOffset(format!(
            "final offset {last} exceeds data length {data_len}"
        )));
    }
    Ok(OffsetBuffer::new(ScalarBuffer::from(offsets)))
}

impl StringVector {
    /// Wrap pre-built buffers, checking the offsets window against the
    /// data buffer.
    pub fn try_new(
        offsets: OffsetBuffer<i32>,
        data: Buffer,
        validity: Option<NullBuffer>,
        origin: Origin,
    ) -> Result<Self> {
        let len = offsets.len() - 1;
        let last = offsets[offsets.len() - 1];
        if last as usize > data.len() {
            return Err(Error::InvalidOffset(format!(
                "final offset {last} exceeds data length {}",
                data.len()
            )));
        }
        if let Some(v) = &validity {
            if v.len() != len {
                return Err(Error::length_mismatch(len, v.len()));
            }
        }
        Ok(Self {
            offsets,
            data,
            validity,
            origin,
        })
    }

    /// An owned vector with no nulls.
    pub fn from_slices<S: AsRef<[u8]>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::collect(values.into_iter().map(Some))
    }

    /// An owned vector from optional values; null rows get a zero-length
    /// range.
    pub fn from_options<S: AsRef<[u8]>>(values: impl IntoIterator<Item = Option<S>>) -> Self {
        Self::collect(values.into_iter())
    }

    fn collect<S: AsRef<[u8]>>(values: impl Iterator<Item = Option<S>>) -> Self {
        let mut data = Vec::new();
        let mut offsets = vec![0i32];
        let mut nulls = Vec::new();
        let mut any_null = false;
        for value in values {
            match value {
                Some(v) => {
                    data.extend_from_slice(v.as_ref());
                    nulls.push(true);
                }
                None => {
                    nulls.push(false);
                    any_null = true;
                }
            }
            offsets.push(data.len() as i32);
        }
        let validity = if any_null {
            let mut bits = bitmap::all_valid(nulls.len());
            for (i, valid) in nulls.iter().enumerate() {
                if !valid {
                    arrow_buffer::bit_util::unset_bit(bits.as_slice_mut(), i);
                }
            }
            bitmap::freeze_validity(bits, nulls.len())
        } else {
            None
        };
        Self {
            offsets: OffsetBuffer::new(ScalarBuffer::from(offsets)),
            data: Buffer::from(data),
            validity,
            origin: Origin::Owned,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn type_tag(&self) -> TypeTag {
        TypeTag::String
    }

    #[inline]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn offsets(&self) -> &OffsetBuffer<i32> {
        &self.offsets
    }

    pub fn data(&self) -> &Buffer {
        &self.data
    }

    pub fn validity(&self) -> Option<&NullBuffer> {
        self.validity.as_ref()
    }

    pub fn null_count(&self) -> usize {
        self.validity.as_ref().map_or(0, |v| v.null_count())
    }

    /// Whether row `i` is null. Panics when `i` is out of range.
    #[inline]
    pub fn is_null(&self, i: usize) -> bool {
        assert!(i < self.len());
        self.validity.as_ref().is_some_and(|v| v.is_null(i))
    }

    /// The byte range of row `i`, regardless of validity. Panics out of
    /// range.
    pub fn bytes_at(&self, i: usize) -> &[u8] {
        let start = self.offsets[i] as usize;
        let end = self.offsets[i + 1] as usize;
        &self.data.as_slice()[start..end]
    }

    /// The bytes of row `i`, `None` when null.
    pub fn get(&self, i: usize) -> Option<&[u8]> {
        (!self.is_null(i)).then(|| self.bytes_at(i))
    }

    pub fn value(&self, i: usize) -> Result<Value> {
        if i >= self.len() {
            return Err(Error::index_out_of_range(i as i64, self.len()));
        }
        Ok(match self.get(i) {
            None => Value::Null,
            Some(v) => Value::Bytes(v.to_vec()),
        })
    }

    /// Byte length of each row's range.
    pub fn value_lengths(&self) -> Vec<i32> {
        self.offsets
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .collect()
    }

    pub fn is_null_mask(&self) -> ByteMask {
        ByteMask::new(bitmap::null_mask_bytes(self.len(), self.validity.as_ref()))
    }

    /// Gather rows at `indices` with a two-pass allocation: the first pass
    /// sizes the output data buffer exactly, the second copies bytes and
    /// rebuilds offsets. Null rows keep their source byte range and their
    /// null bit.
    pub fn take(&self, indices: &[i32]) -> Result<Self> {
        let len = self.len();
        let mut total = 0usize;
        for &raw in indices {
            if raw < 0 || raw as usize >= len {
                return Err(Error::index_out_of_range(i64::from(raw), len));
            }
            total += self.bytes_at(raw as usize).len();
        }
        if total > i32::MAX as usize {
            return Err(Error::OutOfMemory(format!(
                "take output of {total} bytes exceeds the 32-bit offset range"
            )));
        }

        let mut data = MutableBuffer::new(total);
        let mut offsets = Vec::with_capacity(indices.len() + 1);
        let mut acc = 0i32;
        offsets.push(acc);
        for &raw in indices {
            let bytes = self.bytes_at(raw as usize);
            data.extend_from_slice(bytes);
            acc += bytes.len() as i32;
            offsets.push(acc);
        }

        Self::try_new(
            OffsetBuffer::new(ScalarBuffer::from(offsets)),
            data.into(),
            bitmap::take_validity(self.validity.as_ref(), indices),
            Origin::Owned,
        )
    }

    fn cmp_matches(op: CompareOp, a: &[u8], b: &[u8]) -> bool {
        op.matches(a.cmp(b))
    }

    /// Byte-for-byte comparison against a scalar, no encoding
    /// normalization; ordering is lexicographic over the raw bytes. Null
    /// rows yield 0.
    pub fn compare_scalar(&self, op: CompareOp, rhs: &[u8]) -> ByteMask {
        ByteMask::from_bools((0..self.len()).map(|i| match self.get(i) {
            None => false,
            Some(v) => Self::cmp_matches(op, v, rhs),
        }))
    }

    pub fn compare_vector(&self, op: CompareOp, other: &Self) -> Result<ByteMask> {
        if self.len() != other.len() {
            return Err(Error::length_mismatch(self.len(), other.len()));
        }
        Ok(ByteMask::from_bools((0..self.len()).map(|i| {
            match (self.get(i), other.get(i)) {
                (Some(a), Some(b)) => Self::cmp_matches(op, a, b),
                _ => false,
            }
        })))
    }

    pub fn equals(&self, rhs: &[u8]) -> ByteMask {
        self.compare_scalar(CompareOp::Eq, rhs)
    }

    pub fn equals_vector(&self, other: &Self) -> Result<ByteMask> {
        self.compare_vector(CompareOp::Eq, other)
    }

    /// ASCII `a..z` mapped to `A..Z`, every other byte unchanged. Null rows
    /// collapse to a zero-length range and keep their null bit.
    pub fn uppercase(&self) -> Self {
        Self::collect((0..self.len()).map(|i| {
            self.get(i)
                .map(|bytes| bytes.iter().map(u8::to_ascii_uppercase).collect::<Vec<_>>())
        }))
    }

    /// Row hashes: FNV-1a over the value bytes, the null constant for null
    /// rows.
    pub fn hash(&self) -> Vec<u64> {
        (0..self.len())
            .map(|i| match self.get(i) {
                None => NULL_HASH,
                Some(v) => fnv1a(v),
            })
            .collect()
    }

    /// Export as an Arrow binary array sharing this vector's buffers.
    pub fn to_arrow(&self) -> ArrayRef {
        Arc::new(BinaryArray::new(
            self.offsets.clone(),
            self.data.clone(),
            self.validity.clone(),
        ))
    }
}
