//! Bit-packed boolean vectors.
//!
//! Values share the validity bitmap's layout: bit `i` lives at
//! `byte[i >> 3]`, position `i & 7`.

use std::fmt;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray};
use arrow_buffer::builder::BooleanBufferBuilder;
use arrow_buffer::{BooleanBuffer, NullBuffer};
use draken_result::{Error, Result};
use draken_types::{CompareOp, LogicalOp, TypeTag, Value, NULL_HASH};

use crate::bitmap;
use crate::hash::fnv1a;
use crate::mask::ByteMask;
use crate::Origin;

#[derive(Clone)]
pub struct BoolVector {
    values: BooleanBuffer,
    validity: Option<NullBuffer>,
    origin: Origin,
}

impl fmt::Debug for BoolVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoolVector")
            .field("len", &self.len())
            .field("null_count", &self.null_count())
            .field("origin", &self.origin)
            .finish()
    }
}

impl BoolVector {
    pub fn new(
        values: BooleanBuffer,
        validity: Option<NullBuffer>,
        origin: Origin,
    ) -> Result<Self> {
        if let Some(v) = &validity {
            if v.len() != values.len() {
                return Err(Error::length_mismatch(values.len(), v.len()));
            }
        }
        Ok(Self {
            values,
            validity,
            origin,
        })
    }

    pub fn from_values(values: impl IntoIterator<Item = bool>) -> Self {
        let mut bits = BooleanBufferBuilder::new(0);
        for v in values {
            bits.append(v);
        }
        Self {
            values: bits.finish(),
            validity: None,
            origin: Origin::Owned,
        }
    }

    pub fn from_options(values: impl IntoIterator<Item = Option<bool>>) -> Self {
        let mut bits = BooleanBufferBuilder::new(0);
        let mut valid = BooleanBufferBuilder::new(0);
        let mut any_null = false;
        for v in values {
            bits.append(v.unwrap_or(false));
            valid.append(v.is_some());
            any_null |= v.is_none();
        }
        Self {
            values: bits.finish(),
            validity: any_null.then(|| NullBuffer::new(valid.finish())),
            origin: Origin::Owned,
        }
    }

    pub(crate) fn from_parts_borrowed(
        values: BooleanBuffer,
        validity: Option<NullBuffer>,
    ) -> Self {
        Self {
            values,
            validity,
            origin: Origin::Arrow,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn type_tag(&self) -> TypeTag {
        TypeTag::Bool
    }

    #[inline]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn values(&self) -> &BooleanBuffer {
        &self.values
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

    /// The bit at `i`, `None` when null. Panics out of range.
    pub fn get(&self, i: usize) -> Option<bool> {
        (!self.is_null(i)).then(|| self.values.value(i))
    }

    pub fn value(&self, i: usize) -> Result<Value> {
        if i >= self.len() {
            return Err(Error::index_out_of_range(i as i64, self.len()));
        }
        Ok(match self.get(i) {
            None => Value::Null,
            Some(v) => Value::Bool(v),
        })
    }

    pub fn is_null_mask(&self) -> ByteMask {
        ByteMask::new(bitmap::null_mask_bytes(self.len(), self.validity.as_ref()))
    }

    /// Gather bits at `indices` into a new owned vector, reading and
    /// writing single bits.
    pub fn take(&self, indices: &[i32]) -> Result<Self> {
        let len = self.len();
        let mut bits = BooleanBufferBuilder::new(indices.len());
        for &raw in indices {
            if raw < 0 || raw as usize >= len {
                return Err(Error::index_out_of_range(i64::from(raw), len));
            }
            bits.append(self.values.value(raw as usize));
        }
        Ok(Self {
            values: bits.finish(),
            validity: bitmap::take_validity(self.validity.as_ref(), indices),
            origin: Origin::Owned,
        })
    }

    /// Byte 1 where the data bit equals `rhs` and the row is valid.
    pub fn equals(&self, rhs: bool) -> ByteMask {
        ByteMask::from_bools((0..self.len()).map(|i| self.get(i) == Some(rhs)))
    }

    /// Eq/Ne against another boolean vector; ordering operators are not
    /// defined for booleans.
    pub fn compare_vector(&self, op: CompareOp, other: &Self) -> Result<ByteMask> {
        if self.len() != other.len() {
            return Err(Error::length_mismatch(self.len(), other.len()));
        }
        let want_equal = match op {
            CompareOp::Eq => true,
            CompareOp::Ne => false,
            _ => {
                return Err(Error::UnsupportedType(format!(
                    "comparison {op} is not defined for bool vectors"
                )));
            }
        };
        Ok(ByteMask::from_bools((0..self.len()).map(|i| {
            match (self.get(i), other.get(i)) {
                (Some(a), Some(b)) => (a == b) == want_equal,
                _ => false,
            }
        })))
    }

    /// Bitwise logic with another boolean vector. A null on either side
    /// nulls the output row.
    pub fn logical(&self, op: LogicalOp, other: &Self) -> Result<Self> {
        if self.len() != other.len() {
            return Err(Error::length_mismatch(self.len(), other.len()));
        }
        let values = match op {
            LogicalOp::And => &self.values & &other.values,
            LogicalOp::Or => &self.values | &other.values,
            LogicalOp::Xor => &self.values ^ &other.values,
        };
        Ok(Self {
            values,
            validity: NullBuffer::union(self.validity.as_ref(), other.validity.as_ref()),
            origin: Origin::Owned,
        })
    }

    pub fn and_vector(&self, other: &Self) -> Result<Self> {
        self.logical(LogicalOp::And, other)
    }

    pub fn or_vector(&self, other: &Self) -> Result<Self> {
        self.logical(LogicalOp::Or, other)
    }

    pub fn xor_vector(&self, other: &Self) -> Result<Self> {
        self.logical(LogicalOp::Xor, other)
    }

    /// Whether any valid row is true; stops at the first hit.
    pub fn any(&self) -> bool {
        (0..self.len()).any(|i| self.get(i) == Some(true))
    }

    /// Whether every valid row is true. Vacuously true when empty or
    /// all-null.
    pub fn all(&self) -> bool {
        !(0..self.len()).any(|i| self.get(i) == Some(false))
    }

    /// Count of rows that are both valid and set.
    pub fn count_true(&self) -> usize {
        match &self.validity {
            None => self.values.count_set_bits(),
            Some(v) => (&self.values & v.inner()).count_set_bits(),
        }
    }

    /// Row hashes over a single 0/1 byte per value.
    pub fn hash(&self) -> Vec<u64> {
        (0..self.len())
            .map(|i| match self.get(i) {
                None => NULL_HASH,
                Some(v) => fnv1a(&[u8::from(v)]),
            })
            .collect()
    }

    pub fn to_arrow(&self) -> ArrayRef {
        Arc::new(BooleanArray::new(
            self.values.clone(),
            self.validity.clone(),
        ))
    }
}
