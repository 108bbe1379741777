//! Nested list vectors.
//!
//! An `ArrayVector` slices a child vector with an `i32` offsets buffer;
//! the child is itself a [`Vector`] of any supported type.

use std::fmt;
use std::sync::Arc;

use arrow::array::{ArrayRef, ListArray};
use arrow_buffer::{NullBuffer, OffsetBuffer};
use arrow_schema::Field;
use draken_result::{Error, Result};
use draken_types::{TypeTag, Value, NULL_HASH};

use crate::bitmap;
use crate::hash::fnv1a_extend;
use crate::mask::ByteMask;
use crate::vector::Vector;
use crate::Origin;

#[derive(Clone)]
pub struct ArrayVector {
    offsets: OffsetBuffer<i32>,
    child: Arc<Vector>,
    validity: Option<NullBuffer>,
    origin: Origin,
}

impl fmt::Debug for ArrayVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayVector")
            .field("len", &self.len())
            .field("child_type", &self.child_type())
            .field("null_count", &self.null_count())
            .field("origin", &self.origin)
            .finish()
    }
}

impl ArrayVector {
    pub fn try_new(
        offsets: OffsetBuffer<i32>,
        child: Arc<Vector>,
        validity: Option<NullBuffer>,
        origin: Origin,
    ) -> Result<Self> {
        let len = offsets.len() - 1;
        let last = offsets[offsets.len() - 1];
        if last as usize > child.len() {
            return Err(Error::InvalidOffset(format!(
                "final offset {last} exceeds child length {}",
                child.len()
            )));
        }
        if let Some(v) = &validity {
            if v.len() != len {
                return Err(Error::length_mismatch(len, v.len()));
            }
        }
        Ok(Self {
            offsets,
            child,
            validity,
            origin,
        })
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
        TypeTag::Array
    }

    /// Logical type of the child elements.
    pub fn child_type(&self) -> TypeTag {
        self.child.type_tag()
    }

    #[inline]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn offsets(&self) -> &OffsetBuffer<i32> {
        &self.offsets
    }

    pub fn child(&self) -> &Vector {
        &self.child
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

    /// The child index range backing row `i`.
    fn range(&self, i: usize) -> std::ops::Range<usize> {
        self.offsets[i] as usize..self.offsets[i + 1] as usize
    }

    pub fn value(&self, i: usize) -> Result<Value> {
        if i >= self.len() {
            return Err(Error::index_out_of_range(i as i64, self.len()));
        }
        if self.is_null(i) {
            return Ok(Value::Null);
        }
        let mut items = Vec::with_capacity(self.range(i).len());
        for j in self.range(i) {
            items.push(self.child.value(j)?);
        }
        Ok(Value::List(items))
    }

    pub fn is_null_mask(&self) -> ByteMask {
        ByteMask::new(bitmap::null_mask_bytes(self.len(), self.validity.as_ref()))
    }

    /// Gather rows at `indices`: the selected child ranges are concatenated
    /// into a new child vector and fresh offsets. Null rows keep their
    /// range, matching the string-vector policy.
    pub fn take(&self, indices: &[i32]) -> Result<Self> {
        let len = self.len();
        let mut child_indices: Vec<i32> = Vec::new();
        let mut offsets = Vec::with_capacity(indices.len() + 1);
        offsets.push(0i32);
        for &raw in indices {
            if raw < 0 || raw as usize >= len {
                return Err(Error::index_out_of_range(i64::from(raw), len));
            }
            for j in self.range(raw as usize) {
                child_indices.push(j as i32);
            }
            offsets.push(child_indices.len() as i32);
        }
        let child = self.child.take(&child_indices)?;
        Self::try_new(
            OffsetBuffer::new(offsets.into()),
            Arc::new(child),
            bitmap::take_validity(self.validity.as_ref(), indices),
            Origin::Owned,
        )
    }

    /// Row hashes: the FNV-1a accumulator folded over the little-endian
    /// bytes of the child hashes inside each row's range.
    pub fn hash(&self) -> Result<Vec<u64>> {
        let child_hashes = self.child.hash()?;
        Ok((0..self.len())
            .map(|i| {
                if self.is_null(i) {
                    return NULL_HASH;
                }
                let mut acc = draken_types::FNV_OFFSET_BASIS;
                for j in self.range(i) {
                    acc = fnv1a_extend(acc, &child_hashes[j].to_le_bytes());
                }
                acc
            })
            .collect())
    }

    /// Export as an Arrow list array; the child is exported alongside and
    /// shares its buffers the same way flat vectors do.
    pub fn to_arrow(&self) -> ArrayRef {
        let child = self.child.to_arrow();
        let field = Arc::new(Field::new("item", child.data_type().clone(), true));
        Arc::new(ListArray::new(
            field,
            self.offsets.clone(),
            child,
            self.validity.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use arrow_buffer::ScalarBuffer;
    use crate::primitive::Int64Vector;

    fn sample() -> ArrayVector {
        // [[1, 2, 3], [4, 5], null, [6]]
        let child = Vector::Int64(Int64Vector::from_values(vec![1, 2, 3, 4, 5, 6]));
        let offsets = OffsetBuffer::new(ScalarBuffer::from(vec![0i32, 3, 5, 5, 6]));
        let validity = NullBuffer::from(vec![true, true, false, true]);
        ArrayVector::try_new(offsets, Arc::new(child), Some(validity), Origin::Owned).unwrap()
    }

    #[test]
    fn element_access() {
        let v = sample();
        assert_eq!(v.len(), 4);
        assert_eq!(v.child_type(), TypeTag::Int64);
        assert_eq!(
            v.value(0).unwrap(),
            Value::List(vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)])
        );
        assert_eq!(v.value(2).unwrap(), Value::Null);
        assert_eq!(v.value(3).unwrap(), Value::List(vec![Value::Int64(6)]));
    }

    #[test]
    fn take_rebuilds_child() {
        let v = sample();
        let t = v.take(&[3, 0]).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.value(0).unwrap(), Value::List(vec![Value::Int64(6)]));
        assert_eq!(
            t.value(1).unwrap(),
            Value::List(vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)])
        );
        assert_eq!(t.child().len(), 4);
    }

    #[test]
    fn take_out_of_range() {
        let v = sample();
        assert!(matches!(
            v.take(&[4]),
            Err(Error::IndexOutOfRange { index: 4, length: 4 })
        ));
    }

    #[test]
    fn hash_nulls_and_determinism() {
        let v = sample();
        let h = v.hash().unwrap();
        assert_eq!(h[2], NULL_HASH);
        assert_eq!(h, v.hash().unwrap());
        assert_ne!(h[0], h[1]);
    }

    #[test]
    fn offsets_beyond_child_rejected() {
        let child = Vector::Int64(Int64Vector::from_values(vec![1]));
        let offsets = OffsetBuffer::new(ScalarBuffer::from(vec![0i32, 2]));
        assert!(matches!(
            ArrayVector::try_new(offsets, Arc::new(child), None, Origin::Owned),
            Err(Error::InvalidOffset(_))
        ));
    }

    #[test]
    fn arrow_roundtrip() {
        let v = sample();
        let arr = v.to_arrow();
        assert_eq!(arr.len(), 4);
        assert_eq!(arr.null_count(), 1);
    }
}
