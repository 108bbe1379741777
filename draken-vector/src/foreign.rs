//! The escape hatch for Arrow types without a native vector.
//!
//! A `ForeignVector` wraps the imported Arrow array itself and delegates
//! every kernel to generic Arrow compute. Correctness is preserved; the
//! per-type performance guarantees of the native vectors are not.

use std::fmt;

use arrow::array::{Array, ArrayRef, Scalar, UInt32Array};
use arrow::compute::kernels::{cmp, numeric};
use arrow::compute::take;
use arrow::row::{RowConverter, SortField};
use draken_result::{Error, Result};
use draken_types::{ArithmeticOp, CompareOp, TypeTag, Value, NULL_HASH};

use crate::convert;
use crate::hash::fnv1a;
use crate::mask::ByteMask;
use crate::Origin;

#[derive(Clone)]
pub struct ForeignVector {
    array: ArrayRef,
}

impl fmt::Debug for ForeignVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignVector")
            .field("arrow_type", self.array.data_type())
            .field("len", &self.len())
            .field("null_count", &self.null_count())
            .finish()
    }
}

impl ForeignVector {
    pub fn new(array: ArrayRef) -> Self {
        Self { array }
    }

    pub fn array(&self) -> &ArrayRef {
        &self.array
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.array.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    #[inline]
    pub fn type_tag(&self) -> TypeTag {
        TypeTag::NonNative
    }

    /// Foreign vectors always borrow the wrapped array's buffers.
    #[inline]
    pub fn origin(&self) -> Origin {
        Origin::Arrow
    }

    pub fn null_count(&self) -> usize {
        self.array.null_count()
    }

    /// Whether row `i` is null. Panics when `i` is out of range.
    #[inline]
    pub fn is_null(&self, i: usize) -> bool {
        assert!(i < self.len());
        self.array.is_null(i)
    }

    /// Element access is not materialized for non-native types; callers
    /// that need a placeholder (morsel rows) map this to null.
    pub fn value(&self, i: usize) -> Result<Value> {
        if i >= self.len() {
            return Err(Error::index_out_of_range(i as i64, self.len()));
        }
        if self.is_null(i) {
            return Ok(Value::Null);
        }
        Err(Error::UnsupportedType(format!(
            "cannot materialize a scalar from non-native arrow type {}",
            self.array.data_type()
        )))
    }

    pub fn is_null_mask(&self) -> ByteMask {
        ByteMask::from_bools((0..self.len()).map(|i| self.array.is_null(i)))
    }

    /// Gather through `arrow::compute::take`.
    pub fn take(&self, indices: &[i32]) -> Result<Self> {
        let len = self.len();
        let mut gathered = Vec::with_capacity(indices.len());
        for &raw in indices {
            if raw < 0 || raw as usize >= len {
                return Err(Error::index_out_of_range(i64::from(raw), len));
            }
            gathered.push(raw as u32);
        }
        let indices = UInt32Array::from(gathered);
        let taken = take(self.array.as_ref(), &indices, None)?;
        Ok(Self::new(taken))
    }

    /// Row hashes over the Arrow row format, which is byte-comparable and
    /// stable for any convertible type.
    pub fn hash(&self) -> Result<Vec<u64>> {
        let converter = RowConverter::new(vec![SortField::new(self.array.data_type().clone())])?;
        let rows = converter.convert_columns(&[self.array.clone()])?;
        Ok((0..self.len())
            .map(|i| {
                if self.array.is_null(i) {
                    NULL_HASH
                } else {
                    fnv1a(rows.row(i).as_ref())
                }
            })
            .collect())
    }

    fn mask_from_boolean(result: arrow::array::BooleanArray) -> ByteMask {
        ByteMask::from_bools(
            (0..result.len()).map(|i| result.is_valid(i) && result.value(i)),
        )
    }

    /// Row-wise comparison with another foreign vector via the generic
    /// Arrow kernels. Null output slots become 0 in the mask.
    pub fn compare_vector(&self, op: CompareOp, other: &Self) -> Result<ByteMask> {
        if self.len() != other.len() {
            return Err(Error::length_mismatch(self.len(), other.len()));
        }
        let result = Self::apply_cmp(op, &self.array, &other.array)?;
        Ok(Self::mask_from_boolean(result))
    }

    /// Comparison against a scalar value, routed through a one-row Arrow
    /// scalar.
    pub fn compare_scalar(&self, op: CompareOp, value: &Value) -> Result<ByteMask> {
        let scalar = Scalar::new(convert::value_to_array(value)?);
        let result = match op {
            CompareOp::Eq => cmp::eq(&self.array, &scalar)?,
            CompareOp::Ne => cmp::neq(&self.array, &scalar)?,
            CompareOp::Gt => cmp::gt(&self.array, &scalar)?,
            CompareOp::Ge => cmp::gt_eq(&self.array, &scalar)?,
            CompareOp::Lt => cmp::lt(&self.array, &scalar)?,
            CompareOp::Le => cmp::lt_eq(&self.array, &scalar)?,
        };
        Ok(Self::mask_from_boolean(result))
    }

    fn apply_cmp(
        op: CompareOp,
        left: &ArrayRef,
        right: &ArrayRef,
    ) -> Result<arrow::array::BooleanArray> {
        Ok(match op {
            CompareOp::Eq => cmp::eq(left, right)?,
            CompareOp::Ne => cmp::neq(left, right)?,
            CompareOp::Gt => cmp::gt(left, right)?,
            CompareOp::Ge => cmp::gt_eq(left, right)?,
            CompareOp::Lt => cmp::lt(left, right)?,
            CompareOp::Le => cmp::lt_eq(left, right)?,
        })
    }

    /// Row-wise arithmetic with another foreign vector via the generic
    /// Arrow numeric kernels.
    pub fn arith_vector(&self, op: ArithmeticOp, other: &Self) -> Result<Self> {
        if self.len() != other.len() {
            return Err(Error::length_mismatch(self.len(), other.len()));
        }
        let result = match op {
            ArithmeticOp::Add => numeric::add(&self.array, &other.array)?,
            ArithmeticOp::Sub => numeric::sub(&self.array, &other.array)?,
            ArithmeticOp::Mul => numeric::mul(&self.array, &other.array)?,
            ArithmeticOp::Div => numeric::div(&self.array, &other.array)?,
        };
        Ok(Self::new(result))
    }

    /// Re-export the wrapped array untouched.
    pub fn to_arrow(&self) -> ArrayRef {
        self.array.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Decimal128Array, Int64Array};
    use std::sync::Arc;

    fn decimal() -> ForeignVector {
        let arr = Decimal128Array::from(vec![Some(100), None, Some(300)])
            .with_precision_and_scale(10, 2)
            .unwrap();
        ForeignVector::new(Arc::new(arr))
    }

    #[test]
    fn metadata_and_null_mask() {
        let v = decimal();
        assert_eq!(v.len(), 3);
        assert_eq!(v.type_tag(), TypeTag::NonNative);
        assert_eq!(v.null_count(), 1);
        assert_eq!(v.is_null_mask().as_bytes(), &[0, 1, 0]);
    }

    #[test]
    fn take_delegates_to_arrow() {
        let v = decimal();
        let t = v.take(&[2, 1]).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.null_count(), 1);
        assert!(matches!(
            v.take(&[3]),
            Err(Error::IndexOutOfRange { index: 3, length: 3 })
        ));
    }

    #[test]
    fn hash_is_deterministic_with_null_constant() {
        let v = decimal();
        let h = v.hash().unwrap();
        assert_eq!(h[1], NULL_HASH);
        assert_eq!(h, v.hash().unwrap());
        assert_ne!(h[0], h[2]);
    }

    #[test]
    fn compare_vector_null_yields_zero() {
        let v = decimal();
        let w = decimal();
        let eq = v.compare_vector(CompareOp::Eq, &w).unwrap();
        assert_eq!(eq.as_bytes(), &[1, 0, 1]);
    }

    #[test]
    fn value_access_is_unsupported() {
        let v = decimal();
        assert!(matches!(v.value(0), Err(Error::UnsupportedType(_))));
        assert_eq!(v.value(1).unwrap(), Value::Null);
    }

    #[test]
    fn arith_on_wrapped_numeric() {
        let a = ForeignVector::new(Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef);
        let b = ForeignVector::new(Arc::new(Int64Array::from(vec![10, 20, 30])) as ArrayRef);
        let sum = a.arith_vector(ArithmeticOp::Add, &b).unwrap();
        let arr = sum.array();
        let ints = arr.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(ints.values().as_ref(), &[11, 22, 33]);
    }
}
