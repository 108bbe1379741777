//! Fixed-width vectors.
//!
//! One generic [`PrimitiveVector<T>`] covers every fixed-width logical type
//! through small marker types, the same shape as Arrow's
//! `ArrowPrimitiveType` machinery. The markers pin the logical tag, the
//! export data type, and the handful of native operations the kernels need.

use std::fmt;
use std::sync::Arc;

use arrow::array::{
    ArrayData, ArrayRef, Date32Array, Float32Array, Float64Array, Int8Array, Int16Array,
    Int32Array, Int64Array, TimestampMicrosecondArray,
};
use arrow_buffer::builder::BooleanBufferBuilder;
use arrow_buffer::{ArrowNativeType, NullBuffer, ScalarBuffer};
use arrow_schema::{DataType, TimeUnit};
use draken_result::{Error, Result};
use draken_types::{ArithmeticOp, CompareOp, TypeTag, Value, NULL_HASH};

use crate::bitmap;
use crate::hash::fnv1a;
use crate::mask::ByteMask;
use crate::Origin;

mod sealed {
    pub trait Sealed {}
}

/// A fixed-width logical type: native representation plus the constants and
/// native ops its kernels need. Implemented only by the marker types below.
pub trait VectorPrimitive: sealed::Sealed + Send + Sync + 'static {
    type Native: ArrowNativeType + PartialOrd + Copy + Default + fmt::Debug;
    type Bytes: AsRef<[u8]>;

    const TYPE_TAG: TypeTag;
    const FLOAT: bool;

    /// Arrow type produced on export.
    fn data_type() -> DataType;

    /// Little-endian representation, fed to the hash accumulator.
    fn le_bytes(value: Self::Native) -> Self::Bytes;

    fn add(a: Self::Native, b: Self::Native) -> Self::Native;
    fn sub(a: Self::Native, b: Self::Native) -> Self::Native;
    fn mul(a: Self::Native, b: Self::Native) -> Self::Native;
    /// Integer callers must reject a zero divisor first.
    fn div(a: Self::Native, b: Self::Native) -> Self::Native;
    fn is_zero(value: Self::Native) -> bool;

    fn to_value(value: Self::Native) -> Value;
    /// Strict extraction: the value must carry this exact logical type.
    fn native_of(value: &Value) -> Option<Self::Native>;

    fn make_array(values: ScalarBuffer<Self::Native>, validity: Option<NullBuffer>) -> ArrayRef;
}

macro_rules! integer_primitive {
    ($marker:ident, $native:ty, $width:literal, $tag:expr, $dt:expr, $array:ty, $variant:ident) => {
        #[derive(Debug)]
        pub struct $marker;

        impl sealed::Sealed for $marker {}

        impl VectorPrimitive for $marker {
            type Native = $native;
            type Bytes = [u8; $width];

            const TYPE_TAG: TypeTag = $tag;
            const FLOAT: bool = false;

            fn data_type() -> DataType {
                $dt
            }

            fn le_bytes(value: $native) -> [u8; $width] {
                value.to_le_bytes()
            }

            fn add(a: $native, b: $native) -> $native {
                a.wrapping_add(b)
            }

            fn sub(a: $native, b: $native) -> $native {
                a.wrapping_sub(b)
            }

            fn mul(a: $native, b: $native) -> $native {
                a.wrapping_mul(b)
            }

            fn div(a: $native, b: $native) -> $native {
                a.wrapping_div(b)
            }

            fn is_zero(value: $native) -> bool {
                value == 0
            }

            fn to_value(value: $native) -> Value {
                Value::$variant(value)
            }

            fn native_of(value: &Value) -> Option<$native> {
                match value {
                    Value::$variant(v) => Some(*v),
                    _ => None,
                }
            }

            fn make_array(
                values: ScalarBuffer<$native>,
                validity: Option<NullBuffer>,
            ) -> ArrayRef {
                Arc::new(<$array>::new(values, validity))
            }
        }
    };
}

macro_rules! float_primitive {
    ($marker:ident, $native:ty, $width:literal, $tag:expr, $dt:expr, $array:ty, $variant:ident) => {
        #[derive(Debug)]
        pub struct $marker;

        impl sealed::Sealed for $marker {}

        impl VectorPrimitive for $marker {
            type Native = $native;
            type Bytes = [u8; $width];

            const TYPE_TAG: TypeTag = $tag;
            const FLOAT: bool = true;

            fn data_type() -> DataType {
                $dt
            }

            fn le_bytes(value: $native) -> [u8; $width] {
                value.to_le_bytes()
            }

            fn add(a: $native, b: $native) -> $native {
                a + b
            }

            fn sub(a: $native, b: $native) -> $native {
                a - b
            }

            fn mul(a: $native, b: $native) -> $native {
                a * b
            }

            fn div(a: $native, b: $native) -> $native {
                a / b
            }

            fn is_zero(value: $native) -> bool {
                value == 0.0
            }

            fn to_value(value: $native) -> Value {
                Value::$variant(value)
            }

            fn native_of(value: &Value) -> Option<$native> {
                match value {
                    Value::$variant(v) => Some(*v),
                    _ => None,
                }
            }

            fn make_array(
                values: ScalarBuffer<$native>,
                validity: Option<NullBuffer>,
            ) -> ArrayRef {
                Arc::new(<$array>::new(values, validity))
            }
        }
    };
}

integer_primitive!(Int8Type, i8, 1, TypeTag::Int8, DataType::Int8, Int8Array, Int8);
integer_primitive!(Int16Type, i16, 2, TypeTag::Int16, DataType::Int16, Int16Array, Int16);
integer_primitive!(Int32Type, i32, 4, TypeTag::Int32, DataType::Int32, Int32Array, Int32);
integer_primitive!(Int64Type, i64, 8, TypeTag::Int64, DataType::Int64, Int64Array, Int64);
integer_primitive!(
    Date32Type,
    i32,
    4,
    TypeTag::Date32,
    DataType::Date32,
    Date32Array,
    Date32
);
integer_primitive!(
    Timestamp64Type,
    i64,
    8,
    TypeTag::Timestamp64,
    DataType::Timestamp(TimeUnit::Microsecond, None),
    TimestampMicrosecondArray,
    Timestamp64
);
float_primitive!(
    Float32Type,
    f32,
    4,
    TypeTag::Float32,
    DataType::Float32,
    Float32Array,
    Float32
);
float_primitive!(
    Float64Type,
    f64,
    8,
    TypeTag::Float64,
    DataType::Float64,
    Float64Array,
    Float64
);

pub type Int8Vector = PrimitiveVector<Int8Type>;
pub type Int16Vector = PrimitiveVector<Int16Type>;
pub type Int32Vector = PrimitiveVector<Int32Type>;
pub type Int64Vector = PrimitiveVector<Int64Type>;
pub type Float32Vector = PrimitiveVector<Float32Type>;
pub type Float64Vector = PrimitiveVector<Float64Type>;
pub type Date32Vector = PrimitiveVector<Date32Type>;
pub type Timestamp64Vector = PrimitiveVector<Timestamp64Type>;

/// A fixed-width vector: contiguous native values plus an optional validity
/// bitmap. Buffers are refcounted, so cloning is cheap and kernels never
/// copy their inputs.
pub struct PrimitiveVector<T: VectorPrimitive> {
    values: ScalarBuffer<T::Native>,
    validity: Option<NullBuffer>,
    origin: Origin,
}

impl<T: VectorPrimitive> Clone for PrimitiveVector<T> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            validity: self.validity.clone(),
            origin: self.origin,
        }
    }
}

impl<T: VectorPrimitive> fmt::Debug for PrimitiveVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveVector")
            .field("type", &T::TYPE_TAG)
            .field("len", &self.len())
            .field("null_count", &self.null_count())
            .field("origin", &self.origin)
            .finish()
    }
}

impl<T: VectorPrimitive> PrimitiveVector<T> {
    pub fn new(
        values: ScalarBuffer<T::Native>,
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

    /// An owned vector with no nulls.
    pub fn from_values(values: Vec<T::Native>) -> Self {
        Self {
            values: values.into(),
            validity: None,
            origin: Origin::Owned,
        }
    }

    /// An owned vector from optional values; the bitmap is omitted when no
    /// null was seen.
    pub fn from_options(values: impl IntoIterator<Item = Option<T::Native>>) -> Self {
        let iter = values.into_iter();
        let mut data = Vec::with_capacity(iter.size_hint().0);
        let mut bits = BooleanBufferBuilder::new(iter.size_hint().0);
        let mut any_null = false;
        for value in iter {
            match value {
                Some(v) => {
                    data.push(v);
                    bits.append(true);
                }
                None => {
                    data.push(T::Native::default());
                    bits.append(false);
                    any_null = true;
                }
            }
        }
        let validity = any_null.then(|| NullBuffer::new(bits.finish()));
        Self {
            values: data.into(),
            validity,
            origin: Origin::Owned,
        }
    }

    /// Zero-copy wrap of an imported Arrow array's data, offset-adjusted.
    pub(crate) fn from_array_data(data: &ArrayData) -> Self {
        let values = ScalarBuffer::new(data.buffers()[0].clone(), data.offset(), data.len());
        Self {
            values,
            validity: data.nulls().cloned(),
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
        T::TYPE_TAG
    }

    #[inline]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn values(&self) -> &[T::Native] {
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

    /// The native value at `i`, `None` when null. Panics out of range.
    pub fn get(&self, i: usize) -> Option<T::Native> {
        (!self.is_null(i)).then(|| self.values[i])
    }

    pub fn value(&self, i: usize) -> Result<Value> {
        if i >= self.len() {
            return Err(Error::index_out_of_range(i as i64, self.len()));
        }
        Ok(match self.get(i) {
            None => Value::Null,
            Some(v) => T::to_value(v),
        })
    }

    pub fn is_null_mask(&self) -> ByteMask {
        ByteMask::new(bitmap::null_mask_bytes(self.len(), self.validity.as_ref()))
    }

    /// Gather rows at `indices` into a new owned vector.
    pub fn take(&self, indices: &[i32]) -> Result<Self> {
        let len = self.len();
        let mut out = Vec::with_capacity(indices.len());
        for &raw in indices {
            if raw < 0 || raw as usize >= len {
                return Err(Error::index_out_of_range(i64::from(raw), len));
            }
            out.push(self.values[raw as usize]);
        }
        Ok(Self {
            values: out.into(),
            validity: bitmap::take_validity(self.validity.as_ref(), indices),
            origin: Origin::Owned,
        })
    }

    /// Row hashes: FNV-1a over the little-endian value bytes, the null
    /// constant for null rows.
    pub fn hash(&self) -> Vec<u64> {
        (0..self.len())
            .map(|i| match self.get(i) {
                None => NULL_HASH,
                Some(v) => fnv1a(T::le_bytes(v).as_ref()),
            })
            .collect()
    }

    fn cmp_matches(op: CompareOp, a: T::Native, b: T::Native) -> bool {
        match a.partial_cmp(&b) {
            Some(ord) => op.matches(ord),
            // Unordered operands (float NaN): only `!=` holds, per IEEE-754.
            None => op == CompareOp::Ne,
        }
    }

    /// Compare every row against a scalar. Null rows yield 0.
    pub fn compare_scalar(&self, op: CompareOp, rhs: T::Native) -> ByteMask {
        ByteMask::from_bools((0..self.len()).map(|i| match self.get(i) {
            None => false,
            Some(v) => Self::cmp_matches(op, v, rhs),
        }))
    }

    /// Row-wise comparison with another vector of the same type. A null on
    /// either side yields 0.
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

    pub fn equals(&self, rhs: T::Native) -> ByteMask {
        self.compare_scalar(CompareOp::Eq, rhs)
    }

    pub fn not_equals(&self, rhs: T::Native) -> ByteMask {
        self.compare_scalar(CompareOp::Ne, rhs)
    }

    pub fn greater_than(&self, rhs: T::Native) -> ByteMask {
        self.compare_scalar(CompareOp::Gt, rhs)
    }

    pub fn greater_than_or_equals(&self, rhs: T::Native) -> ByteMask {
        self.compare_scalar(CompareOp::Ge, rhs)
    }

    pub fn less_than(&self, rhs: T::Native) -> ByteMask {
        self.compare_scalar(CompareOp::Lt, rhs)
    }

    pub fn less_than_or_equals(&self, rhs: T::Native) -> ByteMask {
        self.compare_scalar(CompareOp::Le, rhs)
    }

    pub fn equals_vector(&self, other: &Self) -> Result<ByteMask> {
        self.compare_vector(CompareOp::Eq, other)
    }

    pub fn not_equals_vector(&self, other: &Self) -> Result<ByteMask> {
        self.compare_vector(CompareOp::Ne, other)
    }

    pub fn greater_than_vector(&self, other: &Self) -> Result<ByteMask> {
        self.compare_vector(CompareOp::Gt, other)
    }

    pub fn greater_than_or_equals_vector(&self, other: &Self) -> Result<ByteMask> {
        self.compare_vector(CompareOp::Ge, other)
    }

    pub fn less_than_vector(&self, other: &Self) -> Result<ByteMask> {
        self.compare_vector(CompareOp::Lt, other)
    }

    pub fn less_than_or_equals_vector(&self, other: &Self) -> Result<ByteMask> {
        self.compare_vector(CompareOp::Le, other)
    }

    fn apply_arith(op: ArithmeticOp, a: T::Native, b: T::Native) -> Option<T::Native> {
        if op == ArithmeticOp::Div && !T::FLOAT && T::is_zero(b) {
            return None;
        }
        Some(match op {
            ArithmeticOp::Add => T::add(a, b),
            ArithmeticOp::Sub => T::sub(a, b),
            ArithmeticOp::Mul => T::mul(a, b),
            ArithmeticOp::Div => T::div(a, b),
        })
    }

    /// Element-wise arithmetic against a scalar. Integer overflow wraps;
    /// integer division by zero stamps a null; floats follow IEEE-754.
    pub fn arith_scalar(&self, op: ArithmeticOp, rhs: T::Native) -> Self {
        Self::from_options(
            (0..self.len()).map(|i| self.get(i).and_then(|a| Self::apply_arith(op, a, rhs))),
        )
    }

    /// Element-wise arithmetic with another vector of the same type. Null
    /// propagates: a null on either side nulls the output row.
    pub fn arith_vector(&self, op: ArithmeticOp, other: &Self) -> Result<Self> {
        if self.len() != other.len() {
            return Err(Error::length_mismatch(self.len(), other.len()));
        }
        Ok(Self::from_options((0..self.len()).map(|i| {
            match (self.get(i), other.get(i)) {
                (Some(a), Some(b)) => Self::apply_arith(op, a, b),
                _ => None,
            }
        })))
    }

    /// Compare against a scalar [`Value`], which must carry this vector's
    /// exact logical type. A null scalar compares as unknown: all zeros.
    pub fn compare_value(&self, op: CompareOp, value: &Value) -> Result<ByteMask> {
        if value.is_null() {
            return Ok(ByteMask::zeros(self.len()));
        }
        match T::native_of(value) {
            Some(rhs) => Ok(self.compare_scalar(op, rhs)),
            None => Err(Error::UnsupportedType(format!(
                "cannot compare a {} vector against a {:?} scalar",
                T::TYPE_TAG,
                value
            ))),
        }
    }

    /// Arithmetic against a scalar [`Value`] of this vector's exact
    /// logical type. A null scalar yields an all-null vector.
    pub fn arith_value(&self, op: ArithmeticOp, value: &Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::from_options((0..self.len()).map(|_| None)));
        }
        match T::native_of(value) {
            Some(rhs) => Ok(self.arith_scalar(op, rhs)),
            None => Err(Error::UnsupportedType(format!(
                "arithmetic {op} is not defined between a {} vector and a {:?} scalar",
                T::TYPE_TAG,
                value
            ))),
        }
    }

    /// Sum of the valid values, `None` when there are none. Integer
    /// overflow wraps (two's complement).
    pub fn sum(&self) -> Option<T::Native> {
        let mut acc: Option<T::Native> = None;
        for i in 0..self.len() {
            if let Some(v) = self.get(i) {
                acc = Some(match acc {
                    None => v,
                    Some(a) => T::add(a, v),
                });
            }
        }
        acc
    }

    /// Smallest valid value. A float NaN is returned only when every valid
    /// value is NaN.
    pub fn min(&self) -> Option<T::Native> {
        self.fold_extreme(CompareOp::Lt)
    }

    /// Largest valid value, with the same NaN-last rule as `min`.
    pub fn max(&self) -> Option<T::Native> {
        self.fold_extreme(CompareOp::Gt)
    }

    // `x != x` is the generic NaN probe; it is always false for integers.
    #[allow(clippy::eq_op)]
    fn fold_extreme(&self, keep_if: CompareOp) -> Option<T::Native> {
        let mut acc: Option<T::Native> = None;
        for i in 0..self.len() {
            let Some(v) = self.get(i) else { continue };
            acc = Some(match acc {
                None => v,
                Some(a) => {
                    if a != a {
                        // NaN accumulator loses to any ordered value.
                        v
                    } else if v == v && Self::cmp_matches(keep_if, v, a) {
                        v
                    } else {
                        a
                    }
                }
            });
        }
        acc
    }

    /// Export as an Arrow array sharing this vector's buffers.
    pub fn to_arrow(&self) -> ArrayRef {
        T::make_array(self.values.clone(), self.validity.clone())
    }
}
