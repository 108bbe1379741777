//! The polymorphic vector: a tagged sum over the concrete per-type
//! vectors. Element access and kernel dispatch move through the tag; there
//! are no trait objects and no downcasts.

use arrow::array::{Array, ArrayRef};
use arrow::compute::concat;
use draken_result::{Error, Result};
use draken_types::{ArithmeticOp, CompareOp, LogicalOp, TypeTag, Value};

use crate::array::ArrayVector;
use crate::boolean::BoolVector;
use crate::convert;
use crate::foreign::ForeignVector;
use crate::mask::ByteMask;
use crate::primitive::{
    Date32Vector, Float32Vector, Float64Vector, Int8Vector, Int16Vector, Int32Vector, Int64Vector,
    Timestamp64Vector,
};
use crate::string::StringVector;
use crate::Origin;

#[derive(Clone, Debug)]
pub enum Vector {
    Int8(Int8Vector),
    Int16(Int16Vector),
    Int32(Int32Vector),
    Int64(Int64Vector),
    Float32(Float32Vector),
    Float64(Float64Vector),
    Date32(Date32Vector),
    Timestamp64(Timestamp64Vector),
    Bool(BoolVector),
    String(StringVector),
    Array(ArrayVector),
    Foreign(ForeignVector),
}

/// Expand `$body` for every variant, binding the inner vector to `$v`.
macro_rules! dispatch {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            Vector::Int8($v) => $body,
            Vector::Int16($v) => $body,
            Vector::Int32($v) => $body,
            Vector::Int64($v) => $body,
            Vector::Float32($v) => $body,
            Vector::Float64($v) => $body,
            Vector::Date32($v) => $body,
            Vector::Timestamp64($v) => $body,
            Vector::Bool($v) => $body,
            Vector::String($v) => $body,
            Vector::Array($v) => $body,
            Vector::Foreign($v) => $body,
        }
    };
}

/// Like `dispatch!`, rewrapping the result into the same variant.
macro_rules! dispatch_wrap {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            Vector::Int8($v) => Vector::Int8($body),
            Vector::Int16($v) => Vector::Int16($body),
            Vector::Int32($v) => Vector::Int32($body),
            Vector::Int64($v) => Vector::Int64($body),
            Vector::Float32($v) => Vector::Float32($body),
            Vector::Float64($v) => Vector::Float64($body),
            Vector::Date32($v) => Vector::Date32($body),
            Vector::Timestamp64($v) => Vector::Timestamp64($body),
            Vector::Bool($v) => Vector::Bool($body),
            Vector::String($v) => Vector::String($body),
            Vector::Array($v) => Vector::Array($body),
            Vector::Foreign($v) => Vector::Foreign($body),
        }
    };
}

/// Expand `$body` for the numeric variants only, with a fallthrough arm.
macro_rules! dispatch_numeric_pairs {
    ($left:expr, $right:expr, $a:ident, $b:ident => $body:expr, $fallback:expr) => {
        match ($left, $right) {
            (Vector::Int8($a), Vector::Int8($b)) => $body,
            (Vector::Int16($a), Vector::Int16($b)) => $body,
            (Vector::Int32($a), Vector::Int32($b)) => $body,
            (Vector::Int64($a), Vector::Int64($b)) => $body,
            (Vector::Float32($a), Vector::Float32($b)) => $body,
            (Vector::Float64($a), Vector::Float64($b)) => $body,
            _ => $fallback,
        }
    };
}

impl Vector {
    /// Wrap an Arrow array zero-copy; unmapped types become borrowed
    /// [`ForeignVector`]s rather than errors.
    pub fn from_arrow(array: &ArrayRef) -> Result<Vector> {
        convert::import(array)
    }

    /// Combine chunked input into one contiguous array, then wrap it.
    pub fn from_chunks(chunks: &[ArrayRef]) -> Result<Vector> {
        match chunks {
            [] => Err(Error::UnsupportedType(
                "cannot build a vector from zero chunks".into(),
            )),
            [single] => Self::from_arrow(single),
            many => {
                let parts: Vec<&dyn Array> = many.iter().map(|c| c.as_ref()).collect();
                let merged = concat(&parts)?;
                tracing::trace!(
                    chunks = many.len(),
                    rows = merged.len(),
                    "combined chunked input before wrapping"
                );
                Self::from_arrow(&merged)
            }
        }
    }

    pub fn len(&self) -> usize {
        dispatch!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_tag(&self) -> TypeTag {
        dispatch!(self, v => v.type_tag())
    }

    pub fn origin(&self) -> Origin {
        dispatch!(self, v => v.origin())
    }

    pub fn null_count(&self) -> usize {
        dispatch!(self, v => v.null_count())
    }

    /// Whether row `i` is null. Panics when `i` is out of range.
    pub fn is_null(&self, i: usize) -> bool {
        dispatch!(self, v => v.is_null(i))
    }

    /// Per-row null flags as bytes, 1 = null.
    pub fn is_null_mask(&self) -> ByteMask {
        dispatch!(self, v => v.is_null_mask())
    }

    /// The scalar at row `i`. Non-native columns cannot materialize
    /// scalars and return `UnsupportedType` for valid rows.
    pub fn value(&self, i: usize) -> Result<Value> {
        dispatch!(self, v => v.value(i))
    }

    /// Gather rows at `indices` into a new owned vector of the same type.
    pub fn take(&self, indices: &[i32]) -> Result<Vector> {
        Ok(dispatch_wrap!(self, v => v.take(indices)?))
    }

    /// 64-bit row hashes; nulls map to [`draken_types::NULL_HASH`].
    pub fn hash(&self) -> Result<Vec<u64>> {
        match self {
            Vector::Array(v) => v.hash(),
            Vector::Foreign(v) => v.hash(),
            Vector::Int8(v) => Ok(v.hash()),
            Vector::Int16(v) => Ok(v.hash()),
            Vector::Int32(v) => Ok(v.hash()),
            Vector::Int64(v) => Ok(v.hash()),
            Vector::Float32(v) => Ok(v.hash()),
            Vector::Float64(v) => Ok(v.hash()),
            Vector::Date32(v) => Ok(v.hash()),
            Vector::Timestamp64(v) => Ok(v.hash()),
            Vector::Bool(v) => Ok(v.hash()),
            Vector::String(v) => Ok(v.hash()),
        }
    }

    /// Export as an Arrow array sharing this vector's buffers.
    pub fn to_arrow(&self) -> ArrayRef {
        dispatch!(self, v => v.to_arrow())
    }

    /// Compare every row against a scalar [`Value`] of the same logical
    /// type. A null scalar compares as unknown: the mask is all zeros.
    pub fn compare_scalar(&self, op: CompareOp, value: &Value) -> Result<ByteMask> {
        if value.is_null() {
            return Ok(ByteMask::zeros(self.len()));
        }
        let mismatch = || {
            Error::UnsupportedType(format!(
                "cannot compare a {} vector against a {:?} scalar",
                self.type_tag(),
                value
            ))
        };
        match self {
            Vector::Int8(v) => v.compare_value(op, value),
            Vector::Int16(v) => v.compare_value(op, value),
            Vector::Int32(v) => v.compare_value(op, value),
            Vector::Int64(v) => v.compare_value(op, value),
            Vector::Float32(v) => v.compare_value(op, value),
            Vector::Float64(v) => v.compare_value(op, value),
            Vector::Date32(v) => v.compare_value(op, value),
            Vector::Timestamp64(v) => v.compare_value(op, value),
            Vector::Bool(v) => match (op, value) {
                (CompareOp::Eq, Value::Bool(b)) => Ok(v.equals(*b)),
                (CompareOp::Ne, Value::Bool(b)) => Ok(v.equals(!*b)),
                (_, Value::Bool(_)) => Err(Error::UnsupportedType(format!(
                    "comparison {op} is not defined for bool vectors"
                ))),
                _ => Err(mismatch()),
            },
            Vector::String(v) => match value {
                Value::Bytes(b) => Ok(v.compare_scalar(op, b)),
                _ => Err(mismatch()),
            },
            Vector::Array(_) => Err(Error::UnsupportedType(
                "array vectors do not support scalar comparison".into(),
            )),
            Vector::Foreign(v) => v.compare_scalar(op, value),
        }
    }

    /// Row-wise comparison with another vector of the same logical type.
    pub fn compare_vector(&self, op: CompareOp, other: &Vector) -> Result<ByteMask> {
        match (self, other) {
            (Vector::Int8(a), Vector::Int8(b)) => a.compare_vector(op, b),
            (Vector::Int16(a), Vector::Int16(b)) => a.compare_vector(op, b),
            (Vector::Int32(a), Vector::Int32(b)) => a.compare_vector(op, b),
            (Vector::Int64(a), Vector::Int64(b)) => a.compare_vector(op, b),
            (Vector::Float32(a), Vector::Float32(b)) => a.compare_vector(op, b),
            (Vector::Float64(a), Vector::Float64(b)) => a.compare_vector(op, b),
            (Vector::Date32(a), Vector::Date32(b)) => a.compare_vector(op, b),
            (Vector::Timestamp64(a), Vector::Timestamp64(b)) => a.compare_vector(op, b),
            (Vector::Bool(a), Vector::Bool(b)) => a.compare_vector(op, b),
            (Vector::String(a), Vector::String(b)) => a.compare_vector(op, b),
            (Vector::Foreign(a), Vector::Foreign(b)) => a.compare_vector(op, b),
            (a, b) => Err(Error::UnsupportedType(format!(
                "cannot compare {} vector with {} vector",
                a.type_tag(),
                b.type_tag()
            ))),
        }
    }

    /// Element-wise arithmetic against a scalar of the same numeric type.
    /// A null scalar yields an all-null vector of this type.
    pub fn arith_scalar(&self, op: ArithmeticOp, value: &Value) -> Result<Vector> {
        match self {
            Vector::Int8(v) => Ok(Vector::Int8(v.arith_value(op, value)?)),
            Vector::Int16(v) => Ok(Vector::Int16(v.arith_value(op, value)?)),
            Vector::Int32(v) => Ok(Vector::Int32(v.arith_value(op, value)?)),
            Vector::Int64(v) => Ok(Vector::Int64(v.arith_value(op, value)?)),
            Vector::Float32(v) => Ok(Vector::Float32(v.arith_value(op, value)?)),
            Vector::Float64(v) => Ok(Vector::Float64(v.arith_value(op, value)?)),
            _ => Err(Error::UnsupportedType(format!(
                "arithmetic {op} requires a numeric vector, got {}",
                self.type_tag()
            ))),
        }
    }

    /// Element-wise arithmetic with another vector of the same numeric
    /// type.
    pub fn arith_vector(&self, op: ArithmeticOp, other: &Vector) -> Result<Vector> {
        dispatch_numeric_pairs!(self, other, a, b => Ok(Vector::from(a.arith_vector(op, b)?)),
            match (self, other) {
                (Vector::Foreign(a), Vector::Foreign(b)) => {
                    Ok(Vector::Foreign(a.arith_vector(op, b)?))
                }
                (a, b) => Err(Error::UnsupportedType(format!(
                    "arithmetic {op} is not defined between {} and {} vectors",
                    a.type_tag(),
                    b.type_tag()
                ))),
            })
    }

    /// Bitwise logic between two boolean vectors.
    pub fn logical_vector(&self, op: LogicalOp, other: &Vector) -> Result<Vector> {
        match (self, other) {
            (Vector::Bool(a), Vector::Bool(b)) => Ok(Vector::Bool(a.logical(op, b)?)),
            (a, b) => Err(Error::UnsupportedType(format!(
                "boolean {op} requires bool vectors, got {} and {}",
                a.type_tag(),
                b.type_tag()
            ))),
        }
    }

    pub fn as_bool(&self) -> Option<&BoolVector> {
        match self {
            Vector::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&StringVector> {
        match self {
            Vector::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int64(&self) -> Option<&Int64Vector> {
        match self {
            Vector::Int64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float64(&self) -> Option<&Float64Vector> {
        match self {
            Vector::Float64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayVector> {
        match self {
            Vector::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_foreign(&self) -> Option<&ForeignVector> {
        match self {
            Vector::Foreign(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! vector_from {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Vector {
            fn from(v: $ty) -> Vector {
                Vector::$variant(v)
            }
        }
    };
}

vector_from!(Int8Vector, Int8);
vector_from!(Int16Vector, Int16);
vector_from!(Int32Vector, Int32);
vector_from!(Int64Vector, Int64);
vector_from!(Float32Vector, Float32);
vector_from!(Float64Vector, Float64);
vector_from!(Date32Vector, Date32);
vector_from!(Timestamp64Vector, Timestamp64);
vector_from!(BoolVector, Bool);
vector_from!(StringVector, String);
vector_from!(ArrayVector, Array);
vector_from!(ForeignVector, Foreign);
