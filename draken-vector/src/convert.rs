//! Arrow type mapping and zero-copy import.
//!
//! Import clones the source array's refcounted buffers, never the data,
//! and the clones double as the keep-alive handles. Types outside the
//! native set wrap as [`ForeignVector`]s instead of failing.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BinaryArray, BooleanArray, Date32Array, LargeBinaryArray, LargeListArray,
    LargeStringArray, ListArray, StringArray, TimestampMicrosecondArray,
};
use arrow_buffer::{OffsetBuffer, ScalarBuffer};
use arrow_schema::DataType;
use draken_result::{Error, Result};
use draken_types::{TypeTag, Value};

use crate::array::ArrayVector;
use crate::boolean::BoolVector;
use crate::foreign::ForeignVector;
use crate::primitive::{
    Date32Type, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type,
    PrimitiveVector, Timestamp64Type,
};
use crate::string::StringVector;
use crate::vector::Vector;
use crate::Origin;

/// The authoritative Arrow → Draken type mapping.
pub fn type_tag_for(data_type: &DataType) -> TypeTag {
    match data_type {
        DataType::Int8 => TypeTag::Int8,
        DataType::Int16 => TypeTag::Int16,
        DataType::Int32 => TypeTag::Int32,
        DataType::Int64 => TypeTag::Int64,
        DataType::Float32 => TypeTag::Float32,
        DataType::Float64 => TypeTag::Float64,
        DataType::Date32 => TypeTag::Date32,
        DataType::Timestamp(_, _) => TypeTag::Timestamp64,
        DataType::Boolean => TypeTag::Bool,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Binary | DataType::LargeBinary => {
            TypeTag::String
        }
        DataType::List(_) | DataType::LargeList(_) => TypeTag::Array,
        _ => TypeTag::NonNative,
    }
}

/// Wrap an Arrow array as a borrowed vector without copying data.
pub(crate) fn import(array: &ArrayRef) -> Result<Vector> {
    Ok(match array.data_type() {
        DataType::Int8 => Vector::Int8(fixed::<Int8Type>(array)),
        DataType::Int16 => Vector::Int16(fixed::<Int16Type>(array)),
        DataType::Int32 => Vector::Int32(fixed::<Int32Type>(array)),
        DataType::Int64 => Vector::Int64(fixed::<Int64Type>(array)),
        DataType::Float32 => Vector::Float32(fixed::<Float32Type>(array)),
        DataType::Float64 => Vector::Float64(fixed::<Float64Type>(array)),
        DataType::Date32 => Vector::Date32(fixed::<Date32Type>(array)),
        DataType::Timestamp(unit, tz) => {
            // The raw i64 payload is wrapped as-is; unit and zone metadata
            // are dropped and export re-labels the values as microseconds.
            tracing::trace!(?unit, ?tz, "importing timestamp; unit metadata dropped");
            Vector::Timestamp64(fixed::<Timestamp64Type>(array))
        }
        DataType::Boolean => {
            let source = array
                .as_any()
                .downcast_ref::<BooleanArray>()
                .expect("boolean array");
            Vector::Bool(BoolVector::from_parts_borrowed(
                source.values().clone(),
                source.nulls().cloned(),
            ))
        }
        DataType::Utf8 => {
            let source = array
                .as_any()
                .downcast_ref::<StringArray>()
                .expect("utf8 array");
            Vector::String(StringVector::try_new(
                source.offsets().clone(),
                source.values().clone(),
                source.nulls().cloned(),
                Origin::Arrow,
            )?)
        }
        DataType::Binary => {
            let source = array
                .as_any()
                .downcast_ref::<BinaryArray>()
                .expect("binary array");
            Vector::String(StringVector::try_new(
                source.offsets().clone(),
                source.values().clone(),
                source.nulls().cloned(),
                Origin::Arrow,
            )?)
        }
        DataType::LargeUtf8 => {
            let source = array
                .as_any()
                .downcast_ref::<LargeStringArray>()
                .expect("large utf8 array");
            Vector::String(StringVector::try_new(
                narrow_offsets(source.offsets())?,
                source.values().clone(),
                source.nulls().cloned(),
                Origin::Arrow,
            )?)
        }
        DataType::LargeBinary => {
            let source = array
                .as_any()
                .downcast_ref::<LargeBinaryArray>()
                .expect("large binary array");
            Vector::String(StringVector::try_new(
                narrow_offsets(source.offsets())?,
                source.values().clone(),
                source.nulls().cloned(),
                Origin::Arrow,
            )?)
        }
        DataType::List(_) => {
            let source = array
                .as_any()
                .downcast_ref::<ListArray>()
                .expect("list array");
            let child = import(source.values())?;
            Vector::Array(ArrayVector::try_new(
                source.offsets().clone(),
                Arc::new(child),
                source.nulls().cloned(),
                Origin::Arrow,
            )?)
        }
        DataType::LargeList(_) => {
            let source = array
                .as_any()
                .downcast_ref::<LargeListArray>()
                .expect("large list array");
            let child = import(source.values())?;
            Vector::Array(ArrayVector::try_new(
                narrow_offsets(source.offsets())?,
                Arc::new(child),
                source.nulls().cloned(),
                Origin::Arrow,
            )?)
        }
        other => {
            tracing::warn!(%other, "no native vector for arrow type; delegating to arrow compute");
            Vector::Foreign(ForeignVector::new(array.clone()))
        }
    })
}

/// Zero-copy wrap of a fixed-width array's value buffer.
fn fixed<T: crate::primitive::VectorPrimitive>(array: &ArrayRef) -> PrimitiveVector<T> {
    PrimitiveVector::<T>::from_array_data(&array.to_data())
}

/// Narrow 64-bit offsets to the native 32-bit form. The data buffer stays
/// shared; only the offsets are rewritten.
fn narrow_offsets(offsets: &OffsetBuffer<i64>) -> Result<OffsetBuffer<i32>> {
    let mut narrowed = Vec::with_capacity(offsets.len());
    for &offset in offsets.iter() {
        if offset > i32::MAX as i64 {
            return Err(Error::InvalidOffset(format!(
                "offset {offset} exceeds the 32-bit range"
            )));
        }
        narrowed.push(offset as i32);
    }
    Ok(OffsetBuffer::new(ScalarBuffer::from(narrowed)))
}

/// A one-row Arrow array carrying `value`, for scalar operands of the
/// delegated compute kernels.
pub(crate) fn value_to_array(value: &Value) -> Result<ArrayRef> {
    Ok(match value {
        Value::Int8(v) => Arc::new(arrow::array::Int8Array::from(vec![*v])),
        Value::Int16(v) => Arc::new(arrow::array::Int16Array::from(vec![*v])),
        Value::Int32(v) => Arc::new(arrow::array::Int32Array::from(vec![*v])),
        Value::Int64(v) => Arc::new(arrow::array::Int64Array::from(vec![*v])),
        Value::Float32(v) => Arc::new(arrow::array::Float32Array::from(vec![*v])),
        Value::Float64(v) => Arc::new(arrow::array::Float64Array::from(vec![*v])),
        Value::Date32(v) => Arc::new(Date32Array::from(vec![*v])),
        Value::Timestamp64(v) => Arc::new(TimestampMicrosecondArray::from(vec![*v])),
        Value::Bool(v) => Arc::new(BooleanArray::from(vec![*v])),
        Value::Bytes(v) => Arc::new(BinaryArray::from(vec![v.as_slice()])),
        Value::Null | Value::List(_) => {
            return Err(Error::UnsupportedType(format!(
                "no scalar arrow representation for {value:?}"
            )));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::TimeUnit;

    #[test]
    fn mapping_table() {
        assert_eq!(type_tag_for(&DataType::Int8), TypeTag::Int8);
        assert_eq!(type_tag_for(&DataType::Int64), TypeTag::Int64);
        assert_eq!(type_tag_for(&DataType::Float64), TypeTag::Float64);
        assert_eq!(type_tag_for(&DataType::Date32), TypeTag::Date32);
        assert_eq!(
            type_tag_for(&DataType::Timestamp(TimeUnit::Nanosecond, None)),
            TypeTag::Timestamp64
        );
        assert_eq!(type_tag_for(&DataType::Boolean), TypeTag::Bool);
        assert_eq!(type_tag_for(&DataType::Utf8), TypeTag::String);
        assert_eq!(type_tag_for(&DataType::LargeBinary), TypeTag::String);
        assert_eq!(
            type_tag_for(&DataType::List(Arc::new(arrow::datatypes::Field::new(
                "item",
                DataType::Int64,
                true
            )))),
            TypeTag::Array
        );
        assert_eq!(type_tag_for(&DataType::Decimal128(10, 2)), TypeTag::NonNative);
        assert_eq!(type_tag_for(&DataType::Date64), TypeTag::NonNative);
    }
}
