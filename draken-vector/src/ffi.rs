//! The Arrow C Data Interface boundary.
//!
//! Export hands out `ArrowArray`/`ArrowSchema` descriptor structs whose
//! buffers are the vector's own refcounted buffers; the descriptors'
//! release callbacks free only the descriptor allocations and the
//! `buffers` array, never the data regions. Import takes ownership of a
//! foreign descriptor pair and wraps the data zero-copy, keeping the
//! foreign buffers alive through the consumed descriptor. Both directions
//! ride on `arrow::ffi`, which implements the release-callback discipline
//! of the interface.

use arrow::array::{make_array, Array, ArrayRef};
use arrow::ffi::{from_ffi, to_ffi, FFI_ArrowArray, FFI_ArrowSchema};
use draken_result::Result;

use crate::vector::Vector;

/// Export a vector as a C Data Interface descriptor pair.
///
/// The returned structs can be handed to any Arrow consumer in this or
/// another runtime; the vector's buffers stay alive until both the vector
/// and every importer have released them.
pub fn export(vector: &Vector) -> Result<(FFI_ArrowArray, FFI_ArrowSchema)> {
    let array = vector.to_arrow();
    let (ffi_array, ffi_schema) = to_ffi(&array.to_data())?;
    tracing::trace!(rows = array.len(), tag = %vector.type_tag(), "exported vector over the c data interface");
    Ok((ffi_array, ffi_schema))
}

/// Import a C Data Interface descriptor pair as a borrowed vector.
///
/// Consumes the `ArrowArray` (its release callback fires when the last
/// reference to the imported buffers drops) and reads the schema.
#[allow(unsafe_code)]
pub fn import(array: FFI_ArrowArray, schema: &FFI_ArrowSchema) -> Result<Vector> {
    let data = unsafe { from_ffi(array, schema) }?;
    let array: ArrayRef = make_array(data);
    Vector::from_arrow(&array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Int64Vector;
    use crate::string::StringVector;
    use crate::Origin;
    use draken_types::{TypeTag, Value};

    #[test]
    fn int64_round_trip() {
        let v = Vector::Int64(Int64Vector::from_options(vec![Some(1), None, Some(3)]));
        let (array, schema) = export(&v).unwrap();
        let back = import(array, &schema).unwrap();
        assert_eq!(back.type_tag(), TypeTag::Int64);
        assert_eq!(back.origin(), Origin::Arrow);
        assert_eq!(back.len(), 3);
        assert_eq!(back.value(0).unwrap(), Value::Int64(1));
        assert_eq!(back.value(1).unwrap(), Value::Null);
        assert_eq!(back.value(2).unwrap(), Value::Int64(3));
    }

    #[test]
    fn string_round_trip() {
        let v = Vector::String(StringVector::from_options([
            Some(&b"ab"[..]),
            Some(b""),
            None,
            Some(b"cdef"),
        ]));
        let (array, schema) = export(&v).unwrap();
        let back = import(array, &schema).unwrap();
        assert_eq!(back.type_tag(), TypeTag::String);
        assert_eq!(back.value(0).unwrap(), Value::Bytes(b"ab".to_vec()));
        assert_eq!(back.value(1).unwrap(), Value::Bytes(vec![]));
        assert_eq!(back.value(2).unwrap(), Value::Null);
        assert_eq!(back.null_count(), 1);
    }

    #[test]
    fn exporter_survives_vector_drop() {
        let (array, schema) = {
            let v = Vector::Int64(Int64Vector::from_values(vec![7, 8, 9]));
            export(&v).unwrap()
            // `v` drops here; the exported buffers must stay alive.
        };
        let back = import(array, &schema).unwrap();
        assert_eq!(back.value(2).unwrap(), Value::Int64(9));
    }
}
