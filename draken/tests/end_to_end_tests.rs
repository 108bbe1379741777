//! End-to-end scenarios: Arrow table in, kernels over morsels, Arrow
//! table out.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BinaryArray, Int64Array, RecordBatch, StringArray};
use draken::{
    get_op, Error, Int64Vector, Morsel, OpOutput, Operand, Operation, StringVectorBuilder,
    TypeTag, Value, Vector, NULL_HASH,
};
use draken_test_utils as _;
use rand::prelude::*;
use rustc_hash::FxHashMap;

fn sample_batch() -> RecordBatch {
    let x: ArrayRef = Arc::new(Int64Array::from(vec![
        Some(1),
        Some(2),
        Some(3),
        None,
        Some(5),
    ]));
    let y: ArrayRef = Arc::new(StringArray::from(vec![
        Some("a"),
        Some("bb"),
        Some(""),
        Some("ccc"),
        None,
    ]));
    RecordBatch::try_from_iter(vec![("x", x), ("y", y)]).unwrap()
}

#[test]
fn build_from_arrow_table() {
    let morsel = Morsel::from_record_batch(&sample_batch()).unwrap();
    assert_eq!(morsel.shape(), (5, 2));
    assert_eq!(morsel.column("x").unwrap().null_count(), 1);
    assert_eq!(morsel.column("y").unwrap().hash().unwrap()[4], NULL_HASH);
}

#[test]
fn take_reorders_every_column() {
    let morsel = Morsel::from_record_batch(&sample_batch()).unwrap();
    let taken = morsel.take(&[4, 0, 3]).unwrap();
    assert_eq!(taken.shape(), (3, 2));

    let x = taken.column("x").unwrap().to_arrow();
    let x = x.as_any().downcast_ref::<Int64Array>().unwrap();
    assert_eq!(x.value(0), 5);
    assert_eq!(x.value(1), 1);
    assert!(x.is_null(2));

    let y = taken.column("y").unwrap().to_arrow();
    let y = y.as_any().downcast_ref::<BinaryArray>().unwrap();
    assert!(y.is_null(0));
    assert_eq!(y.value(1), b"a");
    assert_eq!(y.value(2), b"ccc");
}

#[test]
fn select_then_rename() {
    let morsel = Morsel::from_record_batch(&sample_batch()).unwrap();
    let renamed = morsel
        .select(&["y"])
        .unwrap()
        .rename_all(vec!["s".to_string()])
        .unwrap();
    assert_eq!(renamed.shape(), (5, 1));
    assert_eq!(renamed.column_names(), &["s".to_string()]);
    assert_eq!(
        renamed.column("s").unwrap().value(1).unwrap(),
        Value::Bytes(b"bb".to_vec())
    );
    // The original keeps its name.
    assert!(morsel.column("y").is_ok());
}

#[test]
fn rename_by_mapping_leaves_unlisted_names() {
    let morsel = Morsel::from_record_batch(&sample_batch()).unwrap();
    let mut mapping = FxHashMap::default();
    mapping.insert("y".to_string(), "label".to_string());
    let renamed = morsel.rename(&mapping).unwrap();
    assert_eq!(
        renamed.column_names(),
        &["x".to_string(), "label".to_string()]
    );
}

#[test]
fn comparison_kernels_on_columns() {
    let v = Int64Vector::from_values(vec![1, 2, 3, 4, 5]);
    assert_eq!(v.greater_than(3).as_bytes(), &[0, 0, 0, 1, 1]);

    let w = Int64Vector::from_values(vec![0, 2, 4, 4, 4]);
    assert_eq!(v.greater_than_vector(&w).unwrap().as_bytes(), &[1, 0, 0, 0, 1]);
}

#[test]
fn dispatch_then_take_pipeline() {
    // A predicate evaluator's loop: look up the kernel, build a mask,
    // turn it into selected indices, gather the morsel.
    let morsel = Morsel::from_record_batch(&sample_batch()).unwrap();
    let x = morsel.column("x").unwrap();

    let kernel = get_op(
        TypeTag::Int64,
        false,
        TypeTag::Int64,
        true,
        Operation::GreaterThanOrEquals,
    )
    .expect("kernel");
    let mask = match kernel
        .invoke(Operand::Vector(&x), Operand::Scalar(&Value::Int64(2)))
        .unwrap()
    {
        OpOutput::Mask(mask) => mask,
        other => panic!("expected mask, got {other:?}"),
    };
    // The null row compares to 0 and is filtered out.
    assert_eq!(mask.as_bytes(), &[0, 1, 1, 0, 1]);

    let indices: Vec<i32> = mask
        .iter()
        .enumerate()
        .filter_map(|(i, set)| set.then_some(i as i32))
        .collect();
    let filtered = morsel.take(&indices).unwrap();
    assert_eq!(filtered.shape(), (3, 2));
    assert_eq!(filtered.row(0).unwrap()[0], Value::Int64(2));
}

#[test]
fn permutation_round_trip_preserves_columns() {
    let mut rng = StdRng::seed_from_u64(1234);
    let morsel = Morsel::from_record_batch(&sample_batch()).unwrap();
    let mut permutation: Vec<i32> = (0..morsel.num_rows() as i32).collect();
    permutation.shuffle(&mut rng);

    let permuted = morsel.take(&permutation).unwrap();
    let batch = permuted.to_record_batch().unwrap();
    assert_eq!(batch.num_rows(), morsel.num_rows());

    for (k, &src) in permutation.iter().enumerate() {
        assert_eq!(
            permuted.row(k).unwrap(),
            morsel.row(src as usize).unwrap(),
            "row {k} should equal source row {src}"
        );
    }
}

#[test]
fn builder_to_arrow_binary() {
    let mut builder = StringVectorBuilder::with_counts(3, 6);
    builder.append(b"ab").unwrap();
    builder.append(b"").unwrap();
    builder.append(b"cdef").unwrap();
    let vector = builder.finish().unwrap();

    let arrow = Vector::String(vector).to_arrow();
    let binary = arrow.as_any().downcast_ref::<BinaryArray>().unwrap();
    assert_eq!(binary.len(), 3);
    assert_eq!(binary.value(0), b"ab");
    assert_eq!(binary.value(1), b"");
    assert_eq!(binary.value(2), b"cdef");

    // The builder is closed after finish.
    assert!(matches!(builder.append(b"x"), Err(Error::BuilderClosed)));
}

#[test]
fn morsel_round_trips_through_arrow() {
    let morsel = Morsel::from_record_batch(&sample_batch()).unwrap();
    let batch = morsel.to_record_batch().unwrap();
    let back = Morsel::from_record_batch(&batch).unwrap();
    assert_eq!(back.shape(), morsel.shape());
    for i in 0..morsel.num_rows() {
        assert_eq!(back.row(i).unwrap(), morsel.row(i).unwrap());
    }
}

#[test]
fn ffi_bridge_round_trip() {
    let morsel = Morsel::from_record_batch(&sample_batch()).unwrap();
    let x = morsel.column("x").unwrap();

    let (array, schema) = draken::ffi::export(&x).unwrap();
    let imported = draken::ffi::import(array, &schema).unwrap();
    assert_eq!(imported.len(), x.len());
    for i in 0..x.len() {
        assert_eq!(imported.value(i).unwrap(), x.value(i).unwrap());
    }
}
