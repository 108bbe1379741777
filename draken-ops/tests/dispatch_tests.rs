//! End-to-end dispatch: look up kernels and drive them against real
//! vectors and scalars.

use draken_ops::{get_op, OpOutput, Operand, Operation};
use draken_test_utils as _;
use draken_types::{TypeTag, Value};
use draken_vector::{BoolVector, Int64Vector, StringVector, Vector};

#[test]
fn comparison_kernel_produces_mask() {
    let kernel = get_op(
        TypeTag::Int64,
        false,
        TypeTag::Int64,
        true,
        Operation::GreaterThan,
    )
    .expect("kernel");
    let v = Vector::Int64(Int64Vector::from_values(vec![1, 2, 3, 4, 5]));
    let out = kernel
        .invoke(Operand::Vector(&v), Operand::Scalar(&Value::Int64(3)))
        .unwrap();
    match out {
        OpOutput::Mask(mask) => assert_eq!(mask.as_bytes(), &[0, 0, 0, 1, 1]),
        other => panic!("expected a mask, got {other:?}"),
    }
}

#[test]
fn vector_vector_comparison() {
    let kernel = get_op(
        TypeTag::Int64,
        false,
        TypeTag::Int64,
        false,
        Operation::GreaterThan,
    )
    .expect("kernel");
    let a = Vector::Int64(Int64Vector::from_values(vec![1, 2, 3, 4, 5]));
    let b = Vector::Int64(Int64Vector::from_values(vec![0, 2, 4, 4, 4]));
    let out = kernel
        .invoke(Operand::Vector(&a), Operand::Vector(&b))
        .unwrap();
    match out {
        OpOutput::Mask(mask) => assert_eq!(mask.as_bytes(), &[1, 0, 0, 0, 1]),
        other => panic!("expected a mask, got {other:?}"),
    }
}

#[test]
fn arithmetic_kernel_produces_vector() {
    let kernel = get_op(TypeTag::Int64, false, TypeTag::Int64, true, Operation::Add)
        .expect("kernel");
    let v = Vector::Int64(Int64Vector::from_options(vec![Some(1), None, Some(3)]));
    let out = kernel
        .invoke(Operand::Vector(&v), Operand::Scalar(&Value::Int64(10)))
        .unwrap();
    match out {
        OpOutput::Vector(result) => {
            assert_eq!(result.value(0).unwrap(), Value::Int64(11));
            assert_eq!(result.value(1).unwrap(), Value::Null);
            assert_eq!(result.value(2).unwrap(), Value::Int64(13));
        }
        other => panic!("expected a vector, got {other:?}"),
    }
}

#[test]
fn boolean_kernel_over_bool_vectors() {
    let kernel = get_op(TypeTag::Bool, false, TypeTag::Bool, false, Operation::Xor)
        .expect("kernel");
    let a = Vector::Bool(BoolVector::from_values([true, true, false]));
    let b = Vector::Bool(BoolVector::from_values([true, false, false]));
    let out = kernel
        .invoke(Operand::Vector(&a), Operand::Vector(&b))
        .unwrap();
    match out {
        OpOutput::Vector(result) => {
            assert_eq!(result.value(0).unwrap(), Value::Bool(false));
            assert_eq!(result.value(1).unwrap(), Value::Bool(true));
            assert_eq!(result.value(2).unwrap(), Value::Bool(false));
        }
        other => panic!("expected a vector, got {other:?}"),
    }
}

#[test]
fn scalar_scalar_shapes() {
    let cmp = get_op(
        TypeTag::Float64,
        true,
        TypeTag::Float64,
        true,
        Operation::LessThan,
    )
    .expect("kernel");
    let out = cmp
        .invoke(
            Operand::Scalar(&Value::Float64(1.0)),
            Operand::Scalar(&Value::Float64(2.0)),
        )
        .unwrap();
    assert!(matches!(out, OpOutput::Scalar(Value::Bool(true))));

    let div = get_op(TypeTag::Int64, true, TypeTag::Int64, true, Operation::Divide)
        .expect("kernel");
    let out = div
        .invoke(
            Operand::Scalar(&Value::Int64(7)),
            Operand::Scalar(&Value::Int64(0)),
        )
        .unwrap();
    assert!(matches!(out, OpOutput::Scalar(Value::Null)));
}

#[test]
fn string_equality_through_dispatch() {
    let kernel = get_op(
        TypeTag::String,
        false,
        TypeTag::String,
        true,
        Operation::Equals,
    )
    .expect("kernel");
    let v = Vector::String(StringVector::from_options([
        Some(&b"a"[..]),
        None,
        Some(b"b"),
    ]));
    let out = kernel
        .invoke(
            Operand::Vector(&v),
            Operand::Scalar(&Value::Bytes(b"b".to_vec())),
        )
        .unwrap();
    match out {
        OpOutput::Mask(mask) => assert_eq!(mask.as_bytes(), &[0, 0, 1]),
        other => panic!("expected a mask, got {other:?}"),
    }
}

#[test]
fn invoke_rejects_mismatched_operands() {
    let kernel = get_op(TypeTag::Int64, false, TypeTag::Int64, true, Operation::Add)
        .expect("kernel");
    let v = Vector::Int64(Int64Vector::from_values(vec![1]));
    // Wrong scalar type.
    assert!(kernel
        .invoke(Operand::Vector(&v), Operand::Scalar(&Value::Int32(1)))
        .is_err());
    // Wrong shape.
    assert!(kernel
        .invoke(Operand::Vector(&v), Operand::Vector(&v))
        .is_err());
}

#[test]
fn length_mismatch_surfaces_from_kernels() {
    let kernel = get_op(
        TypeTag::Int64,
        false,
        TypeTag::Int64,
        false,
        Operation::Equals,
    )
    .expect("kernel");
    let a = Vector::Int64(Int64Vector::from_values(vec![1, 2, 3]));
    let b = Vector::Int64(Int64Vector::from_values(vec![1, 2]));
    assert!(matches!(
        kernel.invoke(Operand::Vector(&a), Operand::Vector(&b)),
        Err(draken_result::Error::LengthMismatch { left: 3, right: 2 })
    ));
}
