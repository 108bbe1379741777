//! Draken: a columnar in-memory data container and kernel library.
//!
//! Draken is the execution-time substrate for an analytical query engine.
//! It holds batches ("morsels") of columnar data with Arrow-compatible
//! memory layouts, exposes per-type vector kernels (comparisons, take,
//! hashing, boolean reductions, string transforms), and exchanges data
//! with Arrow zero-copy in both directions, including over the Arrow C
//! Data Interface.
//!
//! This crate is the single public surface; the implementation lives in
//! the layered workspace crates:
//!
//! - `draken-vector`: buffers, the typed vector hierarchy, every kernel,
//!   the string builder, and the Arrow bridge;
//! - `draken-morsel`: the morsel container;
//! - `draken-ops`: the operator dispatch table consumed by evaluators;
//! - `draken-types` / `draken-result`: shared tags, scalar values, and
//!   the unified error type.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Int64Array, RecordBatch};
//! use draken::{Morsel, Value};
//!
//! let x: ArrayRef = Arc::new(Int64Array::from(vec![Some(1), None, Some(3)]));
//! let batch = RecordBatch::try_from_iter(vec![("x", x)]).unwrap();
//!
//! let morsel = Morsel::from_record_batch(&batch).unwrap();
//! assert_eq!(morsel.shape(), (3, 1));
//!
//! let taken = morsel.take(&[2, 0]).unwrap();
//! assert_eq!(taken.row(0).unwrap(), vec![Value::Int64(3)]);
//! ```

pub use draken_morsel::Morsel;
pub use draken_ops::{get_op, OpKernel, OpOutput, Operand, Operation};
pub use draken_result::{Error, Result};
pub use draken_types::{
    ArithmeticOp, CompareOp, LogicalOp, TypeTag, Value, FNV_OFFSET_BASIS, FNV_PRIME, NULL_HASH,
};
pub use draken_vector::{
    ffi, type_tag_for, ArrayVector, BoolVector, ByteMask, Date32Vector, Float32Vector,
    Float64Vector, ForeignVector, Int8Vector, Int16Vector, Int32Vector, Int64Vector, Origin,
    StringVector, StringVectorBuilder, Timestamp64Vector, Vector,
};
