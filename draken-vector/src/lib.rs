//! Typed columnar vectors with Arrow-compatible memory layouts.
//!
//! This crate is the execution-time substrate of Draken: one concrete vector
//! per supported logical type, each exposing the kernel surface higher layers
//! consume (comparisons, take, hashing, reductions, string transforms), plus
//! a zero-copy bridge to and from Arrow arrays.
//!
//! # Memory model
//!
//! Vector storage is built on the refcounted buffers of `arrow-buffer`
//! ([`arrow::buffer::Buffer`] and friends). A vector is either:
//!
//! - **owned**: it froze its own `MutableBuffer`s and is the only holder
//!   until it is exported, or
//! - **borrowed**: its buffers are clones of an imported Arrow array's
//!   buffers. The clone is the keep-alive handle: the underlying allocation
//!   cannot be freed while the vector lives, and dropping the vector drops
//!   only a refcount.
//!
//! Exporting with `to_arrow` hands the same refcounted buffers to a new
//! Arrow array, so the vector and the array co-own the allocation and the
//! last holder frees it. No kernel mutates its inputs; every kernel returns
//! a new owned vector, which makes vectors freely shareable across threads.

#![deny(unsafe_code)]

pub mod array;
pub mod bitmap;
pub mod boolean;
pub mod builder;
pub mod convert;
pub mod ffi;
pub mod foreign;
pub mod hash;
pub mod mask;
pub mod primitive;
pub mod string;
pub mod vector;

pub use array::ArrayVector;
pub use boolean::BoolVector;
pub use builder::StringVectorBuilder;
pub use convert::type_tag_for;
pub use foreign::ForeignVector;
pub use mask::ByteMask;
pub use primitive::{
    Date32Vector, Float32Vector, Float64Vector, Int8Vector, Int16Vector, Int32Vector, Int64Vector,
    PrimitiveVector, Timestamp64Vector, VectorPrimitive,
};
pub use string::StringVector;
pub use vector::Vector;

/// How a vector came to hold its buffers, fixed at construction.
///
/// `Owned` vectors allocated their own storage; `Arrow` vectors borrow
/// buffers owned by an imported Arrow array and keep them alive by
/// refcount. The origin never changes after construction; exporting an
/// owned vector does not make it borrowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Owned,
    Arrow,
}
