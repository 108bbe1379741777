//! Common data types for the Draken toolkit.
//!
//! This crate hosts the logical type tags, the scalar [`Value`] enum, and the
//! operator enums shared between the vector kernels and the dispatch table,
//! decoupled from the Arrow-backed vector machinery (`draken-vector`).

pub mod ops;
pub mod tag;
pub mod value;

pub use ops::{ArithmeticOp, CompareOp, LogicalOp};
pub use tag::TypeTag;
pub use value::Value;

/// Hash emitted for any null position, in every vector type.
pub const NULL_HASH: u64 = 0x9E37_79B9_7F4A_7C15;

/// FNV-1a offset basis: the seed of the per-byte hash accumulator.
pub const FNV_OFFSET_BASIS: u64 = 0xCBF2_9CE4_8422_2325;

/// FNV-1a prime: the multiplier of the per-byte hash accumulator.
pub const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;
