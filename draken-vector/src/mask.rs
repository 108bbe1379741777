//! Byte-mask results of comparison kernels.

use draken_result::{Error, Result};

use crate::primitive::Int8Vector;

/// One byte per row, 1 where the comparison held and 0 everywhere else,
/// including every row where either operand was null.
///
/// Masks combine with [`and`](ByteMask::and) / [`or`](ByteMask::or) /
/// [`xor`](ByteMask::xor) so evaluators can fold predicate trees without
/// touching the source vectors again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteMask {
    bytes: Vec<u8>,
}

impl ByteMask {
    /// Wrap raw bytes; any non-zero byte counts as set.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// An all-clear mask of `len` rows.
    pub fn zeros(len: usize) -> Self {
        Self {
            bytes: vec![0u8; len],
        }
    }

    pub fn from_bools(bools: impl IntoIterator<Item = bool>) -> Self {
        Self {
            bytes: bools.into_iter().map(u8::from).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether row `i` is set. Panics when `i` is out of range.
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        self.bytes[i] != 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bytes.iter().map(|&b| b != 0)
    }

    pub fn any(&self) -> bool {
        self.bytes.iter().any(|&b| b != 0)
    }

    pub fn all(&self) -> bool {
        self.bytes.iter().all(|&b| b != 0)
    }

    pub fn count_set(&self) -> usize {
        self.bytes.iter().filter(|&&b| b != 0).count()
    }

    pub fn and(&self, other: &ByteMask) -> Result<ByteMask> {
        self.zip(other, |a, b| a && b)
    }

    pub fn or(&self, other: &ByteMask) -> Result<ByteMask> {
        self.zip(other, |a, b| a || b)
    }

    pub fn xor(&self, other: &ByteMask) -> Result<ByteMask> {
        self.zip(other, |a, b| a ^ b)
    }

    /// Materialize the mask as an owned `int8` vector.
    pub fn to_vector(&self) -> Int8Vector {
        Int8Vector::from_values(self.bytes.iter().map(|&b| i8::from(b != 0)).collect())
    }

    fn zip(&self, other: &ByteMask, op: impl Fn(bool, bool) -> bool) -> Result<ByteMask> {
        if self.len() != other.len() {
            return Err(Error::length_mismatch(self.len(), other.len()));
        }
        Ok(ByteMask::from_bools(
            self.iter().zip(other.iter()).map(|(a, b)| op(a, b)),
        ))
    }
}
