//! The string vector builder, the only stateful object in the core.
//!
//! State machine: fresh, then building after the first write, then
//! finished after `finish` or any error. A finished or poisoned builder
//! rejects every further operation with `BuilderClosed`, so a half-written
//! buffer can never leak into a vector.

use arrow_buffer::bit_util;
use arrow_buffer::Buffer;
use draken_result::{Error, Result};
use draken_types::TypeTag;

use crate::bitmap;
use crate::string::{offsets_from_vec, StringVector};
use crate::Origin;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Fresh,
    Building,
    Finished,
}

/// Incrementally builds an owned [`StringVector`].
///
/// Two construction modes:
/// - [`with_counts`](StringVectorBuilder::with_counts) declares the exact
///   row and byte totals up front; `finish` fails with `CapacityMismatch`
///   when consumption differs.
/// - [`with_estimate`](StringVectorBuilder::with_estimate) sizes the data
///   buffer as a hint and grows it by doubling on overflow.
///
/// Rows must be written densely in order `0, 1, …, n_rows - 1`; gaps are
/// rejected.
#[derive(Debug)]
pub struct StringVectorBuilder {
    n_rows: usize,
    declared_bytes: Option<usize>,
    data: Vec<u8>,
    offsets: Vec<i32>,
    valid: Vec<bool>,
    validity_override: Option<Vec<u8>>,
    state: State,
}

impl StringVectorBuilder {
    /// Strict mode: exactly `n_rows` rows totalling exactly `total_bytes`
    /// data bytes.
    pub fn with_counts(n_rows: usize, total_bytes: usize) -> Self {
        Self::new(n_rows, total_bytes, Some(total_bytes))
    }

    /// Growable mode: `initial_bytes` is a capacity hint; the data buffer
    /// doubles whenever a write would overflow it.
    pub fn with_estimate(n_rows: usize, initial_bytes: usize) -> Self {
        Self::new(n_rows, initial_bytes, None)
    }

    fn new(n_rows: usize, capacity: usize, declared_bytes: Option<usize>) -> Self {
        let mut offsets = Vec::with_capacity(n_rows + 1);
        offsets.push(0);
        Self {
            n_rows,
            declared_bytes,
            data: Vec::with_capacity(capacity),
            offsets,
            valid: Vec::with_capacity(n_rows),
            validity_override: None,
            state: State::Fresh,
        }
    }

    /// Rows written so far.
    pub fn rows_written(&self) -> usize {
        self.valid.len()
    }

    /// Data bytes consumed so far.
    pub fn bytes_written(&self) -> usize {
        self.data.len()
    }

    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == State::Finished {
            return Err(Error::BuilderClosed);
        }
        Ok(())
    }

    fn poison<T>(&mut self, err: Error) -> Result<T> {
        self.state = State::Finished;
        Err(err)
    }

    fn push(&mut self, bytes: &[u8], valid: bool) -> Result<()> {
        self.ensure_open()?;
        let written = self.rows_written();
        if written == self.n_rows {
            return self.poison(Error::index_out_of_range(written as i64, self.n_rows));
        }
        let consumed = self.data.len() + bytes.len();
        if let Some(declared) = self.declared_bytes {
            if consumed > declared {
                return self.poison(Error::CapacityMismatch { declared, consumed });
            }
        } else if consumed > i32::MAX as usize {
            return self.poison(Error::OutOfMemory(format!(
                "string data of {consumed} bytes exceeds the 32-bit offset range"
            )));
        } else if consumed > self.data.capacity() {
            // Doubling growth in estimate mode.
            let mut target = self.data.capacity().max(1);
            while target < consumed {
                target *= 2;
            }
            self.data.reserve(target - self.data.len());
            tracing::debug!(capacity = target, "string builder grew its data buffer");
        }
        self.data.extend_from_slice(bytes);
        self.offsets.push(self.data.len() as i32);
        self.valid.push(valid);
        self.state = State::Building;
        Ok(())
    }

    /// Append the next row's bytes.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.push(bytes, true)
    }

    /// Append the next row as null (zero-length range, null bit set).
    pub fn append_null(&mut self) -> Result<()> {
        self.push(&[], false)
    }

    /// Positional write. `index` must be the next unwritten row (an
    /// append), or the most recently written row, whose bytes are then
    /// replaced. Anything else would shift committed offsets and is
    /// rejected.
    pub fn set(&mut self, index: usize, bytes: &[u8]) -> Result<()> {
        self.set_row(index, Some(bytes))
    }

    /// Positional null write, with the same index rules as
    /// [`set`](StringVectorBuilder::set).
    pub fn set_null(&mut self, index: usize) -> Result<()> {
        self.set_row(index, None)
    }

    fn set_row(&mut self, index: usize, bytes: Option<&[u8]>) -> Result<()> {
        self.ensure_open()?;
        let written = self.rows_written();
        if index == written {
            return match bytes {
                Some(b) => self.append(b),
                None => self.append_null(),
            };
        }
        if written == 0 || index != written - 1 {
            let err = Error::index_out_of_range(index as i64, written);
            return self.poison(err);
        }
        // Rewrite the last row: drop its bytes, then write again.
        self.data.truncate(self.offsets[written - 1] as usize);
        self.offsets.truncate(written);
        self.valid.truncate(written - 1);
        match bytes {
            Some(b) => self.append(b),
            None => self.append_null(),
        }
    }

    /// Replace the per-row validity wholesale with a packed bitmap
    /// (Arrow layout, 1 = valid) of `ceil(n_rows / 8)` bytes, applied at
    /// `finish`.
    pub fn set_validity_mask(&mut self, bitmap: &[u8]) -> Result<()> {
        self.ensure_open()?;
        let expected = bit_util::ceil(self.n_rows, 8);
        if bitmap.len() != expected {
            let err = Error::length_mismatch(expected, bitmap.len());
            return self.poison(err);
        }
        self.validity_override = Some(bitmap.to_vec());
        self.state = State::Building;
        Ok(())
    }

    /// Freeze the builder into an owned vector. Fails with `Incomplete`
    /// when rows are missing and, in strict mode, with `CapacityMismatch`
    /// when byte consumption differs from the declaration. Either failure
    /// closes the builder.
    pub fn finish(&mut self) -> Result<StringVector> {
        self.ensure_open()?;
        let written = self.rows_written();
        if written < self.n_rows {
            return self.poison(Error::Incomplete {
                written,
                expected: self.n_rows,
            });
        }
        if let Some(declared) = self.declared_bytes {
            if self.data.len() != declared {
                let consumed = self.data.len();
                return self.poison(Error::CapacityMismatch { declared, consumed });
            }
        }
        self.state = State::Finished;

        let data = std::mem::take(&mut self.data);
        let offsets = offsets_from_vec(std::mem::take(&mut self.offsets), data.len())?;
        let validity = match self.validity_override.take() {
            Some(mask) => {
                let mut bits = arrow_buffer::MutableBuffer::new(mask.len());
                bits.extend_from_slice(&mask);
                bitmap::freeze_validity(bits, self.n_rows)
            }
            None => {
                let mut bits = bitmap::all_valid(self.n_rows);
                for (i, valid) in self.valid.iter().enumerate() {
                    if !valid {
                        bit_util::unset_bit(bits.as_slice_mut(), i);
                    }
                }
                bitmap::freeze_validity(bits, self.n_rows)
            }
        };

        tracing::debug!(
            rows = self.n_rows,
            bytes = data.len(),
            tag = %TypeTag::String,
            "string builder finished"
        );
        StringVector::try_new(offsets, Buffer::from(data), validity, Origin::Owned)
    }
}
