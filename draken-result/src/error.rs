use thiserror::Error;

/// Unified error type for all Draken operations.
///
/// Errors propagate upward with the `?` operator; internal code matches on
/// specific variants for fine-grained handling. `Error` is `Send + Sync`, so
/// kernels running on worker threads can hand failures back to a coordinator.
#[derive(Error, Debug)]
pub enum Error {
    /// An allocation-shaped failure.
    ///
    /// Rust's global allocator aborts rather than returning null, so this
    /// variant surfaces the one size failure the runtime can observe: a
    /// variable-width payload whose total byte count no longer fits the
    /// 32-bit offset domain of the Arrow layout.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// A row index outside `[0, length)` was passed to `take` or element
    /// access. Negative indices are rejected, not wrapped.
    #[error("index {index} out of range for length {length}")]
    IndexOutOfRange { index: i64, length: usize },

    /// Two vectors of different lengths were given to a vector-vector
    /// kernel, or a rename supplied the wrong number of column names.
    #[error("length mismatch: left {left}, right {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Morsel lookup or select referenced a column name that does not exist.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// The requested operation is not defined for the operand types, for
    /// example arithmetic on strings or boolean logic on integers.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Strict morsel construction was asked to wrap a table with zero
    /// columns.
    #[error("table has no columns")]
    EmptySchema,

    /// `finish` was called on a string builder before every row was written.
    #[error("builder incomplete: {written} of {expected} rows written")]
    Incomplete { written: usize, expected: usize },

    /// A strict-capacity string builder consumed a different number of data
    /// bytes than it declared up front.
    #[error("capacity mismatch: declared {declared} bytes, consumed {consumed}")]
    CapacityMismatch { declared: usize, consumed: usize },

    /// The string builder was used after `finish`, or after a prior error
    /// poisoned it.
    #[error("builder is closed")]
    BuilderClosed,

    /// An offsets buffer failed validation: entries must be non-decreasing
    /// and the final entry must not exceed the data length.
    #[error("invalid offset: {0}")]
    InvalidOffset(String),

    /// Fault surfaced by a delegated Arrow path (generic compute on
    /// non-native columns, chunk concatenation, or the C Data Interface).
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl Error {
    /// Build an [`Error::IndexOutOfRange`] for index `index` into a vector
    /// of `length` rows.
    #[inline]
    pub fn index_out_of_range(index: i64, length: usize) -> Self {
        Error::IndexOutOfRange { index, length }
    }

    /// Build an [`Error::LengthMismatch`] from two operand lengths.
    #[inline]
    pub fn length_mismatch(left: usize, right: usize) -> Self {
        Error::LengthMismatch { left, right }
    }
}
