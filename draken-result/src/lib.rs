//! Error types and result definitions for the Draken columnar runtime.
//!
//! Draken uses a single error enum ([`Error`]) and result alias ([`Result<T>`])
//! across all of its crates. Kernels surface errors to the caller
//! synchronously: there is no retry, no side-channel logging, and no partial
//! result. Each variant has exactly one meaning, so callers can match on the
//! kind rather than parse messages.

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
