use crate::error::Error;

/// Result type alias used throughout Draken.
///
/// Shorthand for `std::result::Result<T, Error>`; every fallible Draken
/// operation returns this type.
pub type Result<T> = std::result::Result<T, Error>;
