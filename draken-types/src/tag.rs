use std::fmt;

/// Logical type of a vector.
///
/// The numeric code assigned to each tag is stable and safe to print or
/// persist for debugging: integers occupy 1..=19, floats 20..=29, temporal
/// types 30..=49, boolean 50, string-like 60..=79, complex types 80..=99,
/// and 100 is the catch-all for Arrow types without a native vector.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Int8 = 1,
    Int16 = 2,
    Int32 = 3,
    Int64 = 4,
    Float32 = 20,
    Float64 = 21,
    /// Days since the Unix epoch, 32-bit.
    Date32 = 30,
    /// 64-bit epoch offset; the unit is fixed at import time.
    Timestamp64 = 40,
    Bool = 50,
    /// Byte sequences, UTF-8 by convention but never enforced.
    String = 60,
    /// Nested list; the element type lives on the vector, not the tag.
    Array = 80,
    /// Opaque pass-through for Arrow types Draken does not model natively.
    NonNative = 100,
}

impl TypeTag {
    /// Stable numeric code of this tag.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Reverse of [`TypeTag::code`].
    pub fn from_code(code: u8) -> Option<TypeTag> {
        Some(match code {
            1 => TypeTag::Int8,
            2 => TypeTag::Int16,
            3 => TypeTag::Int32,
            4 => TypeTag::Int64,
            20 => TypeTag::Float32,
            21 => TypeTag::Float64,
            30 => TypeTag::Date32,
            40 => TypeTag::Timestamp64,
            50 => TypeTag::Bool,
            60 => TypeTag::String,
            80 => TypeTag::Array,
            100 => TypeTag::NonNative,
            _ => return None,
        })
    }

    #[inline]
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TypeTag::Int8 | TypeTag::Int16 | TypeTag::Int32 | TypeTag::Int64
        )
    }

    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, TypeTag::Float32 | TypeTag::Float64)
    }

    /// True for the types arithmetic dispatch accepts. Temporal tags are
    /// fixed-width but not numeric.
    #[inline]
    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    #[inline]
    pub fn is_temporal(self) -> bool {
        matches!(self, TypeTag::Date32 | TypeTag::Timestamp64)
    }

    /// Element width in bytes for fixed-width tags, `None` otherwise.
    /// `Bool` is bit-packed, so it reports `None` as well.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            TypeTag::Int8 => Some(1),
            TypeTag::Int16 => Some(2),
            TypeTag::Int32 | TypeTag::Date32 | TypeTag::Float32 => Some(4),
            TypeTag::Int64 | TypeTag::Timestamp64 | TypeTag::Float64 => Some(8),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Int8 => "int8",
            TypeTag::Int16 => "int16",
            TypeTag::Int32 => "int32",
            TypeTag::Int64 => "int64",
            TypeTag::Float32 => "float32",
            TypeTag::Float64 => "float64",
            TypeTag::Date32 => "date32",
            TypeTag::Timestamp64 => "timestamp64",
            TypeTag::Bool => "bool",
            TypeTag::String => "string",
            TypeTag::Array => "array",
            TypeTag::NonNative => "non-native",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(TypeTag::Int8.code(), 1);
        assert_eq!(TypeTag::Int64.code(), 4);
        assert_eq!(TypeTag::Float32.code(), 20);
        assert_eq!(TypeTag::Float64.code(), 21);
        assert_eq!(TypeTag::Date32.code(), 30);
        assert_eq!(TypeTag::Timestamp64.code(), 40);
        assert_eq!(TypeTag::Bool.code(), 50);
        assert_eq!(TypeTag::String.code(), 60);
        assert_eq!(TypeTag::Array.code(), 80);
        assert_eq!(TypeTag::NonNative.code(), 100);
    }

    #[test]
    fn code_round_trip() {
        for tag in [
            TypeTag::Int8,
            TypeTag::Int16,
            TypeTag::Int32,
            TypeTag::Int64,
            TypeTag::Float32,
            TypeTag::Float64,
            TypeTag::Date32,
            TypeTag::Timestamp64,
            TypeTag::Bool,
            TypeTag::String,
            TypeTag::Array,
            TypeTag::NonNative,
        ] {
            assert_eq!(TypeTag::from_code(tag.code()), Some(tag));
        }
        assert_eq!(TypeTag::from_code(0), None);
        assert_eq!(TypeTag::from_code(99), None);
    }

    #[test]
    fn class_predicates() {
        assert!(TypeTag::Int16.is_numeric());
        assert!(TypeTag::Float32.is_numeric());
        assert!(!TypeTag::Date32.is_numeric());
        assert!(TypeTag::Date32.is_temporal());
        assert!(!TypeTag::String.is_numeric());
        assert_eq!(TypeTag::Timestamp64.fixed_width(), Some(8));
        assert_eq!(TypeTag::Bool.fixed_width(), None);
    }
}
