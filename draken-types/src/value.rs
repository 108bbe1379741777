use std::fmt;

use crate::tag::TypeTag;

/// A single scalar cell, as handed to scalar kernels and returned by
/// row-wise morsel access.
///
/// `Bytes` carries string values (UTF-8 by convention, never enforced);
/// `List` carries one row of a nested array column.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Date32(i32),
    Timestamp64(i64),
    Bool(bool),
    Bytes(Vec<u8>),
    List(Vec<Value>),
}

impl Value {
    /// The logical type this value belongs to, or `None` for `Null`.
    pub fn type_tag(&self) -> Option<TypeTag> {
        Some(match self {
            Value::Null => return None,
            Value::Int8(_) => TypeTag::Int8,
            Value::Int16(_) => TypeTag::Int16,
            Value::Int32(_) => TypeTag::Int32,
            Value::Int64(_) => TypeTag::Int64,
            Value::Float32(_) => TypeTag::Float32,
            Value::Float64(_) => TypeTag::Float64,
            Value::Date32(_) => TypeTag::Date32,
            Value::Timestamp64(_) => TypeTag::Timestamp64,
            Value::Bool(_) => TypeTag::Bool,
            Value::Bytes(_) => TypeTag::String,
            Value::List(_) => TypeTag::Array,
        })
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int8(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Date32(v) => write!(f, "date32({v})"),
            Value::Timestamp64(v) => write!(f, "timestamp64({v})"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Bytes(b) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "{s:?}"),
                Err(_) => write!(f, "0x{}", hex(b)),
            },
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_variants() {
        assert_eq!(Value::Null.type_tag(), None);
        assert_eq!(Value::Int64(1).type_tag(), Some(TypeTag::Int64));
        assert_eq!(Value::Date32(0).type_tag(), Some(TypeTag::Date32));
        assert_eq!(Value::Bytes(vec![]).type_tag(), Some(TypeTag::String));
        assert_eq!(Value::List(vec![]).type_tag(), Some(TypeTag::Array));
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(Value::Int64(42).to_string(), "42");
        assert_eq!(Value::Bytes(b"abc".to_vec()).to_string(), "\"abc\"");
        assert_eq!(Value::Bytes(vec![0xff]).to_string(), "0xff");
        assert_eq!(
            Value::List(vec![Value::Int64(1), Value::Null]).to_string(),
            "[1, null]"
        );
    }
}
