use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::mapper;
use crate::record::Record;

/// Generic mapping from key to dynamic value.
///
/// Keys are unique. A key present with `Value::Null` means "skip on
/// injection": nil values are never written back into a record field.
pub type Mapped = HashMap<String, Value>;

/// Dynamic value representation.
///
/// Strategy by variant:
/// - Scalars keep their exact width (`I32` and `I64` are distinct types for
///   coercion purposes).
/// - `Time`: an instant with its original offset.
/// - `Array`, `Map`: recursive, elements are independent dynamic values.
/// - `Ref`: a present pointer, produced by flatten mode for `Option` fields.
/// - `Record`: a record-shaped value that was not turned into a map.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    /// Opaque binary data.
    Bytes(Vec<u8>),
    Time(DateTime<FixedOffset>),

    /// Recursive, elements converted individually.
    Array(Vec<Value>),
    Map(Mapped),
    Ref(Box<Value>),
    Record(Arc<dyn Record>),
}

impl Value {
    /// Wrap a record without converting it to a map.
    pub fn record<R: Record>(record: R) -> Self {
        Value::Record(Arc::new(record))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_map(&self) -> Option<&Mapped> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Name of the dynamic type, in the same notation as `Kind`.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "nil".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::I8(_) => "i8".to_string(),
            Value::I16(_) => "i16".to_string(),
            Value::I32(_) => "i32".to_string(),
            Value::I64(_) => "i64".to_string(),
            Value::U8(_) => "u8".to_string(),
            Value::U16(_) => "u16".to_string(),
            Value::U32(_) => "u32".to_string(),
            Value::U64(_) => "u64".to_string(),
            Value::F32(_) => "f32".to_string(),
            Value::F64(_) => "f64".to_string(),
            Value::Str(_) => "String".to_string(),
            Value::Bytes(_) => "Vec<u8>".to_string(),
            Value::Time(_) => "DateTime".to_string(),
            Value::Array(_) => "Vec<Value>".to_string(),
            Value::Map(_) => "Mapped".to_string(),
            Value::Ref(inner) => format!("Option<{}>", inner.type_name()),
            Value::Record(r) => r.type_name().to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (I8(a), I8(b)) => a == b,
            (I16(a), I16(b)) => a == b,
            (I32(a), I32(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (U8(a), U8(b)) => a == b,
            (U16(a), U16(b)) => a == b,
            (U32(a), U32(b)) => a == b,
            (U64(a), U64(b)) => a == b,
            (F32(a), F32(b)) => a == b,
            (F64(a), F64(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Time(a), Time(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (Ref(a), Ref(b)) => a == b,
            (Record(a), Record(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.type_name() == b.type_name()
                        && mapper::map_fields(&**a) == mapper::map_fields(&**b))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "nil"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v:?}"),
            Value::Bytes(v) => write!(f, "{v:?}"),
            Value::Time(t) => write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                let mut keys: Vec<&String> = m.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, k) in keys.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k:?}: {}", m[k])?;
                }
                write!(f, "}}")
            }
            Value::Ref(inner) => write!(f, "&{inner}"),
            Value::Record(r) => write!(f, "{r:?}"),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => Str,
    Vec<u8> => Bytes,
    DateTime<FixedOffset> => Time,
    Vec<Value> => Array,
    Mapped => Map,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Build a `Mapped` from `key => value` pairs; values go through `Into<Value>`.
///
/// ```ignore
/// let m = mapped! { "name" => "ann", "age" => 31_i64 };
/// ```
#[macro_export]
macro_rules! mapped {
    () => { $crate::Mapped::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut __m = $crate::Mapped::new();
        $( __m.insert(::std::string::String::from($key), $crate::Value::from($value)); )+
        __m
    }};
}

/// Positional array of values, one per requested column.
///
/// Values only, no names or types. Serves as an
/// in-memory row source for `scan_row`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(pub Vec<Value>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_follow_kind_notation() {
        assert_eq!(Value::I64(1).type_name(), "i64");
        assert_eq!(Value::from("x").type_name(), "String");
        assert_eq!(Value::Ref(Box::new(Value::I32(1))).type_name(), "Option<i32>");
        assert_eq!(Value::Null.type_name(), "nil");
    }

    #[test]
    fn widths_are_distinct() {
        assert_ne!(Value::I32(1), Value::I64(1));
        assert_eq!(Value::from(Some(3_u8)), Value::U8(3));
        assert_eq!(Value::from(None::<u8>), Value::Null);
    }

    #[test]
    fn mapped_macro_builds_entries() {
        let m = mapped! { "a" => 1_i64, "b" => "x" };
        assert_eq!(m.len(), 2);
        assert_eq!(m["a"], Value::I64(1));
        assert_eq!(m["b"], Value::Str("x".into()));
        assert!(mapped!().is_empty());
    }

    #[test]
    fn display_sorts_map_keys() {
        let m = mapped! { "b" => 2_i32, "a" => true };
        assert_eq!(Value::Map(m).to_string(), r#"{"a": true, "b": 2}"#);
    }
}
