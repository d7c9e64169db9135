use std::fmt;

/// Static type descriptor of a record field.
///
/// Produced once per field type by `FieldValue::kind()`. The engine never
/// interprets a record's memory; it only looks at this descriptor to pick
/// extraction/flatten/deflate behaviour and to report mismatches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Str,
    Time,
    /// `Mapped` field.
    Map,
    /// `Value` field: holds any dynamic value.
    Any,
    /// Derived record, by type name.
    Record(&'static str),
    /// Type with custom encode/decode hooks, by type name.
    Custom(&'static str),
    Seq(Box<Kind>),
    /// `Option<T>`, the nil-able pointer shape.
    Ptr(Box<Kind>),
}

impl Kind {
    /// Scalar kinds that are copied as-is through every layer.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Kind::Bool
                | Kind::I8
                | Kind::I16
                | Kind::I32
                | Kind::I64
                | Kind::U8
                | Kind::U16
                | Kind::U32
                | Kind::U64
                | Kind::F32
                | Kind::F64
                | Kind::Str
        )
    }

    /// Record or pointer to record (one level of indirection).
    pub fn is_record_like(&self) -> bool {
        match self {
            Kind::Record(_) => true,
            Kind::Ptr(inner) => matches!(**inner, Kind::Record(_)),
            _ => false,
        }
    }

    /// Kind behind one level of `Option`, or `self`.
    pub fn indirect(&self) -> &Kind {
        match self {
            Kind::Ptr(inner) => inner,
            other => other,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => write!(f, "bool"),
            Kind::I8 => write!(f, "i8"),
            Kind::I16 => write!(f, "i16"),
            Kind::I32 => write!(f, "i32"),
            Kind::I64 => write!(f, "i64"),
            Kind::U8 => write!(f, "u8"),
            Kind::U16 => write!(f, "u16"),
            Kind::U32 => write!(f, "u32"),
            Kind::U64 => write!(f, "u64"),
            Kind::F32 => write!(f, "f32"),
            Kind::F64 => write!(f, "f64"),
            Kind::Str => write!(f, "String"),
            Kind::Time => write!(f, "DateTime"),
            Kind::Map => write!(f, "Mapped"),
            Kind::Any => write!(f, "Value"),
            Kind::Record(name) | Kind::Custom(name) => write!(f, "{name}"),
            Kind::Seq(inner) => write!(f, "Vec<{inner}>"),
            Kind::Ptr(inner) => write!(f, "Option<{inner}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_like_sees_one_indirection() {
        assert!(Kind::Record("Addr").is_record_like());
        assert!(Kind::Ptr(Box::new(Kind::Record("Addr"))).is_record_like());
        assert!(!Kind::Ptr(Box::new(Kind::Ptr(Box::new(Kind::Record("Addr"))))).is_record_like());
        assert!(!Kind::Seq(Box::new(Kind::Record("Addr"))).is_record_like());
        assert!(!Kind::Time.is_record_like());
    }

    #[test]
    fn display_nests() {
        let k = Kind::Ptr(Box::new(Kind::Seq(Box::new(Kind::I32))));
        assert_eq!(k.to_string(), "Option<Vec<i32>>");
        assert_eq!(Kind::Seq(Box::new(Kind::U8)).to_string(), "Vec<u8>");
    }
}
