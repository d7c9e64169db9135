//! Value extraction: typed field value → dynamic value.
//!
//! Precedence, applied by the `FieldValue` impls through the helpers below:
//! nil pointers are `Null`; time values are returned as-is; custom encode
//! hooks replace everything else; records become nested maps; pointers to
//! primitives are dereferenced; sequences recurse per element.

use crate::field::FieldValue;
use crate::hook::MapEncode;
use crate::mapper;
use crate::record::AsRecord;
use crate::value::Value;

/// Run a custom encode hook. Failures are swallowed into `Value::Null`.
pub fn encode_hook<T: MapEncode + ?Sized>(value: &T) -> Value {
    match value.map_encode() {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "map encode failed, emitting nil");
            Value::Null
        }
    }
}

/// Nested record → nested map under the same scheme.
pub fn extract_record<R: AsRecord + ?Sized>(record: &R, scheme: &str) -> Value {
    Value::Map(mapper::map_tags(record, scheme))
}

/// `None` is nil; a present pointee is extracted in its own right, which
/// dereferences primitives and time values and maps records.
pub fn extract_pointer<T: FieldValue>(pointee: Option<&T>, scheme: &str) -> Value {
    match pointee {
        Some(v) => v.to_value(scheme),
        None => Value::Null,
    }
}

/// Ordered sequence, one dynamic value per element.
pub fn extract_sequence<T: FieldValue>(items: &[T], scheme: &str) -> Value {
    Value::Array(items.iter().map(|item| item.to_value(scheme)).collect())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset};

    use super::*;

    #[test]
    fn nil_pointer_is_null() {
        let v: Option<i32> = None;
        assert_eq!(v.to_value(""), Value::Null);
        let v: Option<Vec<String>> = None;
        assert_eq!(v.to_value(""), Value::Null);
    }

    #[test]
    fn pointer_to_primitive_is_dereferenced() {
        assert_eq!(Some(9_u16).to_value(""), Value::U16(9));
        assert_eq!(Some(String::from("a")).to_value(""), Value::Str("a".into()));
    }

    #[test]
    fn time_is_returned_as_is() {
        let t = DateTime::parse_from_rfc3339("2023-05-06T07:08:09+01:00").unwrap();
        assert_eq!(t.to_value(""), Value::Time(t));
        assert_eq!(Some(t).to_value(""), Value::Time(t));
    }

    #[test]
    fn sequences_recurse_per_element() {
        let v = vec![Some(1_i64), None];
        assert_eq!(v.to_value(""), Value::Array(vec![Value::I64(1), Value::Null]));
        let t: Vec<DateTime<FixedOffset>> = Vec::new();
        assert_eq!(t.to_value(""), Value::Array(Vec::new()));
    }
}
