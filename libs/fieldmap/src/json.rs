//! Bridge between `Value` and serde / `serde_json`.
//!
//! Decoded JSON objects can be filled into records directly, and extracted
//! maps can be serialized. Time values serialize as RFC 3339 text, which the
//! time coercion step parses back.

use chrono::SecondsFormat;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::mapper;
use crate::value::{Mapped, Value};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::I8(v) => serializer.serialize_i8(*v),
            Value::I16(v) => serializer.serialize_i16(*v),
            Value::I32(v) => serializer.serialize_i32(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::U8(v) => serializer.serialize_u8(*v),
            Value::U16(v) => serializer.serialize_u16(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::F32(v) => serializer.serialize_f32(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::Str(v) => serializer.serialize_str(v),
            Value::Bytes(bytes) => {
                let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                for b in bytes {
                    seq.serialize_element(b)?;
                }
                seq.end()
            }
            Value::Time(t) => serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(m) => serialize_mapped(m, serializer),
            Value::Ref(inner) => inner.serialize(serializer),
            Value::Record(r) => serialize_mapped(&mapper::map_fields(&**r), serializer),
        }
    }
}

fn serialize_mapped<S: Serializer>(m: &Mapped, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(m.len()))?;
    for (k, v) in m {
        map.serialize_entry(k, v)?;
    }
    map.end()
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::I64(i)
                } else if let Some(u) = n.as_u64() {
                    Value::U64(u)
                } else {
                    Value::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

/// Decoded JSON object as a `Mapped`; `None` for any other JSON value.
pub fn mapped_from_json(value: serde_json::Value) -> Option<Mapped> {
    match Value::from(value) {
        Value::Map(m) => Some(m),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_keep_integer_identity() {
        assert_eq!(Value::from(json!(3)), Value::I64(3));
        assert_eq!(Value::from(json!(u64::MAX)), Value::U64(u64::MAX));
        assert_eq!(Value::from(json!(1.5)), Value::F64(1.5));
    }

    #[test]
    fn objects_become_maps() {
        let m = mapped_from_json(json!({ "a": [1, null], "b": { "c": "d" } })).unwrap();
        assert_eq!(m["a"], Value::Array(vec![Value::I64(1), Value::Null]));
        assert_eq!(m["b"].as_map().unwrap()["c"], Value::Str("d".into()));
        assert!(mapped_from_json(json!([1])).is_none());
    }

    #[test]
    fn serializes_time_as_text() {
        let t = DateTime::parse_from_rfc3339("2020-01-02T03:04:05Z").unwrap();
        let out = serde_json::to_value(Value::Array(vec![Value::Time(t), Value::Ref(Box::new(Value::U8(2)))])).unwrap();
        assert_eq!(out, json!(["2020-01-02T03:04:05Z", 2]));
    }
}
