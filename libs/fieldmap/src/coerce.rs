//! Type coercion: dynamic value → typed field value.
//!
//! [`coerce`] walks a fixed ladder and the first step that answers wins:
//!
//! 1. identical type
//! 2. standard conversion (numeric widths, `String` ↔ bytes)
//! 3. custom decode hook
//! 4. time: RFC 3339 text or a pointer to a time value
//! 5. dynamic map (or foreign record) → nested record fill
//! 6. sequence → element-by-element rebuild
//! 7. plain value → `Option` field (box)
//! 8. `Ref` value → plain field (unbox)
//! 9. mismatch
//!
//! Plain fill, tag fill, deflate fill and the row adapter all go through here.

use chrono::{DateTime, FixedOffset};

use crate::error::Reason;
use crate::field::FieldValue;
use crate::fill;
use crate::hook::MapDecode;
use crate::mapper;
use crate::record::Record;
use crate::value::Value;

/// Answer of one coercion step.
#[derive(Debug)]
pub enum Step<T> {
    Done(T),
    Fail(Reason),
    /// Not handled by this step; the value is handed back untouched.
    Next(Value),
}

impl<T> Step<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Step<U> {
        match self {
            Step::Done(v) => Step::Done(f(v)),
            Step::Fail(e) => Step::Fail(e),
            Step::Next(v) => Step::Next(v),
        }
    }

    /// Try `f` only if this step handed the value back.
    pub fn or_else(self, f: impl FnOnce(Value) -> Step<T>) -> Step<T> {
        match self {
            Step::Next(v) => f(v),
            other => other,
        }
    }

    /// Put a value that was taken out of a `Ref` back into one.
    pub fn rewrap(self) -> Step<T> {
        match self {
            Step::Next(v) => Step::Next(Value::Ref(Box::new(v))),
            other => other,
        }
    }
}

macro_rules! attempt {
    ($step:expr) => {
        match $step {
            Step::Done(v) => return Ok(v),
            Step::Fail(e) => return Err(e),
            Step::Next(v) => v,
        }
    };
}

/// Resolve `value` into a `T` under `scheme`.
///
/// Callers filter out `Value::Null` one level up; a null reaching this point
/// is a mismatch.
pub fn coerce<T: FieldValue>(value: Value, scheme: &str) -> Result<T, Reason> {
    let value = attempt!(T::exact(value));
    let value = attempt!(T::convert(value));
    let value = attempt!(T::decode(value));
    let value = attempt!(T::time(value));
    let value = attempt!(T::nested(value, scheme));
    let value = attempt!(T::sequence(value, scheme));
    let value = attempt!(T::boxed(value));
    let value = attempt!(unbox::<T>(value, scheme));
    Err(Reason::Mismatch {
        value: value.to_string(),
        actual: value.type_name(),
        expected: T::kind().to_string(),
    })
}

fn unbox<T: FieldValue>(value: Value, scheme: &str) -> Step<T> {
    match value {
        Value::Ref(inner) => T::exact(*inner)
            .or_else(T::convert)
            .or_else(|v| T::sequence(v, scheme))
            .rewrap(),
        other => Step::Next(other),
    }
}

/// RFC 3339 text, or a pointer to a time value.
pub fn parse_time(value: Value) -> Step<DateTime<FixedOffset>> {
    match value {
        Value::Str(text) => match DateTime::parse_from_rfc3339(&text) {
            Ok(t) => Step::Done(t),
            Err(e) => Step::Fail(Reason::Time(e)),
        },
        Value::Ref(inner) => match *inner {
            Value::Time(t) => Step::Done(t),
            other => Step::Next(Value::Ref(Box::new(other))),
        },
        other => Step::Next(other),
    }
}

/// Rebuild a sequence element by element. Nil elements become zero values.
pub fn fill_sequence<T: FieldValue>(items: Vec<Value>, scheme: &str) -> Step<Vec<T>> {
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if item.is_null() {
            out.push(T::zero());
            continue;
        }
        match coerce::<T>(item, scheme) {
            Ok(v) => out.push(v),
            Err(e) => {
                return Step::Fail(Reason::Element {
                    index,
                    source: Box::new(e),
                });
            }
        }
    }
    Step::Done(out)
}

/// Step 3 for types with a decode hook: decode into a fresh zero value.
pub fn decode_hook<T: FieldValue + MapDecode>(value: Value) -> Step<T> {
    let mut holder = T::zero();
    match holder.map_decode(value) {
        Ok(()) => Step::Done(holder),
        Err(e) => Step::Fail(Reason::Hook(e)),
    }
}

/// Step 1 for records: a `Value::Record` of the very same type.
pub fn record_exact<R: Record + Clone>(value: Value) -> Step<R> {
    match value {
        Value::Record(r) => match r.as_any().downcast_ref::<R>() {
            Some(same) => Step::Done(same.clone()),
            None => Step::Next(Value::Record(r)),
        },
        other => Step::Next(other),
    }
}

/// Step 5 for records: fill a zero record from a map, or from a foreign
/// record re-extracted under the active scheme.
pub fn record_nested<R: Record + FieldValue>(value: Value, scheme: &str) -> Step<R> {
    let mapped = match value {
        Value::Map(m) => m,
        Value::Record(r) => mapper::map_tags(&*r, scheme),
        other => return Step::Next(other),
    };
    let mut target = R::zero();
    match fill::fill_struct_by_tags(&mut target, &mapped, scheme) {
        Ok(()) => Step::Done(target),
        Err(e) => Step::Fail(Reason::Nested(e)),
    }
}
