use std::any::Any;

use chrono::{DateTime, FixedOffset, Utc};

use crate::coerce::{self, Step};
use crate::error::{FillError, Reason};
use crate::extract;
use crate::kind::Kind;
use crate::scan::Column;
use crate::value::{Mapped, Value};

/// A type that can live in a record field.
///
/// Each coercion step of the ladder in [`coerce::coerce`] has a hook here.
/// A hook either finishes (`Done`/`Fail`) or hands the value back (`Next`)
/// so the next step can try. Defaults hand the value back.
pub trait FieldValue: Sized + 'static {
    fn kind() -> Kind;

    /// The zero value written for nil sequence elements and used as the
    /// starting point of nested fills and decode hooks.
    fn zero() -> Self;

    /// Dynamic representation under `scheme`.
    fn to_value(&self, scheme: &str) -> Value;

    /// Representation without recursion into nested shapes (flatten mode).
    fn to_raw(&self) -> Value {
        self.to_value("")
    }

    /// Step 1: the value already has this exact type.
    fn exact(value: Value) -> Step<Self>;

    /// Step 2: standard conversion.
    fn convert(value: Value) -> Step<Self> {
        Step::Next(value)
    }

    /// Step 3: custom decode hook.
    fn decode(value: Value) -> Step<Self> {
        Step::Next(value)
    }

    /// Step 4: time values and RFC 3339 text.
    fn time(value: Value) -> Step<Self> {
        Step::Next(value)
    }

    /// Step 5: a dynamic map (or foreign record) filled into a record.
    fn nested(value: Value, _scheme: &str) -> Step<Self> {
        Step::Next(value)
    }

    /// Step 6: element-by-element sequence rebuild.
    fn sequence(value: Value, _scheme: &str) -> Step<Self> {
        Step::Next(value)
    }

    /// Step 7: box a plain value into a pointer field.
    fn boxed(value: Value) -> Step<Self> {
        Step::Next(value)
    }

    /// Fresh value deflate-filled from a flat map; `None` for non-records.
    fn deflate(_mapped: &Mapped, _scheme: &str) -> Option<Result<Self, FillError>> {
        None
    }

    /// Merge this value's flattened fields into `out`; no-op for non-records.
    fn flatten(&self, _out: &mut Mapped, _scheme: &str) {}

    /// Row value capability of this type, if any.
    fn column() -> Option<Box<dyn Column>> {
        None
    }
}

/// Object-safe access to one field of a record.
pub trait Slot {
    fn field_kind(&self) -> Kind;

    fn extract(&self, scheme: &str) -> Value;

    fn raw(&self) -> Value;

    /// Coerce `value` into this field and write it.
    fn assign(&mut self, value: Value, scheme: &str) -> Result<(), Reason>;

    /// Replace this field with a fresh deflate fill; `None` if the field is
    /// not record-shaped.
    fn deflate_in_place(&mut self, mapped: &Mapped, scheme: &str) -> Option<Result<(), FillError>>;

    fn flatten_into(&self, out: &mut Mapped, scheme: &str);

    fn new_column(&self) -> Option<Box<dyn Column>>;
}

impl<T: FieldValue> Slot for T {
    fn field_kind(&self) -> Kind {
        T::kind()
    }

    fn extract(&self, scheme: &str) -> Value {
        self.to_value(scheme)
    }

    fn raw(&self) -> Value {
        self.to_raw()
    }

    fn assign(&mut self, value: Value, scheme: &str) -> Result<(), Reason> {
        *self = coerce::coerce(value, scheme)?;
        Ok(())
    }

    fn deflate_in_place(&mut self, mapped: &Mapped, scheme: &str) -> Option<Result<(), FillError>> {
        T::deflate(mapped, scheme).map(|filled| filled.map(|v| *self = v))
    }

    fn flatten_into(&self, out: &mut Mapped, scheme: &str) {
        self.flatten(out, scheme)
    }

    fn new_column(&self) -> Option<Box<dyn Column>> {
        T::column()
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

macro_rules! numeric_field {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn kind() -> Kind {
                    Kind::$variant
                }

                fn zero() -> Self {
                    0 as $ty
                }

                fn to_value(&self, _scheme: &str) -> Value {
                    Value::$variant(*self)
                }

                fn exact(value: Value) -> Step<Self> {
                    match value {
                        Value::$variant(v) => Step::Done(v),
                        other => Step::Next(other),
                    }
                }

                fn convert(value: Value) -> Step<Self> {
                    match value {
                        Value::I8(v) => Step::Done(v as $ty),
                        Value::I16(v) => Step::Done(v as $ty),
                        Value::I32(v) => Step::Done(v as $ty),
                        Value::I64(v) => Step::Done(v as $ty),
                        Value::U8(v) => Step::Done(v as $ty),
                        Value::U16(v) => Step::Done(v as $ty),
                        Value::U32(v) => Step::Done(v as $ty),
                        Value::U64(v) => Step::Done(v as $ty),
                        Value::F32(v) => Step::Done(v as $ty),
                        Value::F64(v) => Step::Done(v as $ty),
                        other => Step::Next(other),
                    }
                }
            }
        )*
    };
}

numeric_field! {
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
}

impl FieldValue for bool {
    fn kind() -> Kind {
        Kind::Bool
    }

    fn zero() -> Self {
        false
    }

    fn to_value(&self, _scheme: &str) -> Value {
        Value::Bool(*self)
    }

    fn exact(value: Value) -> Step<Self> {
        match value {
            Value::Bool(v) => Step::Done(v),
            other => Step::Next(other),
        }
    }
}

impl FieldValue for String {
    fn kind() -> Kind {
        Kind::Str
    }

    fn zero() -> Self {
        String::new()
    }

    fn to_value(&self, _scheme: &str) -> Value {
        Value::Str(self.clone())
    }

    fn exact(value: Value) -> Step<Self> {
        match value {
            Value::Str(v) => Step::Done(v),
            other => Step::Next(other),
        }
    }

    fn convert(value: Value) -> Step<Self> {
        match value {
            Value::Bytes(b) => match String::from_utf8(b) {
                Ok(s) => Step::Done(s),
                Err(e) => Step::Next(Value::Bytes(e.into_bytes())),
            },
            other => Step::Next(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

impl FieldValue for DateTime<FixedOffset> {
    fn kind() -> Kind {
        Kind::Time
    }

    fn zero() -> Self {
        DateTime::<Utc>::default().into()
    }

    fn to_value(&self, _scheme: &str) -> Value {
        Value::Time(*self)
    }

    fn exact(value: Value) -> Step<Self> {
        match value {
            Value::Time(t) => Step::Done(t),
            other => Step::Next(other),
        }
    }

    fn time(value: Value) -> Step<Self> {
        coerce::parse_time(value)
    }
}

impl FieldValue for DateTime<Utc> {
    fn kind() -> Kind {
        Kind::Time
    }

    fn zero() -> Self {
        DateTime::<Utc>::default()
    }

    fn to_value(&self, _scheme: &str) -> Value {
        Value::Time((*self).into())
    }

    fn exact(value: Value) -> Step<Self> {
        Step::Next(value)
    }

    fn convert(value: Value) -> Step<Self> {
        match value {
            Value::Time(t) => Step::Done(t.with_timezone(&Utc)),
            other => Step::Next(other),
        }
    }

    fn time(value: Value) -> Step<Self> {
        coerce::parse_time(value).map(|t| t.with_timezone(&Utc))
    }
}

// ---------------------------------------------------------------------------
// Dynamic holders
// ---------------------------------------------------------------------------

impl FieldValue for Value {
    fn kind() -> Kind {
        Kind::Any
    }

    fn zero() -> Self {
        Value::Null
    }

    fn to_value(&self, _scheme: &str) -> Value {
        self.clone()
    }

    fn exact(value: Value) -> Step<Self> {
        Step::Done(value)
    }
}

impl FieldValue for Mapped {
    fn kind() -> Kind {
        Kind::Map
    }

    fn zero() -> Self {
        Mapped::new()
    }

    fn to_value(&self, _scheme: &str) -> Value {
        Value::Map(self.clone())
    }

    fn exact(value: Value) -> Step<Self> {
        match value {
            Value::Map(m) => Step::Done(m),
            other => Step::Next(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Pointer, box, sequence
// ---------------------------------------------------------------------------

impl<T: FieldValue> FieldValue for Option<T> {
    fn kind() -> Kind {
        Kind::Ptr(Box::new(T::kind()))
    }

    fn zero() -> Self {
        None
    }

    fn to_value(&self, scheme: &str) -> Value {
        extract::extract_pointer(self.as_ref(), scheme)
    }

    fn to_raw(&self) -> Value {
        match self {
            Some(v) => Value::Ref(Box::new(v.to_raw())),
            None => Value::Null,
        }
    }

    fn exact(value: Value) -> Step<Self> {
        match value {
            Value::Ref(inner) => T::exact(*inner).map(Some).rewrap(),
            other => Step::Next(other),
        }
    }

    fn convert(value: Value) -> Step<Self> {
        match value {
            Value::Ref(inner) => T::convert(*inner).map(Some).rewrap(),
            other => Step::Next(other),
        }
    }

    fn decode(value: Value) -> Step<Self> {
        T::decode(value).map(Some)
    }

    fn time(value: Value) -> Step<Self> {
        T::time(value).map(Some)
    }

    fn nested(value: Value, scheme: &str) -> Step<Self> {
        match value {
            // Same record type is boxed whole, not re-extracted.
            Value::Record(_) => T::exact(value).or_else(|v| T::nested(v, scheme)).map(Some),
            other => T::nested(other, scheme).map(Some),
        }
    }

    fn sequence(value: Value, scheme: &str) -> Step<Self> {
        match value {
            Value::Ref(inner) => T::sequence(*inner, scheme).map(Some).rewrap(),
            other => T::sequence(other, scheme).map(Some),
        }
    }

    fn boxed(value: Value) -> Step<Self> {
        if matches!(value, Value::Ref(_)) {
            return Step::Next(value);
        }
        T::exact(value).or_else(T::convert).map(Some)
    }

    fn deflate(mapped: &Mapped, scheme: &str) -> Option<Result<Self, FillError>> {
        T::deflate(mapped, scheme).map(|filled| filled.map(Some))
    }

    fn flatten(&self, out: &mut Mapped, scheme: &str) {
        if let Some(v) = self {
            v.flatten(out, scheme);
        }
    }

    fn column() -> Option<Box<dyn Column>> {
        T::column()
    }
}

impl<T: FieldValue> FieldValue for Box<T> {
    fn kind() -> Kind {
        T::kind()
    }

    fn zero() -> Self {
        Box::new(T::zero())
    }

    fn to_value(&self, scheme: &str) -> Value {
        (**self).to_value(scheme)
    }

    fn to_raw(&self) -> Value {
        (**self).to_raw()
    }

    fn exact(value: Value) -> Step<Self> {
        T::exact(value).map(Box::new)
    }

    fn convert(value: Value) -> Step<Self> {
        T::convert(value).map(Box::new)
    }

    fn decode(value: Value) -> Step<Self> {
        T::decode(value).map(Box::new)
    }

    fn time(value: Value) -> Step<Self> {
        T::time(value).map(Box::new)
    }

    fn nested(value: Value, scheme: &str) -> Step<Self> {
        T::nested(value, scheme).map(Box::new)
    }

    fn sequence(value: Value, scheme: &str) -> Step<Self> {
        T::sequence(value, scheme).map(Box::new)
    }

    fn boxed(value: Value) -> Step<Self> {
        T::boxed(value).map(Box::new)
    }

    fn deflate(mapped: &Mapped, scheme: &str) -> Option<Result<Self, FillError>> {
        T::deflate(mapped, scheme).map(|filled| filled.map(Box::new))
    }

    fn flatten(&self, out: &mut Mapped, scheme: &str) {
        (**self).flatten(out, scheme)
    }

    fn column() -> Option<Box<dyn Column>> {
        T::column()
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn kind() -> Kind {
        Kind::Seq(Box::new(T::kind()))
    }

    fn zero() -> Self {
        Vec::new()
    }

    fn to_value(&self, scheme: &str) -> Value {
        if let Some(bytes) = (self as &dyn Any).downcast_ref::<Vec<u8>>() {
            return Value::Bytes(bytes.clone());
        }
        extract::extract_sequence(self, scheme)
    }

    fn to_raw(&self) -> Value {
        if let Some(bytes) = (self as &dyn Any).downcast_ref::<Vec<u8>>() {
            return Value::Bytes(bytes.clone());
        }
        Value::Array(self.iter().map(FieldValue::to_raw).collect())
    }

    fn exact(value: Value) -> Step<Self> {
        match value {
            Value::Bytes(b) => bytes_into::<T>(b),
            other => Step::Next(other),
        }
    }

    fn convert(value: Value) -> Step<Self> {
        match value {
            Value::Str(s) if T::kind() == Kind::U8 => bytes_into::<T>(s.into_bytes()),
            other => Step::Next(other),
        }
    }

    fn sequence(value: Value, scheme: &str) -> Step<Self> {
        match value {
            Value::Array(items) => coerce::fill_sequence(items, scheme),
            Value::Bytes(b) => coerce::fill_sequence(b.into_iter().map(Value::U8).collect(), scheme),
            other => Step::Next(other),
        }
    }
}

/// `Vec<u8>` straight from bytes; any other element type hands them back.
fn bytes_into<T: FieldValue>(bytes: Vec<u8>) -> Step<Vec<T>> {
    let boxed: Box<dyn Any> = Box::new(bytes);
    match boxed.downcast::<Vec<T>>() {
        Ok(v) => Step::Done(*v),
        Err(boxed) => match boxed.downcast::<Vec<u8>>() {
            Ok(b) => Step::Next(Value::Bytes(*b)),
            Err(_) => Step::Next(Value::Null),
        },
    }
}
