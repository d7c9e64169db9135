//! Row adapter: bridges a scan-based row source to the map/fill machinery.
//!
//! The record's current values pick one typed destination per requested
//! column, the row source writes into them, and the scanned values are
//! filled back into the record through the usual coercion rules.

use chrono::{DateTime, FixedOffset};

use crate::coerce::coerce;
use crate::error::{BoxError, ScanError};
use crate::field::Slot;
use crate::fill;
use crate::kind::Kind;
use crate::mapper;
use crate::record::{FieldIndex, Record};
use crate::value::{Row, Value};

/// Key list sentinel meaning "every visible field".
pub const ALL_COLUMNS: &str = "*";

/// Row value capability of a field type: absorbs a scanned driver value and
/// reads it back as a dynamic value.
pub trait Column: Send {
    fn scan(&mut self, src: Value) -> Result<(), BoxError>;

    fn read(&self) -> Result<Value, BoxError>;
}

/// Row-fetch collaborator: populates one destination per requested column.
pub trait RowScanner {
    fn scan(&mut self, dest: &mut [Dest]) -> Result<(), BoxError>;
}

/// One typed scan destination.
pub enum Dest {
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
    Bytes(Vec<u8>),
    Time(DateTime<FixedOffset>),
    /// Generic dynamic value slot.
    Any(Value),
    /// Fresh instance of the field's own type.
    Column(Box<dyn Column>),
}

impl Dest {
    /// Destination matching the dynamic type of `value`, for primitive and
    /// time values.
    pub fn for_value(value: &Value) -> Option<Dest> {
        let dest = match value {
            Value::Bool(_) => Dest::Bool(false),
            Value::I8(_) => Dest::I8(0),
            Value::I16(_) => Dest::I16(0),
            Value::I32(_) => Dest::I32(0),
            Value::I64(_) => Dest::I64(0),
            Value::U8(_) => Dest::U8(0),
            Value::U16(_) => Dest::U16(0),
            Value::U32(_) => Dest::U32(0),
            Value::U64(_) => Dest::U64(0),
            Value::F32(_) => Dest::F32(0.0),
            Value::F64(_) => Dest::F64(0.0),
            Value::Str(_) => Dest::Str(String::new()),
            Value::Bytes(_) => Dest::Bytes(Vec::new()),
            Value::Time(t) => Dest::Time(*t),
            _ => return None,
        };
        Some(dest)
    }

    /// Destination for a declared field kind; pointers use their pointee.
    pub fn for_kind(kind: &Kind) -> Option<Dest> {
        let dest = match kind.indirect() {
            Kind::Bool => Dest::Bool(false),
            Kind::I8 => Dest::I8(0),
            Kind::I16 => Dest::I16(0),
            Kind::I32 => Dest::I32(0),
            Kind::I64 => Dest::I64(0),
            Kind::U8 => Dest::U8(0),
            Kind::U16 => Dest::U16(0),
            Kind::U32 => Dest::U32(0),
            Kind::U64 => Dest::U64(0),
            Kind::F32 => Dest::F32(0.0),
            Kind::F64 => Dest::F64(0.0),
            Kind::Str => Dest::Str(String::new()),
            Kind::Seq(inner) if **inner == Kind::U8 => Dest::Bytes(Vec::new()),
            _ => return None,
        };
        Some(dest)
    }

    /// Pointer-style type name, e.g. `*i64`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Dest::Bool(_) => "*bool",
            Dest::I8(_) => "*i8",
            Dest::I16(_) => "*i16",
            Dest::I32(_) => "*i32",
            Dest::I64(_) => "*i64",
            Dest::U8(_) => "*u8",
            Dest::U16(_) => "*u16",
            Dest::U32(_) => "*u32",
            Dest::U64(_) => "*u64",
            Dest::F32(_) => "*f32",
            Dest::F64(_) => "*f64",
            Dest::Str(_) => "*String",
            Dest::Bytes(_) => "*Vec<u8>",
            Dest::Time(_) => "*DateTime",
            Dest::Any(_) => "*Value",
            Dest::Column(_) => "*Column",
        }
    }

    /// Write a driver value into this destination, converting it with the
    /// same rules as a fill.
    pub fn set(&mut self, value: Value) -> Result<(), BoxError> {
        match self {
            Dest::Bool(d) => *d = coerce(value, "")?,
            Dest::I8(d) => *d = coerce(value, "")?,
            Dest::I16(d) => *d = coerce(value, "")?,
            Dest::I32(d) => *d = coerce(value, "")?,
            Dest::I64(d) => *d = coerce(value, "")?,
            Dest::U8(d) => *d = coerce(value, "")?,
            Dest::U16(d) => *d = coerce(value, "")?,
            Dest::U32(d) => *d = coerce(value, "")?,
            Dest::U64(d) => *d = coerce(value, "")?,
            Dest::F32(d) => *d = coerce(value, "")?,
            Dest::F64(d) => *d = coerce(value, "")?,
            Dest::Str(d) => *d = coerce(value, "")?,
            Dest::Bytes(d) => *d = coerce(value, "")?,
            Dest::Time(d) => *d = coerce(value, "")?,
            Dest::Any(d) => *d = value,
            Dest::Column(c) => c.scan(value)?,
        }
        Ok(())
    }

    /// Scanned-back value. Primitive destinations are dereferenced, column
    /// destinations are read through their capability, anything else is
    /// dropped.
    fn into_value(self, key: &str) -> Option<Value> {
        let value = match self {
            Dest::Bool(v) => Value::Bool(v),
            Dest::I8(v) => Value::I8(v),
            Dest::I16(v) => Value::I16(v),
            Dest::I32(v) => Value::I32(v),
            Dest::I64(v) => Value::I64(v),
            Dest::U8(v) => Value::U8(v),
            Dest::U16(v) => Value::U16(v),
            Dest::U32(v) => Value::U32(v),
            Dest::U64(v) => Value::U64(v),
            Dest::F32(v) => Value::F32(v),
            Dest::F64(v) => Value::F64(v),
            Dest::Str(v) => Value::Str(v),
            Dest::Bytes(v) => Value::Bytes(v),
            Dest::Time(v) => Value::Time(v),
            Dest::Column(c) => match c.read() {
                Ok(v) => v,
                Err(e) => {
                    tracing::debug!(key, error = %e, "column read failed, dropping");
                    return None;
                }
            },
            Dest::Any(_) => {
                tracing::trace!(key, "unrecognized destination, dropping");
                return None;
            }
        };
        Some(value)
    }
}

impl std::fmt::Debug for Dest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

impl RowScanner for Row {
    fn scan(&mut self, dest: &mut [Dest]) -> Result<(), BoxError> {
        if dest.len() != self.0.len() {
            return Err(format!("expected {} destination arguments in scan, not {}", self.0.len(), dest.len()).into());
        }
        for (i, (d, v)) in dest.iter_mut().zip(self.0.iter()).enumerate() {
            d.set(v.clone())
                .map_err(|e| -> BoxError { format!("converting column {i}: {e}").into() })?;
        }
        Ok(())
    }
}

/// Scan one row into `obj`.
///
/// `keys` are the requested columns, in row order; none, or the single
/// sentinel `"*"`, means every visible field (field name, or name head under
/// `scheme`) in declaration order. A row source failure aborts immediately
/// and is returned unmodified; the record is left untouched then.
pub fn scan_row<S, R>(row: &mut S, obj: &mut R, scheme: &str, keys: &[&str]) -> Result<(), ScanError>
where
    S: RowScanner + ?Sized,
    R: Record + ?Sized,
{
    let current = mapper::map_record(&*obj, scheme);
    let index = FieldIndex::build(obj, scheme);
    let keys: Vec<String> = if keys.is_empty() || matches!(keys, [k] if *k == ALL_COLUMNS) {
        obj.fields()
            .iter()
            .filter_map(|def| def.key(scheme))
            .map(str::to_string)
            .collect()
    } else {
        keys.iter().map(|k| k.to_string()).collect()
    };

    let mut dest: Vec<Dest> = keys
        .iter()
        .map(|key| {
            let slot = index.get(key).and_then(|i| obj.field(i));
            destination(current.get(key).unwrap_or(&Value::Null), slot)
        })
        .collect();

    tracing::debug!(record = obj.type_name(), scheme, columns = dest.len(), "scanning row");
    row.scan(&mut dest).map_err(ScanError::Fetch)?;

    let mut scanned = current;
    for (key, d) in keys.iter().zip(dest) {
        if let Some(value) = d.into_value(key) {
            scanned.insert(key.clone(), value);
        }
    }
    if scheme.is_empty() {
        fill::fill_struct(obj, &scanned)?;
    } else {
        fill::fill_struct_by_tags(obj, &scanned, scheme)?;
    }
    Ok(())
}

/// Column capability first, then the current value's dynamic type, then the
/// declared kind of an empty field; a generic slot otherwise.
fn destination(current: &Value, slot: Option<&dyn Slot>) -> Dest {
    if let Some(column) = slot.and_then(|s| s.new_column()) {
        return Dest::Column(column);
    }
    if let Some(dest) = Dest::for_value(current) {
        return dest;
    }
    if current.is_null() {
        if let Some(dest) = slot.and_then(|s| Dest::for_kind(&s.field_kind())) {
            return dest;
        }
    }
    Dest::Any(Value::Null)
}
