//! Struct fillers: `Mapped` → record.
//!
//! Per-entry failures never stop a fill. Every resolvable field is written
//! and every failure is returned together in one [`FillError`].

use crate::error::{FieldError, FillError};
use crate::field::FieldValue;
use crate::record::{FieldIndex, Record};
use crate::value::{Mapped, Value};

/// Fill fields by field name. Works like decoding JSON, with a `Mapped`
/// instead of bytes.
pub fn fill_struct<R: Record + ?Sized>(obj: &mut R, mapped: &Mapped) -> Result<(), FillError> {
    fill_struct_by_tags(obj, mapped, "")
}

/// Fill the fields whose name head under `scheme` matches a key.
/// The empty scheme resolves keys by field name.
pub fn fill_struct_by_tags<R: Record + ?Sized>(
    obj: &mut R,
    mapped: &Mapped,
    scheme: &str,
) -> Result<(), FillError> {
    let index = FieldIndex::build(obj, scheme);
    let mut errors = Vec::new();
    for (key, value) in mapped {
        if value.is_null() {
            continue;
        }
        if let Err(e) = set_field_from_tag(obj, key, value.clone(), &index) {
            errors.push(e);
        }
    }
    if !errors.is_empty() {
        tracing::debug!(record = obj.type_name(), scheme, errors = errors.len(), "fill finished with errors");
    }
    FillError::check(errors)
}

/// Fill nested records from one flat map.
///
/// The current level is filled by tags first. Then every record or
/// `Option<record>` field is replaced by a fresh value deflate-filled from
/// the same full map, whether or not it was already populated. A failing
/// nested field keeps its previous value and does not stop its siblings.
pub fn fill_struct_deflate<R: Record + ?Sized>(
    obj: &mut R,
    mapped: &Mapped,
    scheme: &str,
) -> Result<(), FillError> {
    let mut errors = match fill_struct_by_tags(obj, mapped, scheme) {
        Ok(()) => Vec::new(),
        Err(e) => e.into_errors(),
    };
    for i in 0..obj.fields().len() {
        let Some(slot) = obj.field_mut(i) else {
            continue;
        };
        if let Some(Err(e)) = slot.deflate_in_place(mapped, scheme) {
            errors.extend(e.into_errors());
        }
    }
    FillError::check(errors)
}

/// A zero `R` deflate-filled from `mapped`.
pub fn deflate_into_zero<R: Record + FieldValue>(mapped: &Mapped, scheme: &str) -> Result<R, FillError> {
    let mut target = R::zero();
    fill_struct_deflate(&mut target, mapped, scheme)?;
    Ok(target)
}

/// Write one value into the field that `key` resolves to through `index`.
///
/// `Ok(false)` when the key names no field or the value is nil; nothing is
/// written then.
pub fn set_field_from_tag<R: Record + ?Sized>(
    obj: &mut R,
    key: &str,
    value: Value,
    index: &FieldIndex,
) -> Result<bool, FieldError> {
    let Some(slot) = index.get(key).and_then(|i| obj.field_mut(i)) else {
        tracing::trace!(key, scheme = index.scheme(), "no field for key");
        return Ok(false);
    };
    if value.is_null() {
        return Ok(false);
    }
    slot.assign(value, index.scheme())
        .map(|()| true)
        .map_err(|reason| FieldError::new(index.scheme(), key, reason))
}
