//! Map builders: record → `Mapped`.
//!
//! Only visible (`pub`) fields take part. Inputs that are not records after
//! indirection (e.g. a `None` record) produce an empty map.

use crate::record::{AsRecord, Record, tag_head};
use crate::value::Mapped;

/// Every visible field under its own field name.
pub fn map_fields<R: AsRecord + ?Sized>(x: &R) -> Mapped {
    map_tags(x, "")
}

/// Fields declaring a name under `scheme`, keyed by the name head.
/// The empty scheme is plain mode.
pub fn map_tags<R: AsRecord + ?Sized>(x: &R, scheme: &str) -> Mapped {
    match x.as_record() {
        Some(record) => map_record(record, scheme),
        None => Mapped::new(),
    }
}

/// [`map_tags`] over a value already known to be a record.
pub fn map_record<R: Record + ?Sized>(record: &R, scheme: &str) -> Mapped {
    let mut result = Mapped::new();
    for (i, def) in record.fields().iter().enumerate() {
        let (Some(key), Some(slot)) = (def.key(scheme), record.field(i)) else {
            continue;
        };
        result.insert(key.to_string(), slot.extract(scheme));
    }
    result
}

/// Like [`map_tags`], but a field without a declaration under `scheme` falls
/// back to the first of `fallbacks` that has one. Nested records are mapped
/// with whichever scheme matched.
pub fn map_tags_with_default<R: AsRecord + ?Sized>(x: &R, scheme: &str, fallbacks: &[&str]) -> Mapped {
    let mut result = Mapped::new();
    let Some(record) = x.as_record() else {
        return result;
    };
    for (i, def) in record.fields().iter().enumerate() {
        let Some(slot) = record.field(i) else {
            continue;
        };
        let matched = std::iter::once(scheme)
            .chain(fallbacks.iter().copied())
            .find_map(|s| def.tag(s).map(|decl| (s, decl)));
        if let Some((used, decl)) = matched {
            result.insert(tag_head(decl).to_string(), slot.extract(used));
        }
    }
    result
}

/// Flatten nested records into one level, keyed by name heads under
/// `scheme`.
///
/// Non-record fields with a declaration are emitted raw. Record and
/// `Option<record>` fields are never emitted themselves; their flattened
/// fields are merged in instead. Keys are not deduplicated: on collision the
/// field processed last (declaration order, depth first) wins.
pub fn map_tags_flatten<R: AsRecord + ?Sized>(x: &R, scheme: &str) -> Mapped {
    let mut result = Mapped::new();
    if let Some(record) = x.as_record() {
        flatten_into(record, &mut result, scheme);
    }
    result
}

pub fn flatten_into<R: Record + ?Sized>(record: &R, out: &mut Mapped, scheme: &str) {
    for (i, def) in record.fields().iter().enumerate() {
        let Some(slot) = record.field(i) else {
            continue;
        };
        if slot.field_kind().is_record_like() {
            slot.flatten_into(out, scheme);
            continue;
        }
        if let Some(decl) = def.tag(scheme) {
            out.insert(tag_head(decl).to_string(), slot.raw());
        }
    }
}
