use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::field::Slot;

/// Static description of one visible record field.
///
/// Only `pub` fields are described; everything else is invisible to the
/// engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Rust field name, used as the key in plain mode.
    pub name: &'static str,
    /// `(scheme, declaration)` pairs from `#[tag(...)]`.
    pub tags: &'static [(&'static str, &'static str)],
}

impl FieldDef {
    /// Full name declaration under `scheme`, modifiers included.
    pub fn tag(&self, scheme: &str) -> Option<&'static str> {
        self.tags.iter().find(|(s, _)| *s == scheme).map(|(_, decl)| *decl)
    }

    /// Effective key under `scheme`: the field name for the empty scheme,
    /// the name head of the declaration otherwise.
    pub fn key(&self, scheme: &str) -> Option<&'static str> {
        if scheme.is_empty() {
            Some(self.name)
        } else {
            self.tag(scheme).map(tag_head)
        }
    }
}

/// Portion of a name declaration before its first modifier separator.
pub fn tag_head(decl: &str) -> &str {
    decl.split_once(',').map_or(decl, |(head, _)| head)
}

/// Structured value with named, typed fields.
///
/// Implemented by `#[derive(Record)]`. Field indices follow declaration
/// order of the visible fields and match `fields()`.
pub trait Record: Any + Send + Sync + fmt::Debug {
    fn type_name(&self) -> &'static str;

    fn fields(&self) -> &'static [FieldDef];

    fn field(&self, index: usize) -> Option<&dyn Slot>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Slot>;

    fn as_any(&self) -> &dyn Any;
}

/// Anything that may turn out to be a record after indirection.
///
/// Map builders accept these; a value that is not a record degrades to an
/// empty record.
pub trait AsRecord {
    fn as_record(&self) -> Option<&dyn Record>;
}

impl AsRecord for dyn Record {
    fn as_record(&self) -> Option<&dyn Record> {
        Some(self)
    }
}

impl<R: AsRecord> AsRecord for Option<R> {
    fn as_record(&self) -> Option<&dyn Record> {
        self.as_ref().and_then(AsRecord::as_record)
    }
}

impl<R: AsRecord + ?Sized> AsRecord for Box<R> {
    fn as_record(&self) -> Option<&dyn Record> {
        (**self).as_record()
    }
}

impl<R: AsRecord + ?Sized> AsRecord for Arc<R> {
    fn as_record(&self) -> Option<&dyn Record> {
        (**self).as_record()
    }
}

/// Key → field index lookup for one record type under one scheme.
///
/// Built once per fill call by scanning field metadata.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    scheme: String,
    by_key: HashMap<&'static str, usize>,
}

impl FieldIndex {
    pub fn build<R: Record + ?Sized>(record: &R, scheme: &str) -> Self {
        let by_key = record
            .fields()
            .iter()
            .enumerate()
            .filter_map(|(i, def)| def.key(scheme).map(|k| (k, i)))
            .collect();
        Self {
            scheme: scheme.to_string(),
            by_key,
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
