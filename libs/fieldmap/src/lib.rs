//! Bidirectional mapping between typed records and dynamic maps.
//!
//! - [`map_fields`], [`map_tags`], [`map_tags_with_default`],
//!   [`map_tags_flatten`]: record → [`Mapped`].
//! - [`fill_struct`], [`fill_struct_by_tags`], [`fill_struct_deflate`]:
//!   [`Mapped`] → record, through one coercion ladder ([`coerce::coerce`]).
//! - [`scan_row`]: scan-based row source → record, same coercion rules.
//!
//! Records derive [`Record`]; field names per scheme come from
//! `#[tag(scheme = "name,modifiers")]`.
//!
//! ```ignore
//! #[derive(Record, Debug, Default, Clone)]
//! pub struct User {
//!     #[tag(json = "id")]
//!     pub id: i64,
//!     #[tag(json = "name,omitempty")]
//!     pub name: String,
//! }
//!
//! let m = fieldmap::map_tags(&user, "json");
//! fieldmap::fill_struct_by_tags(&mut other, &m, "json")?;
//! ```

extern crate self as fieldmap;

pub use fieldmap_derive::Record;

pub mod coerce;
pub mod error;
pub mod extract;
pub mod field;
pub mod fill;
pub mod hook;
pub mod json;
pub mod kind;
pub mod mapper;
pub mod record;
pub mod scan;
pub mod value;

pub use coerce::Step;
pub use error::{BoxError, FieldError, FillError, Reason, ScanError};
pub use field::{FieldValue, Slot};
pub use fill::{fill_struct, fill_struct_by_tags, fill_struct_deflate, set_field_from_tag};
pub use hook::{MapDecode, MapEncode};
pub use json::mapped_from_json;
pub use kind::Kind;
pub use mapper::{map_fields, map_tags, map_tags_flatten, map_tags_with_default};
pub use record::{AsRecord, FieldDef, FieldIndex, Record, tag_head};
pub use scan::{ALL_COLUMNS, Column, Dest, RowScanner, scan_row};
pub use value::{Mapped, Row, Value};
