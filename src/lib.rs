//! csv-loom: header-driven typed record loading for delimited text
//!
//! Turns tabular text into typed domain objects without hand-written
//! per-column parsing: BOM detection and normalization, header-to-field
//! schema resolution, per-field type coercion with pluggable boolean and
//! date/time handling, and per-row error attribution by source line number.
//! Tokenizing physical lines (quoting, embedded delimiters and newlines) is
//! delegated to the `csv` crate.
//!
//! # Quick Start
//!
//! ```no_run
//! use csv_loom::{CsvRecord, FieldKind, FieldSpec, Loader};
//!
//! #[derive(Default, Debug)]
//! struct Order {
//!     id: i64,
//!     item: String,
//!     shipped: bool,
//! }
//!
//! impl CsvRecord for Order {
//!     fn schema() -> Vec<FieldSpec<Self>> {
//!         vec![
//!             FieldSpec::new("id", FieldKind::Int64, |r, v| {
//!                 r.id = v.into_i64()?;
//!                 Ok(())
//!             }),
//!             FieldSpec::new("item", FieldKind::Text, |r, v| {
//!                 r.item = v.into_text()?;
//!                 Ok(())
//!             }),
//!             FieldSpec::new("shipped", FieldKind::Bool, |r, v| {
//!                 r.shipped = v.into_bool()?;
//!                 Ok(())
//!             }),
//!         ]
//!     }
//! }
//!
//! let file = std::fs::File::open("orders.csv").unwrap();
//! Loader::new()
//!     .read(file, |index, order: Order| {
//!         println!("row {index}: {order:?}");
//!     })
//!     .unwrap();
//! ```
//!
//! Columns with no matching record field are skipped, so a CSV may carry
//! more columns than the record models. The reverse is a per-row error.
//!
//! # Delivery modes
//!
//! - push: [`Loader::read`] (stop on first failure) and
//!   [`Loader::read_outcomes`] (report and continue, cancellable)
//! - pull: [`Loader::records`], a lazy single-pass iterator
//! - converter: [`Loader::read_with`] / [`Loader::records_with`], bypassing
//!   schema resolution and coercion entirely
//! - raw fields and header-keyed maps: [`Loader::read_raw`],
//!   [`Loader::read_map`]
//!
//! # Encodings
//!
//! Input is consumed as UTF-8; a UTF-8 BOM on the first header field is
//! stripped before schema resolution. For UTF-16 or unknown input, decode
//! first with [`bom::decode`], which honors the byte-order-mark.

pub mod bom;
mod coerce;
mod error;
mod field_type;
mod reader;
mod schema;
mod split;
mod writer;

pub use coerce::{
    CoercionContext, ISO_DATE, ISO_DATE_TIME, ISO_TIME, coerce, default_boolean_reader,
};
pub use error::{CoerceError, ReadError, Result};
pub use field_type::{FieldKind, ParseFromText, Value};
pub use reader::{Loader, Records, RecordsWith};
pub use schema::{CsvRecord, FieldSpec};
pub use split::split;
pub use writer::{CsvWriter, WriterBuilder, quoted_line, write_bom};
