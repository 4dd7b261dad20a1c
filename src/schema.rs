//! Record schemas and header-to-field resolution.
//!
//! A record type registers an explicit ordered list of [`FieldSpec`]s once;
//! the resolver matches header names against that list to build positional
//! bindings. Unresolved columns are skipped during materialization, so a CSV
//! may carry more columns than the record models.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, warn};

use crate::bom;
use crate::error::CoerceError;
use crate::field_type::{FieldKind, Value};

/// One assignable field of a record type.
pub struct FieldSpec<T> {
    /// Header name this field binds to.
    pub name: &'static str,
    /// Declared target type.
    pub kind: FieldKind,
    /// Whether a blank field may become null under the blank-is-null policy.
    /// Nullable fields are `Option<_>` on the record.
    pub nullable: bool,
    /// Assigns a decoded value into the record.
    pub assign: fn(&mut T, Value) -> Result<(), CoerceError>,
}

impl<T> FieldSpec<T> {
    /// A non-nullable field.
    pub fn new(
        name: &'static str,
        kind: FieldKind,
        assign: fn(&mut T, Value) -> Result<(), CoerceError>,
    ) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            assign,
        }
    }

    /// A nullable field: blank text becomes [`Value::Null`] when the
    /// blank-is-null policy is active.
    pub fn nullable(
        name: &'static str,
        kind: FieldKind,
        assign: fn(&mut T, Value) -> Result<(), CoerceError>,
    ) -> Self {
        Self {
            name,
            kind,
            nullable: true,
            assign,
        }
    }
}

// Manual impls: the derives would bound T, but the assign fn pointer is
// copyable regardless of T.
impl<T> Clone for FieldSpec<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            kind: self.kind,
            nullable: self.nullable,
            assign: self.assign,
        }
    }
}

impl<T> fmt::Debug for FieldSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("nullable", &self.nullable)
            .finish()
    }
}

/// A record type materializable from CSV rows.
///
/// Implementors supply a default instance per row and an ordered field list.
/// The list order only matters for header-less ingestion, where fields bind
/// positionally; with a header, binding is by name.
pub trait CsvRecord: Default {
    /// The registered fields of this record type.
    fn schema() -> Vec<FieldSpec<Self>>
    where
        Self: Sized;
}

/// Positional bindings: one entry per header column, holding the index of
/// the matching [`FieldSpec`] or `None` for an unresolved column.
pub(crate) type Bindings = Vec<Option<usize>>;

/// Resolve a header row against a record type's field list.
///
/// The first header field is BOM-stripped before lookup. A header name with
/// no matching field resolves to `None` and is skipped for every row; this
/// is a warning, never an error. Duplicate header names: the first
/// occurrence wins, later duplicates are unresolved.
pub(crate) fn resolve<T>(headers: &[String], specs: &[FieldSpec<T>]) -> Bindings {
    let mut seen: HashSet<&str> = HashSet::with_capacity(headers.len());
    let bindings: Bindings = headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            let name = if column == 0 {
                bom::strip(header)
            } else {
                header.as_str()
            };
            if !seen.insert(name) {
                warn!(column, name, "duplicate header name; column unresolved");
                return None;
            }
            let found = specs.iter().position(|spec| spec.name == name);
            if found.is_none() {
                warn!(column, name, "no matching record field; column unresolved");
            }
            found
        })
        .collect();

    debug!(
        columns = headers.len(),
        bound = bindings.iter().filter(|b| b.is_some()).count(),
        "schema resolved"
    );
    bindings
}

/// Identity bindings for header-less ingestion: column i binds to field i.
pub(crate) fn positional<T>(specs: &[FieldSpec<T>]) -> Bindings {
    (0..specs.len()).map(Some).collect()
}
