//! The flattened record stream handed over by the ingestion layer.
//!
//! A [`RecordStream`] maps field names to equal-length [`FieldColumn`]s,
//! one entry per observed `(core, snapnum)` pair. Records belonging to the
//! same core must be contiguous; nothing here checks that.

use std::collections::BTreeMap;

use coretree_types::FieldColumn;
use tracing::warn;

use crate::error::ForestError;
use crate::forest::{CORE_STATE, HOST_ROW, TOP_HOST_ROW};

/// Name of the core identifier field.
pub const CORE_TAG: &str = "core_tag";
/// Name of the host identifier field.
pub const HOST_CORE: &str = "host_core";
/// Name of the time-step field.
pub const SNAPNUM: &str = "snapnum";
/// Name of the central flag field.
pub const CENTRAL: &str = "central";
/// Name of the merged flag field.
pub const MERGED: &str = "merged";

/// Fields that are always carried into the output.
pub const ESSENTIAL_FIELDS: [&str; 5] = [CORE_TAG, HOST_CORE, SNAPNUM, CENTRAL, MERGED];

/// Names of the derived matrices; no record field may be selected under them.
pub const RESERVED_FIELDS: [&str; 3] = [HOST_ROW, TOP_HOST_ROW, CORE_STATE];

/// Field-name-to-column mapping for the flattened record stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStream {
    /// Columns by field name.
    fields: BTreeMap<String, FieldColumn>,
    /// Record count shared by every column; set by the first insert.
    len: Option<usize>,
}

impl RecordStream {
    /// Create an empty record stream.
    pub const fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
            len: None,
        }
    }

    /// Add or replace a field column.
    ///
    /// A column replacing the only field in the stream sets a new record
    /// count.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::RowCountMismatch`] if the column length
    /// differs from the other columns in the stream.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        column: impl Into<FieldColumn>,
    ) -> Result<(), ForestError> {
        let name = name.into();
        let column = column.into();
        let actual = column.len();
        let has_others = self.fields.keys().any(|k| *k != name);
        match self.len {
            Some(expected) if has_others && expected != actual => {
                return Err(ForestError::RowCountMismatch {
                    field: name,
                    expected,
                    actual,
                });
            }
            _ => self.len = Some(actual),
        }
        self.fields.insert(name, column);
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        column: impl Into<FieldColumn>,
    ) -> Result<Self, ForestError> {
        self.insert(name, column)?;
        Ok(self)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.len.unwrap_or(0)
    }

    /// Returns `true` if the stream holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow a field column by name.
    pub fn field(&self, name: &str) -> Option<&FieldColumn> {
        self.fields.get(name)
    }

    /// Borrow a field column, failing if absent.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::MissingField`] if `name` is not present.
    pub fn require(&self, name: &str) -> Result<&FieldColumn, ForestError> {
        self.field(name)
            .ok_or_else(|| ForestError::MissingField(name.to_owned()))
    }

    /// Borrow an integer field widened to `i64`.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::MissingField`] if absent, or
    /// [`ForestError::NonIntegerField`] if the column is float-typed.
    pub fn require_integers(&self, name: &str) -> Result<std::borrow::Cow<'_, [i64]>, ForestError> {
        self.require(name)?
            .to_integers()
            .ok_or_else(|| ForestError::NonIntegerField(name.to_owned()))
    }

    /// Iterate over field names in sorted order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Resolve the list of fields to carry into the output.
    ///
    /// `None` selects every field in the stream. An explicit list is kept
    /// in order and extended with any essential field it does not name.
    ///
    /// # Errors
    ///
    /// - [`ForestError::ReservedField`] if a selected field is named like a
    ///   derived matrix (see [`RESERVED_FIELDS`]).
    /// - [`ForestError::MissingField`] for the first selected field that is
    ///   not present, essential fields included.
    pub fn select_fields(&self, include: Option<&[String]>) -> Result<Vec<String>, ForestError> {
        let mut selected: Vec<String> = match include {
            None => self.fields.keys().cloned().collect(),
            Some(list) => list.to_vec(),
        };
        for essential in ESSENTIAL_FIELDS {
            if !selected.iter().any(|f| f == essential) {
                selected.push(essential.to_owned());
            }
        }
        if let Some(reserved) = selected.iter().find(|f| RESERVED_FIELDS.contains(&f.as_str())) {
            return Err(ForestError::ReservedField(reserved.clone()));
        }
        if let Some(missing) = selected.iter().find(|f| !self.fields.contains_key(f.as_str())) {
            return Err(ForestError::MissingField(missing.clone()));
        }
        Ok(selected)
    }

    /// Make every central core host itself: `host_core = core_tag` where
    /// `central == 1`. Returns the number of records rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::MissingField`] or
    /// [`ForestError::NonIntegerField`] if the three fields involved are
    /// absent or float-typed.
    pub fn normalize_central_hosts(&mut self) -> Result<usize, ForestError> {
        let tags = self.require_integers(CORE_TAG)?.into_owned();
        let central = self.require_integers(CENTRAL)?.into_owned();
        let mut hosts = self.require_integers(HOST_CORE)?.into_owned();

        let mut rewritten: usize = 0;
        for ((host, &tag), &flag) in hosts.iter_mut().zip(&tags).zip(&central) {
            if flag == 1 && *host != tag {
                *host = tag;
                rewritten = rewritten.saturating_add(1);
            }
        }
        if rewritten > 0 {
            warn!(rewritten, "central cores did not host themselves; host_core rewritten");
        }

        // Write back with host_core's own element type.
        let column = match self.require(HOST_CORE)? {
            FieldColumn::I64(_) => FieldColumn::I64(hosts),
            FieldColumn::I8(_) => FieldColumn::I8(narrow(&hosts, HOST_CORE)?),
            FieldColumn::I16(_) => FieldColumn::I16(narrow(&hosts, HOST_CORE)?),
            FieldColumn::I32(_) => FieldColumn::I32(narrow(&hosts, HOST_CORE)?),
            FieldColumn::U8(_) => FieldColumn::U8(narrow(&hosts, HOST_CORE)?),
            FieldColumn::U16(_) => FieldColumn::U16(narrow(&hosts, HOST_CORE)?),
            FieldColumn::U32(_) => FieldColumn::U32(narrow(&hosts, HOST_CORE)?),
            FieldColumn::Bool(_) | FieldColumn::F32(_) | FieldColumn::F64(_) => {
                return Err(ForestError::NonIntegerField(HOST_CORE.to_owned()));
            }
        };
        self.fields.insert(HOST_CORE.to_owned(), column);
        Ok(rewritten)
    }
}

/// Narrow widened values back to the column's element type.
fn narrow<T: TryFrom<i64>>(values: &[i64], field: &str) -> Result<Vec<T>, ForestError> {
    values
        .iter()
        .map(|&v| {
            T::try_from(v)
                .ok()
                .ok_or_else(|| ForestError::NonIntegerField(field.to_owned()))
        })
        .collect()
}
