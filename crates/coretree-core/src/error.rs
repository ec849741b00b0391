//! Error types for the `coretree-core` crate.
//!
//! Every fallible stage of the forest transform returns [`ForestError`].
//! Any error aborts the whole pass; no partially-filled matrices escape.

use coretree_types::CoreRow;

/// Errors that can occur while building a core forest.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// A field column does not have the same record count as the stream.
    #[error("field {field} has {actual} records, expected {expected}")]
    RowCountMismatch {
        /// The offending field.
        field: String,
        /// Record count of the stream.
        expected: usize,
        /// Record count of the field.
        actual: usize,
    },

    /// A requested or essential field is not present in the record stream.
    #[error("field not found in record stream: {0}")]
    MissingField(String),

    /// A selected field uses a name the derived output matrices occupy.
    #[error("field name {0} is reserved for a derived matrix")]
    ReservedField(String),

    /// An essential field is float-typed where an integer is required.
    #[error("field {0} must be integer-typed")]
    NonIntegerField(String),

    /// A record's `snapnum` does not address a column of the matrix.
    #[error("record {record} has snapnum {snapnum}, outside 0..{steps}")]
    SnapnumOutOfRange {
        /// Index of the record in the stream.
        record: usize,
        /// The offending snapnum.
        snapnum: i64,
        /// Number of time-step columns.
        steps: usize,
    },

    /// Two records target the same `(row, snapnum)` cell.
    #[error("record {record} writes cell (row {row}, step {step}) a second time")]
    DuplicateCell {
        /// Index of the second record in the stream.
        record: usize,
        /// Dense row of the cell.
        row: CoreRow,
        /// Time-step column of the cell.
        step: usize,
    },

    /// A nonzero `host_core` has no matching `core_tag` in the same column.
    #[error("host core {host_core} of row {row} not found at step {step}")]
    UnresolvedHost {
        /// Time-step column.
        step: usize,
        /// Row whose host could not be resolved.
        row: CoreRow,
        /// The dangling host tag.
        host_core: i64,
    },

    /// Following host rows from `row` never reached a root.
    #[error("host chain starting at row {row} cycles at step {step}")]
    HostCycle {
        /// Time-step column.
        step: usize,
        /// Row whose chain was being followed.
        row: CoreRow,
    },

    /// The requested matrix shape does not fit in memory addressing.
    #[error("matrix shape {rows} x {steps} overflows")]
    ShapeOverflow {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        steps: usize,
    },
}
