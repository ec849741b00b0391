//! Dense row assignment by run-length grouping of `core_tag`.
//!
//! Each maximal run of equal consecutive `core_tag` values becomes one
//! row. This is not a group-by: a core whose records are interleaved with
//! another core's is split into several rows without any error. Callers
//! must deliver each core's records contiguously.

use coretree_types::CoreRow;

/// Row index of every record plus the tag that opened each row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAssignment {
    /// Row of each record, in stream order.
    record_rows: Vec<CoreRow>,
    /// Raw `core_tag` of the first record of each row.
    row_tags: Vec<i64>,
}

impl RowAssignment {
    /// Group a `core_tag` sequence into rows.
    ///
    /// The first record always opens row 0; every change of tag from the
    /// previous record opens the next row.
    pub fn assign(core_tags: &[i64]) -> Self {
        let mut record_rows = Vec::with_capacity(core_tags.len());
        let mut row_tags: Vec<i64> = Vec::new();
        for &tag in core_tags {
            if row_tags.last() != Some(&tag) {
                row_tags.push(tag);
            }
            // `row_tags` is non-empty here, so the subtraction cannot wrap.
            record_rows.push(CoreRow(row_tags.len().saturating_sub(1)));
        }
        Self {
            record_rows,
            row_tags,
        }
    }

    /// Number of distinct rows.
    pub fn row_count(&self) -> usize {
        self.row_tags.len()
    }

    /// Row of each record, in stream order.
    pub fn record_rows(&self) -> &[CoreRow] {
        &self.record_rows
    }

    /// Raw `core_tag` of each row.
    pub fn row_tags(&self) -> &[i64] {
        &self.row_tags
    }

    /// Release the per-row tags.
    pub fn into_row_tags(self) -> Vec<i64> {
        self.row_tags
    }
}
