//! Scatter of sparse record fields into dense `rows x steps` matrices.
//!
//! The cell coordinates `(row, snapnum)` of every record are computed and
//! validated once in [`MatrixBuilder::new`]; each field is then scattered
//! with the same coordinates. Unwritten cells keep the element type's
//! default (zero), so the builder also keeps a presence mask recording
//! which cells received a real record.

use std::collections::BTreeMap;

use coretree_types::{DenseMatrix, FieldColumn, FieldMatrix};
use rayon::prelude::*;
use tracing::debug;

use crate::error::ForestError;
use crate::records::RecordStream;
use crate::rows::RowAssignment;

/// Validated cell coordinates for one record stream.
#[derive(Debug, Clone)]
pub struct MatrixBuilder {
    /// Number of rows.
    rows: usize,
    /// Number of time-step columns.
    steps: usize,
    /// Flat row-major offset of each record's cell.
    cells: Vec<usize>,
    /// `true` where a record was written.
    presence: DenseMatrix<bool>,
}

impl MatrixBuilder {
    /// Compute and validate the cell of every record.
    ///
    /// # Errors
    ///
    /// - [`ForestError::RowCountMismatch`] if `snapnums` and the row
    ///   assignment disagree on the record count.
    /// - [`ForestError::SnapnumOutOfRange`] if a snapnum is negative or
    ///   not below `steps`.
    /// - [`ForestError::DuplicateCell`] if two records share a cell.
    /// - [`ForestError::ShapeOverflow`] if `rows * steps` overflows.
    pub fn new(
        assignment: &RowAssignment,
        snapnums: &[i64],
        steps: usize,
    ) -> Result<Self, ForestError> {
        let record_rows = assignment.record_rows();
        if snapnums.len() != record_rows.len() {
            return Err(ForestError::RowCountMismatch {
                field: crate::records::SNAPNUM.to_owned(),
                expected: record_rows.len(),
                actual: snapnums.len(),
            });
        }

        let rows = assignment.row_count();
        let mut presence = DenseMatrix::filled(rows, steps, false)
            .ok_or(ForestError::ShapeOverflow { rows, steps })?;
        let mut cells = Vec::with_capacity(snapnums.len());

        for (record, (&row, &snapnum)) in record_rows.iter().zip(snapnums).enumerate() {
            let out_of_range = ForestError::SnapnumOutOfRange {
                record,
                snapnum,
                steps,
            };
            let Some(step) = usize::try_from(snapnum).ok().filter(|&s| s < steps) else {
                return Err(out_of_range);
            };
            let offset = presence
                .offset(row.index(), step)
                .ok_or(ForestError::ShapeOverflow { rows, steps })?;
            match presence.get_mut(row.index(), step) {
                Some(seen) if *seen => {
                    return Err(ForestError::DuplicateCell { record, row, step });
                }
                Some(seen) => *seen = true,
                None => return Err(out_of_range),
            }
            cells.push(offset);
        }

        debug!(rows, steps, records = cells.len(), "record cells validated");
        Ok(Self {
            rows,
            steps,
            cells,
            presence,
        })
    }

    /// Number of rows.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of time-step columns.
    pub const fn steps(&self) -> usize {
        self.steps
    }

    /// Borrow the presence mask.
    pub const fn presence(&self) -> &DenseMatrix<bool> {
        &self.presence
    }

    /// Release the presence mask.
    pub fn into_presence(self) -> DenseMatrix<bool> {
        self.presence
    }

    /// Scatter one field column into a dense matrix of the same element type.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::RowCountMismatch`] if the column length does
    /// not match the record count.
    pub fn scatter(&self, name: &str, column: &FieldColumn) -> Result<FieldMatrix, ForestError> {
        if column.len() != self.cells.len() {
            return Err(ForestError::RowCountMismatch {
                field: name.to_owned(),
                expected: self.cells.len(),
                actual: column.len(),
            });
        }
        Ok(match column {
            FieldColumn::Bool(v) => FieldMatrix::Bool(self.scatter_values(v)?),
            FieldColumn::I8(v) => FieldMatrix::I8(self.scatter_values(v)?),
            FieldColumn::I16(v) => FieldMatrix::I16(self.scatter_values(v)?),
            FieldColumn::I32(v) => FieldMatrix::I32(self.scatter_values(v)?),
            FieldColumn::I64(v) => FieldMatrix::I64(self.scatter_values(v)?),
            FieldColumn::U8(v) => FieldMatrix::U8(self.scatter_values(v)?),
            FieldColumn::U16(v) => FieldMatrix::U16(self.scatter_values(v)?),
            FieldColumn::U32(v) => FieldMatrix::U32(self.scatter_values(v)?),
            FieldColumn::F32(v) => FieldMatrix::F32(self.scatter_values(v)?),
            FieldColumn::F64(v) => FieldMatrix::F64(self.scatter_values(v)?),
        })
    }

    /// Scatter every selected field, in parallel across fields.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::MissingField`] if a selected field is absent,
    /// or any error from [`scatter`](Self::scatter).
    pub fn build(
        &self,
        stream: &RecordStream,
        fields: &[String],
    ) -> Result<BTreeMap<String, FieldMatrix>, ForestError> {
        fields
            .par_iter()
            .map(|name| -> Result<(String, FieldMatrix), ForestError> {
                let column = stream.require(name)?;
                Ok((name.clone(), self.scatter(name, column)?))
            })
            .collect()
    }

    fn scatter_values<T: Copy + Default>(&self, values: &[T]) -> Result<DenseMatrix<T>, ForestError> {
        let mut data = vec![T::default(); self.presence.as_slice().len()];
        for (&cell, &value) in self.cells.iter().zip(values) {
            if let Some(slot) = data.get_mut(cell) {
                *slot = value;
            }
        }
        DenseMatrix::from_row_major(self.rows, self.steps, data).ok_or(ForestError::ShapeOverflow {
            rows: self.rows,
            steps: self.steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use coretree_types::FieldValue;

    use super::*;

    #[test]
    fn values_land_at_row_and_snapnum() {
        let rows = RowAssignment::assign(&[4, 4, 8]);
        let builder = MatrixBuilder::new(&rows, &[0, 2, 1], 3).unwrap();
        let mass = FieldColumn::from(vec![1.5_f64, 2.5, 3.5]);
        let m = builder.scatter("mass", &mass).unwrap();

        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.get(0, 0), Some(FieldValue::F64(1.5)));
        assert_eq!(m.get(0, 2), Some(FieldValue::F64(2.5)));
        assert_eq!(m.get(1, 1), Some(FieldValue::F64(3.5)));
        // Unwritten cells are default-filled.
        assert_eq!(m.get(0, 1), Some(FieldValue::F64(0.0)));

        let presence = builder.presence();
        assert_eq!(presence.get(0, 1), Some(&false));
        assert_eq!(presence.get(1, 1), Some(&true));
    }

    #[test]
    fn negative_snapnum_is_rejected() {
        let rows = RowAssignment::assign(&[1]);
        let err = MatrixBuilder::new(&rows, &[-1], 3).unwrap_err();
        assert!(matches!(err, ForestError::SnapnumOutOfRange { snapnum: -1, .. }));
    }

    #[test]
    fn snapnum_past_last_step_is_rejected() {
        let rows = RowAssignment::assign(&[1, 1]);
        let err = MatrixBuilder::new(&rows, &[0, 3], 3).unwrap_err();
        assert!(matches!(
            err,
            ForestError::SnapnumOutOfRange { record: 1, snapnum: 3, steps: 3 }
        ));
    }

    #[test]
    fn repeated_cell_is_rejected() {
        let rows = RowAssignment::assign(&[1, 1]);
        let err = MatrixBuilder::new(&rows, &[2, 2], 3).unwrap_err();
        assert!(matches!(err, ForestError::DuplicateCell { record: 1, step: 2, .. }));
    }

    #[test]
    fn column_length_must_match() {
        let rows = RowAssignment::assign(&[1, 2]);
        let builder = MatrixBuilder::new(&rows, &[0, 0], 1).unwrap();
        let short = FieldColumn::from(vec![1_i32]);
        let err = builder.scatter("x", &short).unwrap_err();
        assert!(matches!(err, ForestError::RowCountMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn flags_keep_their_element_type() {
        let rows = RowAssignment::assign(&[3, 3]);
        let builder = MatrixBuilder::new(&rows, &[0, 2], 3).unwrap();
        let m = builder.scatter("merged", &FieldColumn::from(vec![false, true])).unwrap();
        assert_eq!(m.get(0, 2), Some(FieldValue::Bool(true)));
        assert_eq!(m.get(0, 1), Some(FieldValue::Bool(false)));
    }

    #[test]
    fn build_scatters_selected_fields_only() {
        let stream = RecordStream::new()
            .with_field("core_tag", vec![1_i64, 2])
            .and_then(|s| s.with_field("snapnum", vec![0_i64, 0]))
            .and_then(|s| s.with_field("radius", vec![0.1_f32, 0.2]))
            .unwrap();
        let rows = RowAssignment::assign(&[1, 2]);
        let builder = MatrixBuilder::new(&rows, &[0, 0], 2).unwrap();
        let fields = vec!["radius".to_owned(), "core_tag".to_owned()];
        let out = builder.build(&stream, &fields).unwrap();

        assert_eq!(out.len(), 2);
        assert!(!out.contains_key("snapnum"));
        assert_eq!(
            out.get("core_tag").and_then(|m| m.get(1, 0)),
            Some(FieldValue::I64(2))
        );

        let missing = vec!["mass".to_owned()];
        assert!(matches!(
            builder.build(&stream, &missing),
            Err(ForestError::MissingField(_))
        ));
    }

    #[test]
    fn zero_steps_with_no_records() {
        let rows = RowAssignment::assign(&[]);
        let builder = MatrixBuilder::new(&rows, &[], 0).unwrap();
        assert_eq!(builder.presence().shape(), (0, 0));
    }
}
