//! Row-major dense matrix with bounds-checked access.
//!
//! Every per-field output of the forest transform is a `rows x steps`
//! [`DenseMatrix`]. Access never panics: out-of-range coordinates yield
//! `None` instead.

use serde::{Deserialize, Serialize};

/// A dense `rows x cols` matrix stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenseMatrix<T> {
    /// Number of rows (one per core).
    rows: usize,
    /// Number of columns (one per time step).
    cols: usize,
    /// Cell values, `rows * cols` long.
    data: Vec<T>,
}

impl<T: Clone> DenseMatrix<T> {
    /// Create a matrix with every cell set to `value`.
    ///
    /// Returns `None` if `rows * cols` overflows `usize`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Option<Self> {
        let len = rows.checked_mul(cols)?;
        Some(Self {
            rows,
            cols,
            data: vec![value; len],
        })
    }

    /// Copy one column out into a contiguous vector.
    ///
    /// Returns `None` if `col` is out of range.
    pub fn column(&self, col: usize) -> Option<Vec<T>> {
        if col >= self.cols {
            return None;
        }
        Some(
            self.data
                .iter()
                .skip(col)
                .step_by(self.cols)
                .cloned()
                .collect(),
        )
    }
}

impl<T> DenseMatrix<T> {
    /// Assemble a matrix from per-column vectors.
    ///
    /// Returns `None` if any column's length differs from `rows`.
    pub fn from_columns(rows: usize, columns: Vec<Vec<T>>) -> Option<Self> {
        if columns.iter().any(|c| c.len() != rows) {
            return None;
        }
        let cols = columns.len();
        let mut data = Vec::with_capacity(rows.checked_mul(cols)?);
        let mut iters: Vec<_> = columns.into_iter().map(Vec::into_iter).collect();
        for _ in 0..rows {
            for it in &mut iters {
                data.extend(it.next());
            }
        }
        Some(Self { rows, cols, data })
    }

    /// Return `(rows, cols)`.
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of rows.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Flat offset of a cell, or `None` if out of range.
    pub fn offset(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        row.checked_mul(self.cols)?.checked_add(col)
    }

    /// Borrow a single cell.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.offset(row, col).and_then(|i| self.data.get(i))
    }

    /// Mutably borrow a single cell.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        self.offset(row, col).and_then(|i| self.data.get_mut(i))
    }

    /// Borrow one row as a slice.
    pub fn row(&self, row: usize) -> Option<&[T]> {
        let start = self.offset(row, 0)?;
        self.data.get(start..start.checked_add(self.cols)?)
    }

    /// Borrow the flat row-major cell storage.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Apply `f` to every cell, producing a matrix of the same shape.
    pub fn map<U, F>(&self, f: F) -> DenseMatrix<U>
    where
        F: FnMut(&T) -> U,
    {
        DenseMatrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Build a matrix from row-major data.
    ///
    /// Returns `None` if `data.len() != rows * cols`.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<T>) -> Option<Self> {
        (rows.checked_mul(cols)? == data.len()).then_some(Self { rows, cols, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DenseMatrix<i64> {
        DenseMatrix::from_row_major(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap()
    }

    #[test]
    fn filled_has_requested_shape() {
        let m = DenseMatrix::filled(3, 4, 0_i64).unwrap();
        assert_eq!(m.shape(), (3, 4));
        assert!(m.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn filled_rejects_overflowing_shape() {
        assert!(DenseMatrix::filled(usize::MAX, 2, 0_u8).is_none());
    }

    #[test]
    fn out_of_range_access_is_none() {
        let m = sample();
        assert_eq!(m.get(1, 2), Some(&6));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.get(0, 3), None);
        assert_eq!(m.row(1), Some(&[4, 5, 6][..]));
        assert_eq!(m.row(2), None);
    }

    #[test]
    fn columns_round_trip() {
        let m = sample();
        let cols: Vec<Vec<i64>> = (0..m.cols()).filter_map(|c| m.column(c)).collect();
        assert_eq!(cols, vec![vec![1, 4], vec![2, 5], vec![3, 6]]);
        assert_eq!(m.column(3), None);
        assert_eq!(DenseMatrix::from_columns(2, cols), Some(m));
    }

    #[test]
    fn from_columns_rejects_ragged_input() {
        assert!(DenseMatrix::from_columns(2, vec![vec![1_i64, 2], vec![3]]).is_none());
    }

    #[test]
    fn from_columns_with_zero_columns() {
        let m: DenseMatrix<i64> = DenseMatrix::from_columns(3, Vec::new()).unwrap();
        assert_eq!(m.shape(), (3, 0));
    }

    #[test]
    fn map_preserves_shape() {
        let doubled = sample().map(|v| v * 2);
        assert_eq!(doubled.shape(), (2, 3));
        assert_eq!(doubled.get(1, 0), Some(&8));
    }
}
