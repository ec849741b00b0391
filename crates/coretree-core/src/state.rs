//! Per-cell core state classification.

use coretree_types::{CoreState, DenseMatrix};
use rayon::prelude::*;

use crate::error::ForestError;

/// Classify every cell from `core_tag`, `central` and `merged`.
///
/// A cell is active when `core_tag > 0`, central when `central == 1`, and
/// merged when `merged == 1`, with merged taking precedence over central
/// and central over active.
///
/// # Errors
///
/// Returns [`ForestError::RowCountMismatch`] if the flag matrices are not
/// the same shape as `core_tag`.
pub fn classify_states(
    core_tag: &DenseMatrix<i64>,
    central: &DenseMatrix<i64>,
    merged: &DenseMatrix<i64>,
) -> Result<DenseMatrix<CoreState>, ForestError> {
    let (rows, steps) = core_tag.shape();
    for (name, flags) in [
        (crate::records::CENTRAL, central),
        (crate::records::MERGED, merged),
    ] {
        if flags.shape() != (rows, steps) {
            let (flag_rows, flag_steps) = flags.shape();
            return Err(ForestError::RowCountMismatch {
                field: name.to_owned(),
                expected: rows.saturating_mul(steps),
                actual: flag_rows.saturating_mul(flag_steps),
            });
        }
    }

    let states: Vec<CoreState> = core_tag
        .as_slice()
        .par_iter()
        .zip(central.as_slice())
        .zip(merged.as_slice())
        .map(|((&tag, &c), &m)| CoreState::classify(tag > 0, c == 1, m == 1))
        .collect();
    DenseMatrix::from_row_major(rows, steps, states).ok_or(ForestError::ShapeOverflow { rows, steps })
}
