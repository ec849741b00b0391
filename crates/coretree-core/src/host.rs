//! Per-step resolution of `host_core` tags to dense host rows.
//!
//! For each time-step column the present cores are sorted by tag, and
//! every positive `host_core` is located by binary search. A host tag with
//! no matching core in the same column means the input is corrupt: the
//! whole resolution fails rather than leaving a hole in the output.
//!
//! Columns are independent and are resolved in parallel.

use coretree_types::{CoreRow, CoreTag, DenseMatrix};
use rayon::prelude::*;
use tracing::debug;

use crate::error::ForestError;

/// Resolve the direct host row of every cell.
///
/// `core_tag` and `host_core` must have the same shape. Cells whose
/// `host_core` is not a valid tag (`<= 0`) resolve to `None`.
///
/// # Errors
///
/// Returns [`ForestError::UnresolvedHost`] for a dangling host, or
/// [`ForestError::RowCountMismatch`] if the two shapes disagree.
pub fn resolve_host_rows(
    core_tag: &DenseMatrix<i64>,
    host_core: &DenseMatrix<i64>,
) -> Result<DenseMatrix<Option<CoreRow>>, ForestError> {
    let (rows, steps) = core_tag.shape();
    if host_core.shape() != (rows, steps) {
        let (host_rows, host_steps) = host_core.shape();
        return Err(ForestError::RowCountMismatch {
            field: crate::records::HOST_CORE.to_owned(),
            expected: rows.saturating_mul(steps),
            actual: host_rows.saturating_mul(host_steps),
        });
    }

    let columns = (0..steps)
        .into_par_iter()
        .map(|step| {
            let tags = core_tag.column(step).unwrap_or_default();
            let hosts = host_core.column(step).unwrap_or_default();
            resolve_column(step, &tags, &hosts)
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(rows, steps, "host rows resolved");
    DenseMatrix::from_columns(rows, columns).ok_or(ForestError::ShapeOverflow { rows, steps })
}

/// Resolve one time-step column.
///
/// `tags[i]` and `hosts[i]` are the `core_tag` and `host_core` of row `i`.
/// When several rows carry the same tag the lowest-sorted one wins.
///
/// # Errors
///
/// Returns [`ForestError::UnresolvedHost`] if a positive host tag does not
/// occur among the positive entries of `tags`.
pub fn resolve_column(
    step: usize,
    tags: &[i64],
    hosts: &[i64],
) -> Result<Vec<Option<CoreRow>>, ForestError> {
    let mut sorted: Vec<(CoreTag, usize)> = tags
        .iter()
        .enumerate()
        .filter_map(|(row, &raw)| CoreTag::new(raw).map(|tag| (tag, row)))
        .collect();
    sorted.sort_unstable();

    hosts
        .iter()
        .enumerate()
        .map(|(row, &raw)| {
            let Some(host) = CoreTag::new(raw) else {
                return Ok(None);
            };
            let pos = sorted.partition_point(|&(tag, _)| tag < host);
            match sorted.get(pos) {
                Some(&(tag, host_row)) if tag == host => Ok(Some(CoreRow(host_row))),
                _ => Err(ForestError::UnresolvedHost {
                    step,
                    row: CoreRow(row),
                    host_core: raw,
                }),
            }
        })
        .collect()
}
