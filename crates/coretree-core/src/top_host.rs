//! Per-step resolution of each core's topmost host.
//!
//! Starting from a row's direct host, host rows are followed until they
//! reach a self-hosting row or a row with no host. Every row walks its own
//! chain with no shared memoization, so a column costs `O(rows * depth)`
//! and rows are resolved in parallel without synchronization.

use coretree_types::{CoreRow, DenseMatrix};
use rayon::prelude::*;
use tracing::debug;

use crate::error::ForestError;

/// Resolve the top host row of every cell.
///
/// # Errors
///
/// Returns [`ForestError::HostCycle`] if some chain loops without ever
/// reaching a root.
pub fn resolve_top_hosts(
    host_row: &DenseMatrix<Option<CoreRow>>,
) -> Result<DenseMatrix<Option<CoreRow>>, ForestError> {
    let (rows, steps) = host_row.shape();
    let columns = (0..steps)
        .map(|step| {
            let hosts = host_row.column(step).unwrap_or_default();
            resolve_top_column(step, &hosts)
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(rows, steps, "top host rows resolved");
    DenseMatrix::from_columns(rows, columns).ok_or(ForestError::ShapeOverflow { rows, steps })
}

/// Resolve one time-step column of direct host rows.
///
/// Rows without a host stay `None`. A self-hosting row is its own top host.
///
/// # Errors
///
/// Returns [`ForestError::HostCycle`] if a chain takes more hops than there
/// are rows, which can only happen when it loops.
pub fn resolve_top_column(
    step: usize,
    hosts: &[Option<CoreRow>],
) -> Result<Vec<Option<CoreRow>>, ForestError> {
    (0..hosts.len())
        .into_par_iter()
        .map(|row| {
            let Some(Some(mut current)) = hosts.get(row).copied() else {
                return Ok(None);
            };
            let mut hops: usize = 0;
            while let Some(next) = hosts.get(current.index()).copied().flatten() {
                if next == current {
                    break;
                }
                current = next;
                hops = hops.saturating_add(1);
                if hops > hosts.len() {
                    return Err(ForestError::HostCycle {
                        step,
                        row: CoreRow(row),
                    });
                }
            }
            Ok(Some(current))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(indices: &[Option<usize>]) -> Vec<Option<CoreRow>> {
        indices.iter().map(|r| r.map(CoreRow)).collect()
    }

    #[test]
    fn chains_reach_self_hosting_root() {
        // 0 is central; 1 -> 0; 2 -> 1; 3 -> 2; 4 has no host.
        let hosts = col(&[Some(0), Some(0), Some(1), Some(2), None]);
        let top = resolve_top_column(0, &hosts).unwrap();
        assert_eq!(top, col(&[Some(0), Some(0), Some(0), Some(0), None]));
    }

    #[test]
    fn chain_stops_at_unhosted_row() {
        // Row 1 has no host of its own, so it is the top of row 0's chain.
        let hosts = col(&[Some(1), None]);
        let top = resolve_top_column(0, &hosts).unwrap();
        assert_eq!(top, col(&[Some(1), None]));
    }

    #[test]
    fn rerunning_is_idempotent() {
        let hosts = col(&[Some(2), Some(0), Some(2), None, Some(1)]);
        let first = resolve_top_column(0, &hosts).unwrap();
        let second = resolve_top_column(0, &hosts).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, col(&[Some(2), Some(2), Some(2), None, Some(2)]));
    }

    #[test]
    fn two_cycle_is_an_error() {
        let hosts = col(&[Some(1), Some(0)]);
        let err = resolve_top_column(3, &hosts).unwrap_err();
        assert!(matches!(err, ForestError::HostCycle { step: 3, .. }));
    }

    #[test]
    fn matrix_resolution_is_per_column() {
        let hosts = DenseMatrix::from_row_major(
            3,
            2,
            vec![Some(CoreRow(0)), Some(CoreRow(0)), None, Some(CoreRow(0)), None, Some(CoreRow(1))],
        )
        .unwrap();
        let top = resolve_top_hosts(&hosts).unwrap();
        assert_eq!(top.get(2, 1), Some(&Some(CoreRow(0))));
        assert_eq!(top.get(1, 0), Some(&None));
        assert_eq!(top.get(2, 0), Some(&None));
    }
}
