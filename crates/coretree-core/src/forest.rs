//! The one-shot transform from a record stream to a [`CoreForest`].
//!
//! # Pipeline
//!
//! 1. Select fields (default: all; essential fields always added).
//! 2. Assign a dense row to each contiguous run of `core_tag`.
//! 3. Validate every record's `(row, snapnum)` cell and scatter each
//!    selected field into a `rows x steps` matrix.
//! 4. Resolve direct host rows per step (parallel across steps).
//! 5. Resolve top host rows per step (parallel across rows).
//! 6. Classify the state of every cell.
//!
//! Any failure aborts the pass and nothing is returned but the error.

use std::borrow::Cow;
use std::collections::BTreeMap;

use coretree_types::{CoreRow, CoreState, CoreTag, DenseMatrix, FieldMatrix};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ForestConfig;
use crate::error::ForestError;
use crate::host::resolve_host_rows;
use crate::matrix::MatrixBuilder;
use crate::records::{CENTRAL, CORE_TAG, HOST_CORE, MERGED, RecordStream, SNAPNUM};
use crate::rows::RowAssignment;
use crate::state::classify_states;
use crate::top_host::resolve_top_hosts;

/// Output name of the direct host row matrix.
pub const HOST_ROW: &str = "host_row";
/// Output name of the top host row matrix.
pub const TOP_HOST_ROW: &str = "top_host_row";
/// Output name of the core state matrix.
pub const CORE_STATE: &str = "core_state";

/// Dense, immutable matrix bundle describing a core forest.
///
/// Every matrix has shape `rows x steps`: one row per core, one column
/// per time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreForest {
    /// Selected record fields, scattered.
    fields: BTreeMap<String, FieldMatrix>,
    /// `true` where a record exists.
    presence: DenseMatrix<bool>,
    /// Raw `core_tag` of each row.
    row_tags: Vec<i64>,
    /// Direct host row per cell.
    host_row: DenseMatrix<Option<CoreRow>>,
    /// Topmost host row per cell.
    top_host_row: DenseMatrix<Option<CoreRow>>,
    /// Categorical state per cell.
    core_state: DenseMatrix<CoreState>,
}

impl CoreForest {
    /// Run the full transform over a record stream.
    ///
    /// The record stream must already group each core's records
    /// contiguously and make every central core host itself (see
    /// [`RecordStream::normalize_central_hosts`]).
    ///
    /// # Errors
    ///
    /// Returns the first [`ForestError`] raised by any stage.
    pub fn build(records: &RecordStream, config: &ForestConfig) -> Result<Self, ForestError> {
        info!(
            records = records.len(),
            steps = config.steps,
            "building core forest"
        );

        let selected = records.select_fields(config.include_fields.as_deref())?;
        for name in [HOST_CORE, CENTRAL, MERGED] {
            if !records.require(name)?.kind().is_integer() {
                return Err(ForestError::NonIntegerField(name.to_owned()));
            }
        }

        let assignment = RowAssignment::assign(&records.require_integers(CORE_TAG)?);
        let builder = MatrixBuilder::new(
            &assignment,
            &records.require_integers(SNAPNUM)?,
            config.steps,
        )?;
        let fields = builder.build(records, &selected)?;
        debug!(
            rows = builder.rows(),
            fields = fields.len(),
            "field matrices scattered"
        );

        let (host_row, top_host_row, core_state) = {
            let core_tag = integer_matrix(&fields, CORE_TAG)?;
            let host_core = integer_matrix(&fields, HOST_CORE)?;
            let central = integer_matrix(&fields, CENTRAL)?;
            let merged = integer_matrix(&fields, MERGED)?;
            let host_row = resolve_host_rows(&core_tag, &host_core)?;
            let top_host_row = resolve_top_hosts(&host_row)?;
            let core_state = classify_states(&core_tag, &central, &merged)?;
            (host_row, top_host_row, core_state)
        };

        let forest = Self {
            fields,
            presence: builder.into_presence(),
            row_tags: assignment.into_row_tags(),
            host_row,
            top_host_row,
            core_state,
        };
        info!(
            rows = forest.rows(),
            steps = forest.steps(),
            "core forest built"
        );
        Ok(forest)
    }

    /// Number of rows (distinct cores).
    pub fn rows(&self) -> usize {
        self.row_tags.len()
    }

    /// Number of time-step columns.
    pub const fn steps(&self) -> usize {
        self.presence.cols()
    }

    /// Borrow a scattered record field by name.
    pub fn field(&self, name: &str) -> Option<&FieldMatrix> {
        self.fields.get(name)
    }

    /// Iterate over the scattered field names in sorted order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Borrow the presence mask.
    pub const fn presence(&self) -> &DenseMatrix<bool> {
        &self.presence
    }

    /// Returns `true` if a record exists at `(row, step)`.
    pub fn is_present(&self, row: CoreRow, step: usize) -> bool {
        self.presence.get(row.index(), step).copied().unwrap_or(false)
    }

    /// Raw `core_tag` of each row.
    pub fn row_tags(&self) -> &[i64] {
        &self.row_tags
    }

    /// First row carrying `tag`.
    pub fn row_of(&self, tag: CoreTag) -> Option<CoreRow> {
        self.row_tags
            .iter()
            .position(|&t| t == tag.get())
            .map(CoreRow)
    }

    /// Borrow the direct host row matrix.
    pub const fn host_row(&self) -> &DenseMatrix<Option<CoreRow>> {
        &self.host_row
    }

    /// Borrow the top host row matrix.
    pub const fn top_host_row(&self) -> &DenseMatrix<Option<CoreRow>> {
        &self.top_host_row
    }

    /// Borrow the core state matrix.
    pub const fn core_state(&self) -> &DenseMatrix<CoreState> {
        &self.core_state
    }

    /// Direct host of `row` at `step`.
    pub fn host_at(&self, row: CoreRow, step: usize) -> Option<CoreRow> {
        self.host_row.get(row.index(), step).copied().flatten()
    }

    /// Top host of `row` at `step`.
    pub fn top_host_at(&self, row: CoreRow, step: usize) -> Option<CoreRow> {
        self.top_host_row.get(row.index(), step).copied().flatten()
    }

    /// State of `row` at `step`; out-of-range cells are absent.
    pub fn state_at(&self, row: CoreRow, step: usize) -> CoreState {
        self.core_state
            .get(row.index(), step)
            .copied()
            .unwrap_or(CoreState::Absent)
    }

    /// Flatten into a name-to-matrix map.
    ///
    /// The derived matrices take the
    /// [`RESERVED_FIELDS`](crate::records::RESERVED_FIELDS) names, which no
    /// record field can be selected under.
    ///
    /// Host row matrices become `I64` with `-1` for "no host"; the state
    /// matrix becomes `I16` holding the state codes.
    pub fn into_matrix_map(self) -> BTreeMap<String, FieldMatrix> {
        let mut out = self.fields;
        out.insert(
            HOST_ROW.to_owned(),
            FieldMatrix::I64(self.host_row.map(|&r| CoreRow::to_signed(r))),
        );
        out.insert(
            TOP_HOST_ROW.to_owned(),
            FieldMatrix::I64(self.top_host_row.map(|&r| CoreRow::to_signed(r))),
        );
        out.insert(
            CORE_STATE.to_owned(),
            FieldMatrix::I16(self.core_state.map(|&s| i16::from(s.code()))),
        );
        out
    }
}

fn integer_matrix<'a>(
    fields: &'a BTreeMap<String, FieldMatrix>,
    name: &str,
) -> Result<Cow<'a, DenseMatrix<i64>>, ForestError> {
    fields
        .get(name)
        .ok_or_else(|| ForestError::MissingField(name.to_owned()))?
        .to_integers()
        .ok_or_else(|| ForestError::NonIntegerField(name.to_owned()))
}

#[cfg(test)]
mod tests {
    use coretree_types::FieldValue;

    use super::*;

    fn two_core_stream() -> RecordStream {
        // Core 100 is central at steps 0 and 1; core 200 orbits it at step 1.
        RecordStream::new()
            .with_field(CORE_TAG, vec![100_i64, 100, 200])
            .and_then(|s| s.with_field(HOST_CORE, vec![100_i64, 100, 100]))
            .and_then(|s| s.with_field(SNAPNUM, vec![0_i64, 1, 1]))
            .and_then(|s| s.with_field(CENTRAL, vec![1_i32, 1, 0]))
            .and_then(|s| s.with_field(MERGED, vec![0_i32, 0, 0]))
            .and_then(|s| s.with_field("radius", vec![0.5_f32, 0.6, 0.1]))
            .unwrap()
    }

    #[test]
    fn builds_all_outputs() {
        let forest = CoreForest::build(&two_core_stream(), &ForestConfig::new(2)).unwrap();
        assert_eq!(forest.rows(), 2);
        assert_eq!(forest.steps(), 2);

        let sat = forest.row_of(CoreTag::new(200).unwrap()).unwrap();
        assert_eq!(sat, CoreRow(1));
        assert!(!forest.is_present(sat, 0));
        assert_eq!(forest.state_at(sat, 0), CoreState::Absent);
        assert_eq!(forest.state_at(sat, 1), CoreState::Active);
        assert_eq!(forest.host_at(sat, 1), Some(CoreRow(0)));
        assert_eq!(forest.top_host_at(sat, 1), Some(CoreRow(0)));
        assert_eq!(
            forest.field("radius").and_then(|m| m.get(1, 1)),
            Some(FieldValue::F32(0.1))
        );
    }

    #[test]
    fn field_selection_keeps_essentials() {
        let config = ForestConfig::new(2).with_fields([CORE_TAG]);
        let forest = CoreForest::build(&two_core_stream(), &config).unwrap();
        let names: Vec<&str> = forest.field_names().collect();
        assert_eq!(names, vec![CENTRAL, CORE_TAG, HOST_CORE, MERGED, SNAPNUM]);
        assert!(forest.field("radius").is_none());
    }

    #[test]
    fn matrix_map_uses_signed_sentinels() {
        let forest = CoreForest::build(&two_core_stream(), &ForestConfig::new(2)).unwrap();
        let map = forest.into_matrix_map();

        let host = map.get(HOST_ROW).unwrap();
        assert_eq!(host.get(1, 0), Some(FieldValue::I64(-1)));
        assert_eq!(host.get(1, 1), Some(FieldValue::I64(0)));

        let state = map.get(CORE_STATE).unwrap();
        assert_eq!(state.get(0, 0), Some(FieldValue::I16(0)));
        assert_eq!(state.get(1, 0), Some(FieldValue::I16(-1)));
        assert_eq!(state.get(1, 1), Some(FieldValue::I16(1)));
        assert!(map.contains_key(TOP_HOST_ROW));
        assert!(map.contains_key("radius"));
    }

    #[test]
    fn float_flag_field_is_rejected() {
        let mut stream = two_core_stream();
        stream.insert(MERGED, vec![0.0_f64, 0.0, 0.0]).unwrap();
        let err = CoreForest::build(&stream, &ForestConfig::new(2)).unwrap_err();
        assert!(matches!(err, ForestError::NonIntegerField(f) if f == MERGED));
    }

    #[test]
    fn field_named_like_derived_matrix_is_rejected() {
        let mut stream = two_core_stream();
        stream.insert(CORE_STATE, vec![7.5_f64, 7.5, 7.5]).unwrap();
        let err = CoreForest::build(&stream, &ForestConfig::new(2)).unwrap_err();
        assert!(matches!(err, ForestError::ReservedField(f) if f == CORE_STATE));
    }

    #[test]
    fn forest_serializes() {
        let forest = CoreForest::build(&two_core_stream(), &ForestConfig::new(2)).unwrap();
        let json = serde_json::to_string(&forest).unwrap();
        let back: CoreForest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, forest);
    }
}
