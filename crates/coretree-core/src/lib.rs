//! Dense matrix conversion and host-chain resolution for core forests.
//!
//! This crate turns a sparse, contiguity-grouped stream of core records
//! into dense `rows x steps` matrices and reconstructs, at every time step,
//! each core's direct host and its topmost host.
//!
//! # Modules
//!
//! - [`config`] -- YAML simulation metadata and the explicit
//!   [`ForestConfig`] passed to the transform.
//! - [`error`] -- [`ForestError`], returned by every fallible stage.
//! - [`records`] -- [`RecordStream`], field selection, and central-host
//!   normalization.
//! - [`rows`] -- Run-length row assignment from `core_tag`.
//! - [`matrix`] -- [`MatrixBuilder`]: cell validation and scatter.
//! - [`host`] -- Per-step `host_core` to host row resolution.
//! - [`top_host`] -- Per-step host chain resolution to the topmost host.
//! - [`state`] -- Per-cell [`CoreState`] classification.
//! - [`forest`] -- The full pipeline and its [`CoreForest`] output.
//!
//! # Usage
//!
//! ```
//! use coretree_core::{CoreForest, ForestConfig, RecordStream};
//! use coretree_types::{CoreRow, CoreState};
//!
//! let records = RecordStream::new()
//!     .with_field("core_tag", vec![1_i64, 2])
//!     .and_then(|s| s.with_field("host_core", vec![1_i64, 1]))
//!     .and_then(|s| s.with_field("snapnum", vec![0_i64, 0]))
//!     .and_then(|s| s.with_field("central", vec![1_i32, 0]))
//!     .and_then(|s| s.with_field("merged", vec![0_i32, 0]));
//!
//! if let Ok(records) = records {
//!     let forest = CoreForest::build(&records, &ForestConfig::new(1));
//!     assert!(forest.is_ok_and(|f| {
//!         f.top_host_at(CoreRow(1), 0) == Some(CoreRow(0))
//!             && f.state_at(CoreRow(0), 0) == CoreState::Central
//!     }));
//! }
//! ```
//!
//! [`CoreState`]: coretree_types::CoreState

pub mod config;
pub mod error;
pub mod forest;
pub mod host;
pub mod matrix;
pub mod records;
pub mod rows;
pub mod state;
pub mod top_host;

// Re-export primary types at crate root.
pub use config::{ConfigError, ForestConfig, SimulationConfig};
pub use error::ForestError;
pub use forest::CoreForest;
pub use matrix::MatrixBuilder;
pub use records::{ESSENTIAL_FIELDS, RESERVED_FIELDS, RecordStream};
pub use rows::RowAssignment;
