//! Shared type definitions for core forest matrices.
//!
//! These types are shared by the forest transform and by any downstream
//! consumer of its output bundle. All public types derive `Serialize` and
//! `Deserialize`.
//!
//! # Modules
//!
//! - [`ids`] -- [`CoreTag`] and [`CoreRow`], with the `0` / `-1` sentinels
//!   replaced by `Option`.
//! - [`enums`] -- [`CoreState`] and [`FieldKind`].
//! - [`matrix`] -- [`DenseMatrix`], the bounds-checked row-major container.
//! - [`field`] -- [`FieldColumn`], [`FieldMatrix`] and [`FieldValue`],
//!   one variant per supported element type.

pub mod enums;
pub mod field;
pub mod ids;
pub mod matrix;

// Re-export all public types at crate root for convenience.
pub use enums::{CoreState, FieldKind};
pub use field::{FieldColumn, FieldMatrix, FieldValue};
pub use ids::{CoreRow, CoreTag, InvalidCoreTag};
pub use matrix::DenseMatrix;
