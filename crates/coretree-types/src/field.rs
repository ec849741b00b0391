//! Typed field data: sparse record columns and their dense matrices.
//!
//! A record stream field keeps the element type it was read with. The
//! three types here mirror each other variant for variant:
//!
//! - [`FieldColumn`] -- one value per record, flat.
//! - [`FieldMatrix`] -- the same field scattered into `rows x steps`.
//! - [`FieldValue`] -- a single element of either.
//!
//! Every non-float kind has a lossless `i64` view; booleans read as `0`/`1`.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::enums::FieldKind;
use crate::matrix::DenseMatrix;

// ---------------------------------------------------------------------------
// Field value
// ---------------------------------------------------------------------------

/// A single element of a field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Boolean flag.
    Bool(bool),
    /// 8-bit signed integer.
    I8(i8),
    /// 16-bit signed integer.
    I16(i16),
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 16-bit unsigned integer.
    U16(u16),
    /// 32-bit unsigned integer.
    U32(u32),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
}

impl FieldValue {
    /// Return the element type.
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Bool(_) => FieldKind::Bool,
            Self::I8(_) => FieldKind::I8,
            Self::I16(_) => FieldKind::I16,
            Self::I32(_) => FieldKind::I32,
            Self::I64(_) => FieldKind::I64,
            Self::U8(_) => FieldKind::U8,
            Self::U16(_) => FieldKind::U16,
            Self::U32(_) => FieldKind::U32,
            Self::F32(_) => FieldKind::F32,
            Self::F64(_) => FieldKind::F64,
        }
    }

    /// Widen an integer or boolean value to `i64`; floats yield `None`.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(v),
            Self::Bool(v) => Some(i64::from(v)),
            Self::I8(v) => Some(i64::from(v)),
            Self::I16(v) => Some(i64::from(v)),
            Self::I32(v) => Some(i64::from(v)),
            Self::U8(v) => Some(i64::from(v)),
            Self::U16(v) => Some(i64::from(v)),
            Self::U32(v) => Some(i64::from(v)),
            Self::F32(_) | Self::F64(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Field column
// ---------------------------------------------------------------------------

/// One field of the flattened record stream: a value per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldColumn {
    /// Booleans, widened to `0`/`1` by the integer view.
    Bool(Vec<bool>),
    /// 8-bit signed integers.
    I8(Vec<i8>),
    /// 16-bit signed integers.
    I16(Vec<i16>),
    /// 32-bit signed integers.
    I32(Vec<i32>),
    /// 64-bit signed integers.
    I64(Vec<i64>),
    /// 8-bit unsigned integers.
    U8(Vec<u8>),
    /// 16-bit unsigned integers.
    U16(Vec<u16>),
    /// 32-bit unsigned integers.
    U32(Vec<u32>),
    /// 32-bit floats.
    F32(Vec<f32>),
    /// 64-bit floats.
    F64(Vec<f64>),
}

impl FieldColumn {
    /// Number of records in the column.
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::I8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    /// Returns `true` if the column holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the element type.
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Bool(_) => FieldKind::Bool,
            Self::I8(_) => FieldKind::I8,
            Self::I16(_) => FieldKind::I16,
            Self::I32(_) => FieldKind::I32,
            Self::I64(_) => FieldKind::I64,
            Self::U8(_) => FieldKind::U8,
            Self::U16(_) => FieldKind::U16,
            Self::U32(_) => FieldKind::U32,
            Self::F32(_) => FieldKind::F32,
            Self::F64(_) => FieldKind::F64,
        }
    }

    /// Return the value of record `index`.
    pub fn get(&self, index: usize) -> Option<FieldValue> {
        match self {
            Self::Bool(v) => v.get(index).copied().map(FieldValue::Bool),
            Self::I8(v) => v.get(index).copied().map(FieldValue::I8),
            Self::I16(v) => v.get(index).copied().map(FieldValue::I16),
            Self::I32(v) => v.get(index).copied().map(FieldValue::I32),
            Self::I64(v) => v.get(index).copied().map(FieldValue::I64),
            Self::U8(v) => v.get(index).copied().map(FieldValue::U8),
            Self::U16(v) => v.get(index).copied().map(FieldValue::U16),
            Self::U32(v) => v.get(index).copied().map(FieldValue::U32),
            Self::F32(v) => v.get(index).copied().map(FieldValue::F32),
            Self::F64(v) => v.get(index).copied().map(FieldValue::F64),
        }
    }

    /// View an integer or boolean column as `i64`, borrowing when already
    /// `i64`.
    ///
    /// Returns `None` for float columns.
    pub fn to_integers(&self) -> Option<Cow<'_, [i64]>> {
        match self {
            Self::I64(v) => Some(Cow::Borrowed(v.as_slice())),
            Self::Bool(v) => Some(Cow::Owned(widen(v))),
            Self::I8(v) => Some(Cow::Owned(widen(v))),
            Self::I16(v) => Some(Cow::Owned(widen(v))),
            Self::I32(v) => Some(Cow::Owned(widen(v))),
            Self::U8(v) => Some(Cow::Owned(widen(v))),
            Self::U16(v) => Some(Cow::Owned(widen(v))),
            Self::U32(v) => Some(Cow::Owned(widen(v))),
            Self::F32(_) | Self::F64(_) => None,
        }
    }
}

fn widen<T: Copy + Into<i64>>(values: &[T]) -> Vec<i64> {
    values.iter().copied().map(Into::into).collect()
}

impl From<Vec<bool>> for FieldColumn {
    fn from(values: Vec<bool>) -> Self {
        Self::Bool(values)
    }
}

impl From<Vec<i8>> for FieldColumn {
    fn from(values: Vec<i8>) -> Self {
        Self::I8(values)
    }
}

impl From<Vec<i16>> for FieldColumn {
    fn from(values: Vec<i16>) -> Self {
        Self::I16(values)
    }
}

impl From<Vec<i32>> for FieldColumn {
    fn from(values: Vec<i32>) -> Self {
        Self::I32(values)
    }
}

impl From<Vec<i64>> for FieldColumn {
    fn from(values: Vec<i64>) -> Self {
        Self::I64(values)
    }
}

impl From<Vec<u8>> for FieldColumn {
    fn from(values: Vec<u8>) -> Self {
        Self::U8(values)
    }
}

impl From<Vec<u16>> for FieldColumn {
    fn from(values: Vec<u16>) -> Self {
        Self::U16(values)
    }
}

impl From<Vec<u32>> for FieldColumn {
    fn from(values: Vec<u32>) -> Self {
        Self::U32(values)
    }
}

impl From<Vec<f32>> for FieldColumn {
    fn from(values: Vec<f32>) -> Self {
        Self::F32(values)
    }
}

impl From<Vec<f64>> for FieldColumn {
    fn from(values: Vec<f64>) -> Self {
        Self::F64(values)
    }
}

// ---------------------------------------------------------------------------
// Field matrix
// ---------------------------------------------------------------------------

/// One field scattered into a dense `rows x steps` matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldMatrix {
    /// Booleans, widened to `0`/`1` by the integer view.
    Bool(DenseMatrix<bool>),
    /// 8-bit signed integers.
    I8(DenseMatrix<i8>),
    /// 16-bit signed integers.
    I16(DenseMatrix<i16>),
    /// 32-bit signed integers.
    I32(DenseMatrix<i32>),
    /// 64-bit signed integers.
    I64(DenseMatrix<i64>),
    /// 8-bit unsigned integers.
    U8(DenseMatrix<u8>),
    /// 16-bit unsigned integers.
    U16(DenseMatrix<u16>),
    /// 32-bit unsigned integers.
    U32(DenseMatrix<u32>),
    /// 32-bit floats.
    F32(DenseMatrix<f32>),
    /// 64-bit floats.
    F64(DenseMatrix<f64>),
}

impl FieldMatrix {
    /// Return `(rows, cols)`.
    pub const fn shape(&self) -> (usize, usize) {
        match self {
            Self::Bool(m) => m.shape(),
            Self::I8(m) => m.shape(),
            Self::I16(m) => m.shape(),
            Self::I32(m) => m.shape(),
            Self::I64(m) => m.shape(),
            Self::U8(m) => m.shape(),
            Self::U16(m) => m.shape(),
            Self::U32(m) => m.shape(),
            Self::F32(m) => m.shape(),
            Self::F64(m) => m.shape(),
        }
    }

    /// Return the element type.
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Bool(_) => FieldKind::Bool,
            Self::I8(_) => FieldKind::I8,
            Self::I16(_) => FieldKind::I16,
            Self::I32(_) => FieldKind::I32,
            Self::I64(_) => FieldKind::I64,
            Self::U8(_) => FieldKind::U8,
            Self::U16(_) => FieldKind::U16,
            Self::U32(_) => FieldKind::U32,
            Self::F32(_) => FieldKind::F32,
            Self::F64(_) => FieldKind::F64,
        }
    }

    /// Return the value stored at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<FieldValue> {
        match self {
            Self::Bool(m) => m.get(row, col).copied().map(FieldValue::Bool),
            Self::I8(m) => m.get(row, col).copied().map(FieldValue::I8),
            Self::I16(m) => m.get(row, col).copied().map(FieldValue::I16),
            Self::I32(m) => m.get(row, col).copied().map(FieldValue::I32),
            Self::I64(m) => m.get(row, col).copied().map(FieldValue::I64),
            Self::U8(m) => m.get(row, col).copied().map(FieldValue::U8),
            Self::U16(m) => m.get(row, col).copied().map(FieldValue::U16),
            Self::U32(m) => m.get(row, col).copied().map(FieldValue::U32),
            Self::F32(m) => m.get(row, col).copied().map(FieldValue::F32),
            Self::F64(m) => m.get(row, col).copied().map(FieldValue::F64),
        }
    }

    /// View an integer or boolean matrix as `i64`, borrowing when already
    /// `i64`.
    ///
    /// Returns `None` for float matrices.
    pub fn to_integers(&self) -> Option<Cow<'_, DenseMatrix<i64>>> {
        match self {
            Self::I64(m) => Some(Cow::Borrowed(m)),
            Self::Bool(m) => Some(Cow::Owned(m.map(|&v| i64::from(v)))),
            Self::I8(m) => Some(Cow::Owned(m.map(|&v| i64::from(v)))),
            Self::I16(m) => Some(Cow::Owned(m.map(|&v| i64::from(v)))),
            Self::I32(m) => Some(Cow::Owned(m.map(|&v| i64::from(v)))),
            Self::U8(m) => Some(Cow::Owned(m.map(|&v| i64::from(v)))),
            Self::U16(m) => Some(Cow::Owned(m.map(|&v| i64::from(v)))),
            Self::U32(m) => Some(Cow::Owned(m.map(|&v| i64::from(v)))),
            Self::F32(_) | Self::F64(_) => None,
        }
    }
}
