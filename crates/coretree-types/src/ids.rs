//! Strongly-typed identifiers for cores and their dense rows.
//!
//! The record stream carries raw integers where `0` means "no core" and
//! the derived host matrices historically used `-1` for "no host". Both
//! sentinels are lifted into the type system here: a [`CoreTag`] can only
//! hold a positive value, and a missing host row is `Option::<CoreRow>::None`.

use serde::{Deserialize, Serialize};

/// Unique identifier of a tracked core.
///
/// Only strictly positive raw values are valid tags; `0` is the reserved
/// "no core" sentinel and negative values are treated the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct CoreTag(i64);

impl CoreTag {
    /// Wrap a raw tag, returning `None` for the `<= 0` sentinel range.
    pub const fn new(raw: i64) -> Option<Self> {
        if raw > 0 { Some(Self(raw)) } else { None }
    }

    /// Return the raw integer tag.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for CoreTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for CoreTag {
    type Error = InvalidCoreTag;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or(InvalidCoreTag(raw))
    }
}

impl From<CoreTag> for i64 {
    fn from(tag: CoreTag) -> Self {
        tag.0
    }
}

/// A raw value that is not a valid [`CoreTag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("core tag must be positive, got {0}")]
pub struct InvalidCoreTag(pub i64);

/// Dense 0-based row index assigned once per distinct core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CoreRow(pub usize);

impl CoreRow {
    /// Return the row as a `usize` index.
    pub const fn index(self) -> usize {
        self.0
    }

    /// Encode an optional row with the signed `-1` convention.
    pub fn to_signed(row: Option<Self>) -> i64 {
        // Row counts are bounded by `Vec` capacity, which never exceeds `isize::MAX`.
        row.map_or(-1, |r| i64::try_from(r.0).unwrap_or(i64::MAX))
    }

    /// Decode a signed row where any negative value means "no row".
    pub fn from_signed(raw: i64) -> Option<Self> {
        usize::try_from(raw).ok().map(Self)
    }
}

impl core::fmt::Display for CoreRow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_tags_are_rejected() {
        assert_eq!(CoreTag::new(0), None);
        assert_eq!(CoreTag::new(-7), None);
        assert_eq!(CoreTag::new(12).map(CoreTag::get), Some(12));
    }

    #[test]
    fn tag_serializes_as_raw_integer() {
        let json = serde_json::to_string(&CoreTag::new(42)).ok();
        assert_eq!(json.as_deref(), Some("42"));

        let bad: Result<CoreTag, _> = serde_json::from_str("0");
        assert!(bad.is_err());
    }

    #[test]
    fn invalid_tag_reports_raw_value() {
        let err = CoreTag::try_from(-3).unwrap_err();
        assert_eq!(err, InvalidCoreTag(-3));
        assert_eq!(err.to_string(), "core tag must be positive, got -3");
    }

    #[test]
    fn signed_row_round_trip() {
        assert_eq!(CoreRow::to_signed(None), -1);
        assert_eq!(CoreRow::to_signed(Some(CoreRow(3))), 3);
        assert_eq!(CoreRow::from_signed(-1), None);
        assert_eq!(CoreRow::from_signed(5), Some(CoreRow(5)));
    }
}
