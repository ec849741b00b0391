//! Enumeration types for core forest matrices.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Core state
// ---------------------------------------------------------------------------

/// Categorical state of a core at one time step.
///
/// The discriminants are the integer codes stored in the exported
/// `core_state` matrix.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(i8)]
pub enum CoreState {
    /// No record exists for this core at this step.
    #[default]
    Absent = -1,
    /// The core is the dominant member of its host group.
    Central = 0,
    /// The core exists and is independently evolving.
    Active = 1,
    /// The core has merged into its host.
    Merged = 2,
}

impl CoreState {
    /// Derive the state of one cell from its presence and flag values.
    ///
    /// Precedence, highest first: merged, central, active, absent. A cell
    /// flagged both central and merged is merged.
    pub const fn classify(present: bool, central: bool, merged: bool) -> Self {
        if merged {
            Self::Merged
        } else if central {
            Self::Central
        } else if present {
            Self::Active
        } else {
            Self::Absent
        }
    }

    /// Return the integer code used in exported matrices.
    pub const fn code(self) -> i8 {
        self as i8
    }

    /// Parse an integer code back into a state.
    pub const fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(Self::Absent),
            0 => Some(Self::Central),
            1 => Some(Self::Active),
            2 => Some(Self::Merged),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Field kind
// ---------------------------------------------------------------------------

/// Element type of a record field or dense field matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Boolean flag.
    Bool,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
}

impl FieldKind {
    /// Returns `true` for kinds with an exact `i64` view: the integers
    /// and `Bool`.
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::F32 | Self::F64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_wins_over_central() {
        assert_eq!(CoreState::classify(true, true, true), CoreState::Merged);
        assert_eq!(CoreState::classify(true, true, false), CoreState::Central);
        assert_eq!(CoreState::classify(true, false, false), CoreState::Active);
        assert_eq!(CoreState::classify(false, false, false), CoreState::Absent);
    }

    #[test]
    fn codes_round_trip() {
        for state in [
            CoreState::Absent,
            CoreState::Central,
            CoreState::Active,
            CoreState::Merged,
        ] {
            assert_eq!(CoreState::from_code(state.code()), Some(state));
        }
        assert_eq!(CoreState::from_code(7), None);
        assert_eq!(CoreState::Merged.code(), 2);
        assert_eq!(CoreState::Absent.code(), -1);
    }
}
