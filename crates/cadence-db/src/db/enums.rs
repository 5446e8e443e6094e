//! Enum types stored alongside schedule and attendance rows.
//!
//! Each enum has a stable snake_case string form used both as the stored
//! value and on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Attendance outcome for one user at one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Partial,
    AbsentExcused,
    AbsentUnexcused,
}

impl AttendanceStatus {
    /// Returns the stored string representation of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Partial => "partial",
            Self::AbsentExcused => "absent_excused",
            Self::AbsentUnexcused => "absent_unexcused",
        }
    }

    /// Parses the stored string representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "present" => Some(Self::Present),
            "partial" => Some(Self::Partial),
            "absent_excused" => Some(Self::AbsentExcused),
            "absent_unexcused" => Some(Self::AbsentUnexcused),
            _ => None,
        }
    }

    /// Present and partial both count towards attendance rates.
    #[must_use]
    pub const fn counts_as_attended(self) -> bool {
        matches!(self, Self::Present | Self::Partial)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far an override reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideScope {
    /// Only the occurrence on the effective date.
    SingleOccurrence,
    /// Every occurrence from the effective date on, until superseded.
    Forward,
}

impl OverrideScope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleOccurrence => "single_occurrence",
            Self::Forward => "forward",
        }
    }
}

impl fmt::Display for OverrideScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
