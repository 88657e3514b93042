//! DST transition policies for local wall-clock boundaries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What to do with a window boundary that falls in a DST gap (e.g. 02:30
/// on a spring-forward night). Ambiguous times in a fall-back overlap always
/// resolve to the earlier instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Drop windows with a boundary in the gap.
    Skip,
    /// Move the boundary to the first valid instant after the gap.
    #[default]
    ShiftForward,
}

impl fmt::Display for DstPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DstPolicy::Skip => f.write_str("skip"),
            DstPolicy::ShiftForward => f.write_str("shift-forward"),
        }
    }
}

impl FromStr for DstPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(DstPolicy::Skip),
            "shift-forward" | "shift_forward" => Ok(DstPolicy::ShiftForward),
            other => Err(format!(
                "unknown DST policy '{}', expected 'skip' or 'shift-forward'",
                other
            )),
        }
    }
}
