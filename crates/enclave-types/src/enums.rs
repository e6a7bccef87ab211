//! Enumeration types for the Enclave simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Occupancy
// ---------------------------------------------------------------------------

/// The occupancy of a single parcel.
///
/// Every parcel carries exactly one of these values at all times. A parcel in
/// [`OccupancyState::GroupA`] or [`OccupancyState::GroupB`] is an agent; an
/// [`OccupancyState::Unoccupied`] parcel is a vacancy that movers may claim.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum OccupancyState {
    /// No agent lives here.
    #[default]
    Unoccupied,
    /// The minority group.
    GroupA,
    /// The majority group.
    GroupB,
}

impl OccupancyState {
    /// Whether an agent occupies the parcel.
    pub const fn is_occupied(self) -> bool {
        !matches!(self, Self::Unoccupied)
    }

    /// Short lowercase name used in logs and sink output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unoccupied => "unoccupied",
            Self::GroupA => "group_a",
            Self::GroupB => "group_b",
        }
    }

    /// Renderer colour for this state.
    ///
    /// Vacancies are grey, the majority red and the minority green.
    pub const fn portrayal_color(self) -> &'static str {
        match self {
            Self::Unoccupied => "Grey",
            Self::GroupA => "Green",
            Self::GroupB => "Red",
        }
    }
}

impl core::fmt::Display for OccupancyState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
