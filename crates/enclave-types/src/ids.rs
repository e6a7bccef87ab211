//! Type-safe parcel identifier.
//!
//! Parcels are numbered densely in load order, so a [`ParcelId`] is stable for
//! the lifetime of a run and doubles as a compact sort key. The external
//! feature identifier (if any) travels separately as the parcel label.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Unique identifier for a parcel (node in the adjacency graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ParcelId(pub u32);

impl ParcelId {
    /// Create an identifier from its raw load-order index.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Return the raw load-order index.
    pub const fn into_inner(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for ParcelId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "parcel#{}", self.0)
    }
}

impl From<u32> for ParcelId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<ParcelId> for u32 {
    fn from(id: ParcelId) -> Self {
        id.0
    }
}
