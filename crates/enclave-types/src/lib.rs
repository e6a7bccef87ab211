//! Shared type definitions for the Enclave simulation.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries. Sink-facing types flow downstream to `TypeScript` via `ts-rs`
//! so an external map renderer and chart can consume step output directly.
//!
//! # Modules
//!
//! - [`ids`] -- The [`ParcelId`] identifier
//! - [`enums`] -- [`OccupancyState`], the per-parcel state machine value
//! - [`structs`] -- Parcel geometry and the per-step sink views

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::OccupancyState;
pub use ids::ParcelId;
pub use structs::{Parcel, ParcelView, Point, Polygon, StepSnapshot};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the sink-facing types.

    #[test]
    fn export_bindings() {
        // Exporting writes to the `bindings/` directory relative to the
        // crate root.
        use ts_rs::TS;

        let _ = crate::ids::ParcelId::export_all();
        let _ = crate::enums::OccupancyState::export_all();
        let _ = crate::structs::Point::export_all();
        let _ = crate::structs::Polygon::export_all();
        let _ = crate::structs::Parcel::export_all();
        let _ = crate::structs::StepSnapshot::export_all();
        let _ = crate::structs::ParcelView::export_all();
    }
}
