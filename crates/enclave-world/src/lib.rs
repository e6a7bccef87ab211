//! Parcel geometry and adjacency for the Enclave simulation.
//!
//! This crate models the physical layout: parcels as polygon footprints,
//! read from GeoJSON or generated as a lattice, and the static neighbor
//! relation between them.
//!
//! # Modules
//!
//! - [`error`] -- [`GeometryLoadError`], the fatal load failure.
//! - [`geojson`] -- Feature-collection and line-delimited GeoJSON reader.
//! - [`geometry`] -- Bounding boxes, boundary distance, centroids.
//! - [`lattice`] -- Synthetic square-grid layouts.
//! - [`neighbor`] -- [`NeighborRule`] predicates and the adjacency sweep.
//! - [`parcel_store`] -- [`ParcelStore`], parcels plus cached adjacency.

pub mod error;
pub mod geojson;
pub mod geometry;
pub mod lattice;
pub mod neighbor;
pub mod parcel_store;

// Re-export primary types at crate root.
pub use error::GeometryLoadError;
pub use geojson::{LoadOptions, load_parcels, parse_parcels};
pub use lattice::square_lattice;
pub use neighbor::{DEFAULT_TOUCH_TOLERANCE, NeighborRule};
pub use parcel_store::ParcelStore;
