//! Error types for the `enclave-world` crate.
//!
//! Every failure while reading a parcel layer or building its adjacency index
//! is a [`GeometryLoadError`]. All of them are fatal: without parcels there is
//! nothing to simulate.

use enclave_types::ParcelId;

/// Errors that can occur while loading parcels or indexing their neighbors.
#[derive(Debug, thiserror::Error)]
pub enum GeometryLoadError {
    /// The geometry source could not be read.
    #[error("failed to read geometry source: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The source is not valid GeoJSON.
    #[error("failed to parse GeoJSON: {source}")]
    Json {
        /// The underlying JSON parse error.
        #[from]
        source: serde_json::Error,
    },

    /// A coordinate position has fewer than two components or is not finite.
    #[error("feature {feature} has an invalid coordinate position")]
    InvalidPosition {
        /// Zero-based index of the offending feature in the source.
        feature: usize,
    },

    /// The source contained no usable polygon features.
    #[error("geometry source contains no usable parcels")]
    NoUsableParcels,

    /// More parcels than fit in a [`ParcelId`].
    #[error("too many parcels: {count}")]
    TooManyParcels {
        /// Number of parcels found or requested.
        count: usize,
    },

    /// Two parcels share an identifier.
    #[error("duplicate parcel id: {0}")]
    DuplicateParcel(ParcelId),

    /// A synthetic lattice was requested with unusable dimensions.
    #[error("invalid lattice: {reason}")]
    InvalidLattice {
        /// Explanation of what is wrong with the lattice.
        reason: String,
    },

    /// The neighbor predicate cannot be evaluated.
    #[error("invalid neighbor rule: {reason}")]
    InvalidNeighborRule {
        /// Explanation of what is wrong with the rule.
        reason: String,
    },
}
