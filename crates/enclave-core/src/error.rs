//! Error types for the `enclave-core` crate.
//!
//! Every variant is fatal for the run: construction errors mean there is
//! nothing valid to simulate, and stepping errors mean a structural invariant
//! of the relocation rule was violated. Nothing here is retried.

use enclave_types::ParcelId;
use enclave_world::GeometryLoadError;

/// Errors raised while building or stepping a Schelling model.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The parcel layer could not be loaded or indexed.
    #[error("geometry load failed: {source}")]
    GeometryLoad {
        /// The underlying load error.
        #[from]
        source: GeometryLoadError,
    },

    /// A construction parameter is outside `[0, 1]` or not a number.
    #[error("invalid parameter {name}: {value} is outside [0, 1]")]
    InvalidParameter {
        /// Parameter name as it appears in configuration.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// An unhappy agent had to relocate but no parcel was vacant.
    #[error("no vacant parcel available to relocate the agent on {parcel}")]
    NoVacancy {
        /// The parcel whose agent could not move.
        parcel: ParcelId,
    },

    /// A strict removal targeted a parcel that is not in the active set.
    #[error("parcel {0} is not an active agent")]
    AgentNotActive(ParcelId),

    /// An operation referenced a parcel the store does not contain.
    #[error("unknown parcel: {0}")]
    UnknownParcel(ParcelId),
}
