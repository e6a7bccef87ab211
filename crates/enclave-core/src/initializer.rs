//! Initial occupancy seeding.
//!
//! Each parcel is considered independently, in ascending id order: one draw
//! decides whether it is occupied (probability `density`), and for occupied
//! parcels a second draw decides the group (probability `minority_fraction`
//! for [`OccupancyState::GroupA`], the minority, otherwise
//! [`OccupancyState::GroupB`]). Both draws come from the same rng, so a
//! seeded rng reproduces the same layout.

use enclave_types::{OccupancyState, ParcelId};
use rand::Rng;
use tracing::info;

use crate::config::ModelConfig;
use crate::error::SimulationError;
use crate::occupancy::OccupancyModel;
use crate::registry::AgentRegistry;

/// Construction parameters of a Schelling model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    /// Probability that a parcel starts occupied.
    pub density: f64,
    /// Probability that an occupied parcel starts in the minority group.
    pub minority_fraction: f64,
}

impl ModelParams {
    /// Check that both parameters are probabilities.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] for the first value
    /// outside `[0, 1]` (NaN included).
    pub fn validate(self) -> Result<Self, SimulationError> {
        check_probability("density", self.density)?;
        check_probability("minority_fraction", self.minority_fraction)?;
        Ok(self)
    }
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelConfig::default().into()
    }
}

impl From<ModelConfig> for ModelParams {
    fn from(config: ModelConfig) -> Self {
        Self {
            density: config.density,
            minority_fraction: config.minority_fraction,
        }
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), SimulationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimulationError::InvalidParameter { name, value })
    }
}

/// Seed the initial occupancy and active set for `parcels`.
///
/// Parameters are validated before anything is drawn or allocated.
///
/// # Errors
///
/// Returns [`SimulationError::InvalidParameter`] if either parameter is out
/// of range.
pub fn seed(
    parcels: impl IntoIterator<Item = ParcelId>,
    params: ModelParams,
    rng: &mut impl Rng,
) -> Result<(OccupancyModel, AgentRegistry), SimulationError> {
    let params = params.validate()?;

    let parcels: Vec<ParcelId> = parcels.into_iter().collect();
    let mut occupancy = OccupancyModel::new(parcels.iter().copied());
    let mut registry = AgentRegistry::new();

    for id in parcels {
        if rng.random::<f64>() >= params.density {
            continue;
        }
        let state = if rng.random::<f64>() < params.minority_fraction {
            OccupancyState::GroupA
        } else {
            OccupancyState::GroupB
        };
        occupancy.set(id, state)?;
        registry.add(id);
    }

    info!(
        parcels = occupancy.len(),
        agents = registry.len(),
        density = params.density,
        minority_fraction = params.minority_fraction,
        "Initial occupancy seeded"
    );
    Ok((occupancy, registry))
}

/// Build occupancy and active set from explicit per-parcel states.
///
/// Parcels not mentioned stay unoccupied. A later entry for the same parcel
/// replaces an earlier one.
///
/// # Errors
///
/// Returns [`SimulationError::UnknownParcel`] if an assignment names a parcel
/// outside `parcels`.
pub fn assign(
    parcels: impl IntoIterator<Item = ParcelId>,
    assignments: impl IntoIterator<Item = (ParcelId, OccupancyState)>,
) -> Result<(OccupancyModel, AgentRegistry), SimulationError> {
    let mut occupancy = OccupancyModel::new(parcels);
    let mut registry = AgentRegistry::new();

    for (id, state) in assignments {
        occupancy.set(id, state)?;
        if state.is_occupied() {
            registry.add(id);
        } else {
            // Overwriting an earlier assignment may vacate an absent id.
            registry.discard(id);
        }
    }
    Ok((occupancy, registry))
}
