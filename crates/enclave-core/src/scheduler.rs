//! One step of the relocation rule.
//!
//! [`run_step`] freezes the active set, shuffles it into a fresh activation
//! order, and walks that order against the live state: an agent evaluated
//! later in the step sees every move made before it.
//!
//! For each activated agent, neighbors are classified by their current
//! occupancy. Unoccupied neighbors are skipped; the rest count as `similar`
//! (same group) or `different`. An agent with strictly fewer similar than
//! different neighbors moves to a vacant parcel drawn uniformly from the
//! whole layer. Everyone else is happy.
//!
//! An agent only leaves its parcel during its own activation, so every id in
//! the order is still active when its turn comes. Parcels filled during the
//! step are not in the order and wait for the next step.

use enclave_types::{OccupancyState, ParcelId};
use enclave_world::ParcelStore;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, trace};

use crate::error::SimulationError;
use crate::occupancy::OccupancyModel;
use crate::registry::AgentRegistry;

/// Counters produced by one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Agents that stayed put.
    pub happy: usize,
    /// Agents that moved to a vacancy.
    pub relocations: usize,
    /// Snapshot entries actually evaluated.
    pub activated: usize,
}

/// Same-group and other-group neighbor counts for one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeighborTally {
    /// Occupied neighbors in the agent's group.
    pub similar: usize,
    /// Occupied neighbors in the other group.
    pub different: usize,
}

impl NeighborTally {
    /// Whether the agent wants to move.
    pub const fn is_unhappy(self) -> bool {
        self.similar < self.different
    }
}

/// Count the occupied neighbors of `id` by group, relative to `group`.
pub fn tally_neighbors(
    store: &ParcelStore,
    occupancy: &OccupancyModel,
    id: ParcelId,
    group: OccupancyState,
) -> NeighborTally {
    let mut tally = NeighborTally::default();
    for &neighbor in store.neighbors(id) {
        let state = occupancy.get(neighbor);
        if !state.is_occupied() {
            continue;
        }
        if state == group {
            tally.similar = tally.similar.saturating_add(1);
        } else {
            tally.different = tally.different.saturating_add(1);
        }
    }
    tally
}

/// Freeze the active set and shuffle it into this step's activation order.
pub fn activation_order(registry: &AgentRegistry, rng: &mut impl Rng) -> Vec<ParcelId> {
    let mut order = registry.snapshot();
    order.shuffle(rng);
    order
}

/// Run one step over the current active set.
///
/// # Errors
///
/// Returns [`SimulationError::NoVacancy`] if an unhappy agent finds no
/// vacant parcel, and [`SimulationError::AgentNotActive`] or
/// [`SimulationError::UnknownParcel`] if occupancy and registry disagree.
pub fn run_step(
    store: &ParcelStore,
    occupancy: &mut OccupancyModel,
    registry: &mut AgentRegistry,
    rng: &mut impl Rng,
) -> Result<StepOutcome, SimulationError> {
    let order = activation_order(registry, rng);

    let mut outcome = StepOutcome::default();
    for id in order {
        debug_assert!(registry.contains(id), "{id} left before its activation");
        let group = occupancy.get(id);
        outcome.activated = outcome.activated.saturating_add(1);

        let tally = tally_neighbors(store, occupancy, id, group);
        if tally.is_unhappy() {
            relocate(occupancy, registry, id, group, rng)?;
            outcome.relocations = outcome.relocations.saturating_add(1);
        } else {
            outcome.happy = outcome.happy.saturating_add(1);
        }
    }

    debug!(
        activated = outcome.activated,
        happy = outcome.happy,
        relocations = outcome.relocations,
        vacant = occupancy.vacant_count(),
        "Step scheduled"
    );
    Ok(outcome)
}

/// Move the agent on `origin` to a random vacancy.
fn relocate(
    occupancy: &mut OccupancyModel,
    registry: &mut AgentRegistry,
    origin: ParcelId,
    group: OccupancyState,
    rng: &mut impl Rng,
) -> Result<(), SimulationError> {
    let target = occupancy
        .random_vacancy(rng)
        .ok_or(SimulationError::NoVacancy { parcel: origin })?;

    occupancy.set(target, group)?;
    registry.add(target);
    occupancy.set(origin, OccupancyState::Unoccupied)?;
    registry.remove(origin)?;

    trace!(from = %origin, to = %target, %group, "Agent relocated");
    Ok(())
}
