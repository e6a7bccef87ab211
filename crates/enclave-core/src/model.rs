//! The Schelling model: parcels, occupancy, active set, and the step cycle.
//!
//! A [`SchellingModel`] owns everything one run needs. Each call to
//! [`SchellingModel::step`] resets the happy counter, runs the scheduler
//! once, and updates the running flag. The model never stops itself beyond
//! clearing that flag; bounding the number of steps is the driver's job.

use enclave_types::{OccupancyState, ParcelId, ParcelView, StepSnapshot};
use enclave_world::{LoadOptions, ParcelStore, square_lattice};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::convergence::{self, SimulationState};
use crate::error::SimulationError;
use crate::initializer::{self, ModelParams};
use crate::occupancy::OccupancyModel;
use crate::registry::AgentRegistry;
use crate::scheduler;

/// A seeded Schelling segregation run over a fixed parcel layer.
#[derive(Debug, Clone)]
pub struct SchellingModel {
    store: ParcelStore,
    occupancy: OccupancyModel,
    registry: AgentRegistry,
    state: SimulationState,
    rng: SmallRng,
}

impl SchellingModel {
    /// Seed a model over `store` with random occupancy.
    ///
    /// The same `seed` drives the initial layout and every activation
    /// shuffle, so equal seeds give equal trajectories.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] if `params` are out of
    /// range. Nothing is drawn in that case.
    pub fn new(store: ParcelStore, params: ModelParams, seed: u64) -> Result<Self, SimulationError> {
        let params = params.validate()?;
        let mut rng = SmallRng::seed_from_u64(seed);
        let (occupancy, registry) = initializer::seed(store.parcel_ids(), params, &mut rng)?;
        Ok(Self::assemble(store, occupancy, registry, rng))
    }

    /// Build a model with explicit initial occupancy.
    ///
    /// Parcels not listed start unoccupied. `seed` drives the activation
    /// shuffles and vacancy choices.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownParcel`] if an assignment names a
    /// parcel outside `store`.
    pub fn with_occupancy(
        store: ParcelStore,
        assignments: impl IntoIterator<Item = (ParcelId, OccupancyState)>,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        let (occupancy, registry) = initializer::assign(store.parcel_ids(), assignments)?;
        Ok(Self::assemble(
            store,
            occupancy,
            registry,
            SmallRng::seed_from_u64(seed),
        ))
    }

    /// Build the parcel layer and seed a model from configuration.
    ///
    /// Reads `world.geometry_path` when set, otherwise generates the
    /// configured lattice.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] for out-of-range model
    /// parameters and [`SimulationError::GeometryLoad`] if the layer cannot be
    /// built.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, SimulationError> {
        // Parameters first: a bad slider value must not cost a geometry load.
        let params = ModelParams::from(config.model).validate()?;
        let world = &config.world;

        let store = match &world.geometry_path {
            Some(path) => {
                let options = LoadOptions {
                    id_property: world.id_property.clone(),
                };
                ParcelStore::load(path, &options, world.neighbor_rule)?
            }
            None => {
                let lattice = &world.lattice;
                info!(
                    rows = lattice.rows,
                    cols = lattice.cols,
                    "No geometry path configured, using synthetic lattice"
                );
                let parcels = square_lattice(lattice.rows, lattice.cols, lattice.cell_size)?;
                ParcelStore::from_parcels(parcels, world.neighbor_rule)?
            }
        };

        Self::new(store, params, world.seed)
    }

    fn assemble(
        store: ParcelStore,
        occupancy: OccupancyModel,
        registry: AgentRegistry,
        rng: SmallRng,
    ) -> Self {
        let model = Self {
            store,
            occupancy,
            registry,
            state: SimulationState::new(),
            rng,
        };
        info!(
            parcels = model.store.len(),
            agents = model.registry.len(),
            vacant = model.occupancy.vacant_count(),
            "Schelling model constructed"
        );
        model
    }

    /// Advance the model by one step and return the resulting snapshot.
    ///
    /// Stepping a converged model is allowed; it runs a normal step.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NoVacancy`] if an unhappy agent cannot
    /// move. The model is left mid-step and should be discarded.
    pub fn step(&mut self) -> Result<StepSnapshot, SimulationError> {
        self.state = convergence::begin_step(self.state);
        let outcome = scheduler::run_step(
            &self.store,
            &mut self.occupancy,
            &mut self.registry,
            &mut self.rng,
        )?;
        self.state = convergence::finish_step(self.state, outcome.happy, self.registry.len());

        debug!(
            step = self.state.step,
            happy = self.state.happy,
            active = self.registry.len(),
            relocations = outcome.relocations,
            running = self.state.running,
            "Step complete"
        );
        Ok(self.snapshot())
    }

    /// Aggregate counters for the sink.
    pub fn snapshot(&self) -> StepSnapshot {
        StepSnapshot {
            step: self.state.step,
            happy: self.state.happy,
            active_agents: self.registry.len(),
            running: self.state.running,
        }
    }

    /// Per-parcel state, colour, and geometry for a renderer, in ascending
    /// id order.
    pub fn parcel_views(&self) -> Vec<ParcelView> {
        self.store
            .parcels()
            .map(|parcel| {
                let state = self.occupancy.get(parcel.id);
                ParcelView {
                    id: parcel.id,
                    label: parcel.label.clone(),
                    state,
                    color: state.portrayal_color().to_owned(),
                    polygons: parcel.polygons.clone(),
                }
            })
            .collect()
    }

    /// Whether some agent was unhappy in the last step.
    pub const fn is_running(&self) -> bool {
        self.state.running
    }

    /// Current step counter, happy count, and running flag.
    pub const fn state(&self) -> SimulationState {
        self.state
    }

    /// The parcel layer.
    pub const fn store(&self) -> &ParcelStore {
        &self.store
    }

    /// Current occupancy.
    pub const fn occupancy(&self) -> &OccupancyModel {
        &self.occupancy
    }

    /// Current active set.
    pub const fn registry(&self) -> &AgentRegistry {
        &self.registry
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use enclave_world::NeighborRule;

    use super::*;

    fn grid(rows: u32, cols: u32) -> ParcelStore {
        ParcelStore::from_parcels(square_lattice(rows, cols, 1.0).unwrap(), NeighborRule::default())
            .unwrap()
    }

    #[test]
    fn fresh_model_snapshot() {
        let model = SchellingModel::new(grid(5, 5), ModelParams::default(), 42).unwrap();
        let snapshot = model.snapshot();
        assert_eq!(snapshot.step, 0);
        assert_eq!(snapshot.happy, 0);
        assert!(snapshot.running);
        assert_eq!(snapshot.active_agents, model.occupancy().occupied_count());
    }

    #[test]
    fn step_advances_counter() {
        let mut model = SchellingModel::new(grid(6, 6), ModelParams::default(), 42).unwrap();
        let first = model.step().unwrap();
        let second = model.step().unwrap();
        assert_eq!(first.step, 1);
        assert_eq!(second.step, 2);
        assert_eq!(model.state().step, 2);
    }

    #[test]
    fn invalid_density_rejected() {
        let params = ModelParams {
            density: 1.2,
            minority_fraction: 0.2,
        };
        let result = SchellingModel::new(grid(2, 2), params, 1);
        assert!(matches!(
            result,
            Err(SimulationError::InvalidParameter { name: "density", .. })
        ));
    }

    #[test]
    fn parcel_views_follow_occupancy() {
        let model = SchellingModel::with_occupancy(
            grid(1, 3),
            [
                (ParcelId::new(0), OccupancyState::GroupA),
                (ParcelId::new(2), OccupancyState::GroupB),
            ],
            0,
        )
        .unwrap();
        let colors: Vec<String> = model.parcel_views().into_iter().map(|v| v.color).collect();
        assert_eq!(colors, vec!["Green", "Grey", "Red"]);
        let labels: Vec<Option<String>> = model.parcel_views().into_iter().map(|v| v.label).collect();
        assert_eq!(labels.first().cloned().flatten().as_deref(), Some("r0c0"));
    }

    #[test]
    fn from_config_builds_lattice() {
        let config = SimulationConfig::parse(
            "world:\n  seed: 9\n  lattice:\n    rows: 4\n    cols: 6\n",
        )
        .unwrap();
        let model = SchellingModel::from_config(&config).unwrap();
        assert_eq!(model.store().len(), 24);
    }

    #[test]
    fn from_config_checks_parameters_before_geometry() {
        let config = SimulationConfig::parse(
            "world:\n  geometry_path: /nonexistent/layer.geojson\nmodel:\n  minority_fraction: 1.5\n",
        )
        .unwrap();
        let result = SchellingModel::from_config(&config);
        assert!(matches!(result, Err(SimulationError::InvalidParameter { .. })));
    }

    #[test]
    fn from_config_surfaces_geometry_errors() {
        let config =
            SimulationConfig::parse("world:\n  geometry_path: /nonexistent/layer.geojson\n").unwrap();
        let result = SchellingModel::from_config(&config);
        assert!(matches!(result, Err(SimulationError::GeometryLoad { .. })));
    }
}
