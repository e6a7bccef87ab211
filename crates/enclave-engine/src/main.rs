//! Engine binary for the Enclave simulation.
//!
//! This is the main entry point that wires together configuration, the
//! parcel layer, the Schelling model, and the snapshot sink, then runs the
//! step loop until the model converges or the configured step limit is hit.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `enclave-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing) at the configured level
//! 3. Load the parcel layer (or generate the lattice) and seed the model
//! 4. Open the snapshot sink
//! 5. Run the simulation loop
//! 6. Log the result and write the final parcel state

mod error;
mod sink;

use std::path::Path;

use enclave_core::{SchellingModel, SimulationConfig, runner};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::sink::SnapshotSink;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, model construction, a step, or the
/// sink fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        geometry = ?config.world.geometry_path,
        density = config.model.density,
        minority_fraction = config.model.minority_fraction,
        max_steps = config.simulation.max_steps,
        "enclave-engine starting"
    );

    run(&config)?;
    Ok(())
}

/// Build the model, run it, and write the sinks.
fn run(config: &SimulationConfig) -> Result<(), EngineError> {
    // 3. Parcel layer and initial occupancy.
    let mut model = SchellingModel::from_config(config)?;
    info!(
        parcels = model.store().len(),
        neighbor_pairs = model.store().neighbor_pair_count(),
        isolated = model.store().isolated_count(),
        connected = model.store().is_connected(),
        agents = model.registry().len(),
        "Model ready"
    );

    // 4. Snapshot sink.
    let mut sink = SnapshotSink::create(config.logging.snapshot_path.as_deref(), &model.snapshot())?;

    // 5. Step loop.
    let result = runner::run_simulation(&mut model, config.simulation.max_steps, &mut sink)?;

    // 6. Wrap up.
    runner::log_simulation_end(&result);
    let lines = sink.finish()?;
    if config.logging.snapshot_path.is_some() {
        info!(lines, "Step snapshots flushed");
    }
    if let Some(path) = &config.logging.final_state_path {
        sink::write_final_state(path, &model.parcel_views())?;
    }
    Ok(())
}

/// Load simulation configuration from `enclave-config.yaml`.
///
/// Falls back to defaults when the file does not exist.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new("enclave-config.yaml");
    if config_path.exists() {
        let config = SimulationConfig::from_file(config_path)?;
        Ok(config)
    } else {
        let mut config = SimulationConfig::default();
        config.world.apply_env_overrides()?;
        Ok(config)
    }
}
