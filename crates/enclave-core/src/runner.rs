//! Simulation loop runner.
//!
//! [`run_simulation`] drives [`SchellingModel::step`] until the model
//! converges or an external step limit is hit, calling a [`StepCallback`]
//! after every step so a sink can record the trajectory.

use enclave_types::StepSnapshot;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SimulationError;
use crate::model::SchellingModel;

/// Why the run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationEndReason {
    /// Every active agent was happy in the same step.
    Converged,
    /// The configured maximum number of steps was executed.
    StepLimitReached,
}

/// Result of the simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// Counters after the last executed step (or the initial ones if no
    /// step ran).
    pub final_snapshot: StepSnapshot,
    /// Total number of steps executed by this call.
    pub total_steps: u64,
}

/// Callback invoked after each step completes.
pub trait StepCallback {
    /// Called after a step completes successfully.
    fn on_step(&mut self, snapshot: &StepSnapshot, model: &SchellingModel);
}

/// A no-op step callback for testing.
pub struct NoOpCallback;

impl StepCallback for NoOpCallback {
    fn on_step(&mut self, _snapshot: &StepSnapshot, _model: &SchellingModel) {}
}

/// Run the model until it converges or `max_steps` steps have executed.
///
/// `max_steps == 0` means no limit. A model that is already converged is
/// not stepped.
///
/// # Errors
///
/// Returns [`SimulationError`] if a step fails; the model must then be
/// discarded.
pub fn run_simulation(
    model: &mut SchellingModel,
    max_steps: u64,
    callback: &mut dyn StepCallback,
) -> Result<SimulationResult, SimulationError> {
    let mut total_steps: u64 = 0;
    let mut snapshot = model.snapshot();

    info!(
        max_steps,
        agents = snapshot.active_agents,
        parcels = model.store().len(),
        "Simulation starting"
    );

    loop {
        // --- Check convergence (before step) ---
        if !snapshot.running {
            info!(step = snapshot.step, happy = snapshot.happy, "All agents happy -- converged");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::Converged,
                final_snapshot: snapshot,
                total_steps,
            });
        }

        // --- Check step limit ---
        if max_steps > 0 && total_steps >= max_steps {
            info!(step = snapshot.step, max_steps, "Step limit reached");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::StepLimitReached,
                final_snapshot: snapshot,
                total_steps,
            });
        }

        // --- Execute step ---
        snapshot = model.step()?;
        total_steps = total_steps.saturating_add(1);

        // --- Notify callback ---
        callback.on_step(&snapshot, model);
    }
}

/// Log the simulation end.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_steps = result.total_steps,
        final_step = result.final_snapshot.step,
        final_happy = result.final_snapshot.happy,
        final_agents = result.final_snapshot.active_agents,
        "Simulation ended"
    );
}
