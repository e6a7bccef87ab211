//! Schelling segregation dynamics for the Enclave simulation.
//!
//! This crate owns the per-step cycle that drives a run: reset the happy
//! counter, activate every agent once in a fresh random order, relocate the
//! unhappy ones to random vacancies, and stop once everyone is happy.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `enclave-config.yaml` into
//!   strongly-typed structs.
//! - [`convergence`] -- [`SimulationState`] and the termination test.
//! - [`error`] -- [`SimulationError`], fatal construction and stepping errors.
//! - [`initializer`] -- Random and explicit initial occupancy.
//! - [`model`] -- [`SchellingModel`], the owned state of one run.
//! - [`occupancy`] -- Per-parcel state with an indexed vacancy pool.
//! - [`registry`] -- The active agent set.
//! - [`runner`] -- Step loop with convergence and step-limit stops.
//! - [`scheduler`] -- One step of the relocation rule.

pub mod config;
pub mod convergence;
pub mod error;
pub mod initializer;
pub mod model;
pub mod occupancy;
pub mod registry;
pub mod runner;
pub mod scheduler;

// Re-export primary types at crate root.
pub use config::{ConfigError, SimulationConfig};
pub use convergence::{SimulationState, should_continue};
pub use error::SimulationError;
pub use initializer::ModelParams;
pub use model::SchellingModel;
pub use occupancy::OccupancyModel;
pub use registry::AgentRegistry;
pub use runner::{
    NoOpCallback, SimulationEndReason, SimulationResult, StepCallback, log_simulation_end,
    run_simulation,
};
pub use scheduler::{StepOutcome, activation_order};
