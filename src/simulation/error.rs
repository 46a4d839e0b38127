//! Simulation Error Module
//!
//! This module provides the error type for everything that can go wrong once a
//! reaction network hands its derivative function to the ODE integrator.
//!
//! # Key Error Types
//!
//! The [`SimulationError`] enum covers the failure points of a simulation run:
//! - Invalid tolerances or step controls in the [`IntegrationSetup`](super::setup::IntegrationSetup)
//! - Failures reported by the underlying peroxide integrator, including
//!   adaptive schemes that shorten the requested step
//! - Step-size control giving up (step budget exhausted, step size underflow)
//! - Non-finite states produced during integration
//!
//! None of these errors is retried. They propagate as terminal errors from
//! [`ReactionNetwork::integrate`](crate::network::ReactionNetwork::integrate).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid tolerance '{name}': expected a positive finite number, found {value}")]
    InvalidTolerance { name: &'static str, value: f64 },
    #[error("Invalid integration setup: {0}")]
    InvalidSetup(String),
    #[error("Integrator failed at t = {t}: {message}")]
    Integrator { t: f64, message: String },
    #[error("Integrator advanced by {taken} at t = {t} instead of the requested step {requested}; only fixed-step schemes are supported")]
    StepMismatch { t: f64, requested: f64, taken: f64 },
    #[error("Exceeded the maximum of {max_steps} steps before reaching t = {target}")]
    MaxStepsExceeded { max_steps: usize, target: f64 },
    #[error("Step size fell below {min_step} at t = {t} without meeting the tolerances")]
    StepSizeUnderflow { t: f64, min_step: f64 },
    #[error("Non-finite concentration for species index {index} at t = {t}")]
    NonFiniteState { t: f64, index: usize },
}
