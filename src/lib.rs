//! Reaction Kinetics Library
//!
//! This library provides functionality for simulating chemical reaction networks, including:
//! - Parsing chemical equations such as `"2*A + B -> C"` into stoichiometry matrices
//! - Splitting reversible reactions into forward and reverse mass-action reactions
//! - Michaelis-Menten kinetics using the closed-form quadratic velocity
//! - Updating rate constants, `Km`, `kcat` and initial concentrations by name
//! - Integrating the resulting ODE system across an arbitrary time grid

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::definition::*;
    pub use crate::equation::{parse_equation, parse_term, Equation, Term};
    pub use crate::error::NetworkError;
    pub use crate::network::*;
    pub use crate::reactions::kinetics::RateLaw;
    pub use crate::registry::{ParameterKind, ParameterTarget};
    pub use crate::simulation::error::SimulationError;
    pub use crate::simulation::result::*;
    pub use crate::simulation::setup::*;
    pub use crate::species::SpeciesIndex;

    pub use peroxide::fuga::{ODEIntegrator, RK4, RK5};
}

/// Chemical equation parsing
pub mod equation;

/// Species name to position mapping
pub mod species;

/// Construction inputs of a reaction network
pub mod definition;

/// Construction and mutation errors
pub mod error;

/// The reaction network and its integration
pub mod network;

/// Name to target mapping of updatable parameters
pub mod registry;

/// Reaction sets and their rate laws
pub mod reactions {
    pub use crate::reactions::kinetics::RateLaw;

    /// Shared interface of all reaction sets
    pub mod kinetics;
    /// Mass-action stoichiometry and rate matrices
    pub mod mass_action;
    /// Michaelis-Menten reactions with quadratic velocity
    pub mod michaelis_menten;
    /// Splitting of reversible reactions
    pub mod reversible;
}

/// Numerical integration of reaction networks
pub mod simulation {
    pub use crate::simulation::setup::IntegrationSetup;

    /// Error types for simulation failures
    pub mod error;
    /// Simulation result data structures
    pub mod result;
    /// Integration setup and configuration
    pub mod setup;
    /// Adaptive stepping across the time grid
    pub mod solver;
    /// Derivative function handed to the integrator
    pub mod system;
}
