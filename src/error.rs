//! Error types for building and mutating reaction networks.
//!
//! [`NetworkError`] is raised at construction time for malformed equations,
//! unresolvable species, invalid Michaelis-Menten equations and parameter name
//! collisions, and at mutation time for unknown registry keys. Integration
//! failures are wrapped from [`SimulationError`].

use thiserror::Error;

use crate::simulation::error::SimulationError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Equation '{0}' has no '->' or '<->' separating substrates from products")]
    MissingArrow(String),
    #[error("Equation '{0}' contains more than one reaction arrow")]
    MultipleArrows(String),
    #[error("Equation '{0}' is reversible where only '->' is allowed")]
    ReversibleNotAllowed(String),
    #[error("Malformed term '{term}' in equation '{equation}': {reason}")]
    MalformedTerm {
        equation: String,
        term: String,
        reason: String,
    },
    #[error("Unknown species '{0}'")]
    UnknownSpecies(String),
    #[error("Invalid enzyme assignment in Michaelis-Menten equation '{equation}': {reason}")]
    InvalidEnzyme { equation: String, reason: String },
    #[error("Reaction '{equation}' is missing a constant whose name contains '{pattern}'")]
    MissingConstant {
        equation: String,
        pattern: &'static str,
    },
    #[error("Reaction '{equation}' has several constants matching '{pattern}': {names:?}")]
    AmbiguousConstant {
        equation: String,
        pattern: &'static str,
        names: Vec<String>,
    },
    #[error("Reaction '{equation}' has constant '{name}' matching neither 'Km' nor 'kcat'")]
    UnexpectedConstant { equation: String, name: String },
    #[error("Reversible reaction '{equation}' needs exactly two rate constants, found {found}")]
    ReversibleConstants { equation: String, found: usize },
    #[error("Mass-action reaction '{equation}' needs exactly one rate constant, found {found}")]
    RateConstantCount { equation: String, found: usize },
    #[error("Reaction '{0}' is defined more than once")]
    DuplicateReaction(String),
    #[error("Duplicate parameter name '{0}'")]
    DuplicateParameter(String),
    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("Invalid value {value} for '{name}': expected a non-negative finite number")]
    InvalidValue { name: String, value: f64 },
    #[error("State has {found} entries, but the network has {expected} species")]
    StateLength { expected: usize, found: usize },
    #[error("Invalid time grid: {0}")]
    InvalidTimeGrid(String),
    #[error("Simulation failed: {0}")]
    Simulation(#[from] SimulationError),
}
