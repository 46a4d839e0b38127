//! Construction inputs for a [`ReactionNetwork`].
//!
//! A network is described by three mappings and a time grid:
//!
//! - mass-action reactions: equation → one rate constant, or two (forward,
//!   reverse) for `<->` equations
//! - Michaelis-Menten reactions: equation → a `Km` and a `kcat` constant
//! - initial concentrations: species → value
//!
//! [`NetworkDefinition`] holds these as plain serde-friendly data, while
//! [`NetworkBuilder`] assembles the same data fluently in code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::NetworkError;
use crate::network::ReactionNetwork;

/// Ordered name → value pairs of the kinetic constants of one reaction
pub type KineticConstants = Vec<(String, f64)>;

/// A reaction equation together with its named kinetic constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionEntry {
    pub equation: String,
    pub constants: KineticConstants,
}

impl ReactionEntry {
    pub fn new<E, I, N>(equation: E, constants: I) -> Self
    where
        E: Into<String>,
        I: IntoIterator<Item = (N, f64)>,
        N: Into<String>,
    {
        Self {
            equation: equation.into(),
            constants: constants
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

/// Complete description of a reaction network
///
/// # Examples
///
/// ```
/// use reaction_kinetics::prelude::*;
///
/// let definition: NetworkDefinition = serde_json::from_str(r#"{
///     "mass_action": [{ "equation": "A -> B", "constants": [["k1", 0.5]] }],
///     "initial_concentrations": { "A": 1.0 },
///     "time": [0.0, 1.0, 2.0]
/// }"#).unwrap();
///
/// let network = ReactionNetwork::new(definition).unwrap();
/// assert_eq!(network.species(), &["A".to_string(), "B".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDefinition {
    #[serde(default)]
    pub mass_action: Vec<ReactionEntry>,
    #[serde(default)]
    pub michaelis_menten: Vec<ReactionEntry>,
    #[serde(default)]
    pub initial_concentrations: BTreeMap<String, f64>,
    pub time: Vec<f64>,
}

/// Fluent builder for [`ReactionNetwork`]
///
/// # Examples
///
/// ```
/// use reaction_kinetics::prelude::*;
///
/// let network = NetworkBuilder::default()
///     .reversible("A <-> B", ("kf", 2.0), ("kr", 1.0))
///     .michaelis_menten("S + E -> E + P", [("Km", 0.5), ("kcat", 10.0)])
///     .initial_concentration("A", 1.0)
///     .initial_concentration("S", 5.0)
///     .initial_concentration("E", 0.1)
///     .time(vec![0.0, 0.5, 1.0])
///     .build()
///     .unwrap();
///
/// assert_eq!(network.species().len(), 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    definition: NetworkDefinition,
}

impl NetworkBuilder {
    /// Adds a mass-action reaction with its rate constant(s).
    pub fn mass_action<E, I, N>(mut self, equation: E, constants: I) -> Self
    where
        E: Into<String>,
        I: IntoIterator<Item = (N, f64)>,
        N: Into<String>,
    {
        self.definition
            .mass_action
            .push(ReactionEntry::new(equation, constants));
        self
    }

    /// Adds a reversible mass-action reaction with forward and reverse rate constants.
    pub fn reversible<E, N>(self, equation: E, forward: (N, f64), reverse: (N, f64)) -> Self
    where
        E: Into<String>,
        N: Into<String>,
    {
        self.mass_action(equation, [forward, reverse])
    }

    /// Adds a Michaelis-Menten reaction with its `Km` and `kcat` constants.
    pub fn michaelis_menten<E, I, N>(mut self, equation: E, constants: I) -> Self
    where
        E: Into<String>,
        I: IntoIterator<Item = (N, f64)>,
        N: Into<String>,
    {
        self.definition
            .michaelis_menten
            .push(ReactionEntry::new(equation, constants));
        self
    }

    pub fn initial_concentration(mut self, species: impl Into<String>, value: f64) -> Self {
        self.definition
            .initial_concentrations
            .insert(species.into(), value);
        self
    }

    pub fn initial_concentrations<I, S>(mut self, concentrations: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.definition.initial_concentrations.extend(
            concentrations
                .into_iter()
                .map(|(species, value)| (species.into(), value)),
        );
        self
    }

    pub fn time(mut self, time: Vec<f64>) -> Self {
        self.definition.time = time;
        self
    }

    pub fn definition(&self) -> &NetworkDefinition {
        &self.definition
    }

    pub fn build(self) -> Result<ReactionNetwork, NetworkError> {
        ReactionNetwork::new(self.definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_collects_entries() {
        let builder = NetworkBuilder::default()
            .mass_action("A -> B", [("k1", 1.0)])
            .reversible("B <-> C", ("k2", 2.0), ("k3", 3.0))
            .initial_concentrations([("A", 1.0), ("B", 0.5)])
            .time(vec![0.0, 1.0]);

        let definition = builder.definition();
        assert_eq!(definition.mass_action.len(), 2);
        assert_eq!(
            definition.mass_action[1].constants,
            vec![("k2".to_string(), 2.0), ("k3".to_string(), 3.0)]
        );
        assert_eq!(definition.initial_concentrations.get("B"), Some(&0.5));
    }

    #[test]
    fn test_definition_json_roundtrip() {
        let definition = NetworkBuilder::default()
            .mass_action("A -> B", [("k1", 1.0)])
            .michaelis_menten("S + E -> E + P", [("Km", 0.5), ("kcat", 2.0)])
            .initial_concentration("S", 1.0)
            .time(vec![0.0, 1.0])
            .definition()
            .clone();

        let json = serde_json::to_string(&definition).unwrap();
        let parsed: NetworkDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, definition);
    }
}
