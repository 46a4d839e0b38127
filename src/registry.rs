//! Update Registry
//!
//! Every mutable scalar of a network is addressable by name:
//!
//! - mass-action rate constants
//! - Michaelis constants (`Km`) and turnover numbers (`kcat`)
//! - species names, addressing initial concentrations
//!
//! The registry maps each name to a [`ParameterTarget`] that tells the network
//! which array to edit and at which position. Names have to be unique across
//! all four categories.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::error::NetworkError;
use crate::reactions::mass_action::MassActionReactions;
use crate::reactions::michaelis_menten::MichaelisMentenReactions;
use crate::species::SpeciesIndex;

/// Category of an updatable scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Diagonal entry of the mass-action rate matrix
    RateConstant,
    Km,
    Kcat,
    InitialConcentration,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ParameterKind::RateConstant => "rate constant",
            ParameterKind::Km => "Km",
            ParameterKind::Kcat => "kcat",
            ParameterKind::InitialConcentration => "initial concentration",
        };
        write!(f, "{}", label)
    }
}

/// Location of an updatable scalar
///
/// `index` is the reaction index for rate constants, `Km` and `kcat`, and the
/// species position for initial concentrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterTarget {
    pub kind: ParameterKind,
    pub index: usize,
}

impl ParameterTarget {
    pub fn new(kind: ParameterKind, index: usize) -> Self {
        Self { kind, index }
    }
}

/// Name → target map of all updatable scalars of a network
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRegistry {
    names: Vec<String>,
    targets: HashMap<String, ParameterTarget>,
}

impl UpdateRegistry {
    /// Registers every rate constant, `Km`, `kcat` and species name.
    ///
    /// # Arguments
    ///
    /// * `mass_action` - The network's mass-action reactions
    /// * `michaelis_menten` - The network's Michaelis-Menten reactions
    /// * `species` - The network's species index
    ///
    /// # Returns
    ///
    /// Returns the registry, or [`NetworkError::DuplicateParameter`] for the
    /// first name that is registered twice.
    pub fn new(
        mass_action: &MassActionReactions,
        michaelis_menten: &MichaelisMentenReactions,
        species: &SpeciesIndex,
    ) -> Result<Self, NetworkError> {
        let mut registry = Self::default();

        for (i, name) in mass_action.rate_names().iter().enumerate() {
            registry.insert(name, ParameterTarget::new(ParameterKind::RateConstant, i))?;
        }
        for (i, name) in michaelis_menten.km_names().iter().enumerate() {
            registry.insert(name, ParameterTarget::new(ParameterKind::Km, i))?;
        }
        for (i, name) in michaelis_menten.kcat_names().iter().enumerate() {
            registry.insert(name, ParameterTarget::new(ParameterKind::Kcat, i))?;
        }
        for (i, name) in species.names().iter().enumerate() {
            registry.insert(
                name,
                ParameterTarget::new(ParameterKind::InitialConcentration, i),
            )?;
        }

        debug!("Registered {} updatable parameters", registry.len());

        Ok(registry)
    }

    fn insert(&mut self, name: &str, target: ParameterTarget) -> Result<(), NetworkError> {
        if self.targets.contains_key(name) {
            return Err(NetworkError::DuplicateParameter(name.to_string()));
        }

        self.names.push(name.to_string());
        self.targets.insert(name.to_string(), target);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<ParameterTarget> {
        self.targets.get(name).copied()
    }

    /// Looks up a name or fails with [`NetworkError::UnknownParameter`].
    pub fn resolve(&self, name: &str) -> Result<ParameterTarget, NetworkError> {
        self.get(name)
            .ok_or_else(|| NetworkError::UnknownParameter(name.to_string()))
    }

    /// Registered names in registration order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Names registered under the given kind, in registration order
    pub fn names_of(&self, kind: ParameterKind) -> Vec<&str> {
        self.names
            .iter()
            .filter(|name| self.targets.get(name.as_str()).map(|t| t.kind) == Some(kind))
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
