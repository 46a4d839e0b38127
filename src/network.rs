//! Reaction Network
//!
//! [`ReactionNetwork`] assembles every component of a kinetic model and
//! integrates it:
//!
//! 1. species discovery over all mass-action and Michaelis-Menten equations
//! 2. splitting of reversible mass-action reactions
//! 3. construction of both reaction sets
//! 4. the initial-concentration vector (species without a value start at
//!    [`DEFAULT_CONCENTRATION`])
//! 5. the update registry keyed by rate constants, `Km`, `kcat` and species names
//!
//! After construction the kinetics can only be changed through
//! [`ReactionNetwork::update`], and the stored trajectory is replaced on every
//! call to [`ReactionNetwork::integrate`].

use std::collections::HashSet;

use itertools::Itertools;
use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView1};
use peroxide::fuga::{ODEIntegrator, RK5};

use crate::definition::{NetworkBuilder, NetworkDefinition, ReactionEntry};
use crate::equation::compact;
use crate::error::NetworkError;
use crate::reactions::mass_action::MassActionReactions;
use crate::reactions::michaelis_menten::MichaelisMentenReactions;
use crate::reactions::reversible::split_reversible;
use crate::registry::{ParameterKind, ParameterTarget, UpdateRegistry};
use crate::simulation::result::SimulationResult;
use crate::simulation::setup::IntegrationSetup;
use crate::simulation::solver::integrate_grid;
use crate::simulation::system::NetworkSystem;
use crate::species::SpeciesIndex;

/// Initial concentration of species without an explicit value
pub const DEFAULT_CONCENTRATION: f64 = 1e-50;

/// A chemical reaction network with mass-action and Michaelis-Menten kinetics
#[derive(Debug, Clone)]
pub struct ReactionNetwork {
    species: SpeciesIndex,
    initial_concentrations: Array1<f64>,
    time: Vec<f64>,
    mass_action: MassActionReactions,
    michaelis_menten: MichaelisMentenReactions,
    registry: UpdateRegistry,
    /// Trajectory of the latest integration, shape (species × time)
    concentrations: Option<Array2<f64>>,
}

impl ReactionNetwork {
    /// Builds a network from its definition.
    ///
    /// # Arguments
    ///
    /// * `definition` - Reactions, initial concentrations and time grid
    ///
    /// # Returns
    ///
    /// Returns the network or the first construction error:
    ///
    /// * [`NetworkError::InvalidTimeGrid`] for an empty, negative or non-increasing grid
    /// * [`NetworkError::DuplicateReaction`] if an equation appears twice in one category
    /// * [`NetworkError::InvalidValue`] for negative or non-finite constants or concentrations
    /// * parse, splitting and enzyme errors of the individual reactions
    /// * [`NetworkError::UnknownSpecies`] for initial concentrations of species
    ///   no reaction refers to
    /// * [`NetworkError::DuplicateParameter`] for name collisions in the registry
    pub fn new(definition: NetworkDefinition) -> Result<Self, NetworkError> {
        validate_time(&definition.time)?;
        check_unique_equations(&definition.mass_action)?;
        check_unique_equations(&definition.michaelis_menten)?;

        for entry in definition
            .mass_action
            .iter()
            .chain(definition.michaelis_menten.iter())
        {
            for (name, value) in entry.constants.iter() {
                check_value(name, *value)?;
            }
        }
        for (name, value) in definition.initial_concentrations.iter() {
            check_value(name, *value)?;
        }

        let species = SpeciesIndex::from_equations(
            definition
                .mass_action
                .iter()
                .chain(definition.michaelis_menten.iter())
                .map(|entry| entry.equation.as_str()),
        )?;
        debug!("Discovered {} species: {:?}", species.len(), species.names());

        let elementary = split_reversible(&definition.mass_action)?;
        let mass_action = MassActionReactions::new(&elementary, &species)?;
        let michaelis_menten =
            MichaelisMentenReactions::new(&definition.michaelis_menten, &species)?;

        let mut initial_concentrations = Array1::from_elem(species.len(), DEFAULT_CONCENTRATION);
        for (name, value) in definition.initial_concentrations.iter() {
            initial_concentrations[species.position(name)?] = *value;
        }

        for enzyme in michaelis_menten.enzyme_indices().iter().unique() {
            if let Some(name) = species.name(*enzyme) {
                if !definition.initial_concentrations.contains_key(name) {
                    warn!(
                        "Enzyme '{}' has no initial concentration and starts at {:e}",
                        name, DEFAULT_CONCENTRATION
                    );
                }
            }
        }

        let registry = UpdateRegistry::new(&mass_action, &michaelis_menten, &species)?;

        Ok(Self {
            species,
            initial_concentrations,
            time: definition.time,
            mass_action,
            michaelis_menten,
            registry,
            concentrations: None,
        })
    }

    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::default()
    }

    /// Sets a rate constant, `Km`, `kcat` or initial concentration by name.
    ///
    /// # Arguments
    ///
    /// * `name` - Any name listed by [`ReactionNetwork::parameter_names`]
    /// * `value` - The new value; must be finite and non-negative
    ///
    /// # Returns
    ///
    /// Fails with [`NetworkError::UnknownParameter`] or
    /// [`NetworkError::InvalidValue`] without changing the network. The stored
    /// trajectory is kept until the next integration.
    pub fn update(&mut self, name: &str, value: f64) -> Result<(), NetworkError> {
        check_value(name, value)?;
        let target = self.registry.resolve(name)?;
        self.apply(name, target, value)?;

        debug!("Set {} '{}' to {}", target.kind, name, value);
        Ok(())
    }

    /// Applies several updates at once.
    ///
    /// Every name and value is checked before the first one is applied, so a
    /// failing batch leaves the network unchanged.
    pub fn update_many<I, N>(&mut self, updates: I) -> Result<(), NetworkError>
    where
        I: IntoIterator<Item = (N, f64)>,
        N: AsRef<str>,
    {
        let resolved = updates
            .into_iter()
            .map(|(name, value)| -> Result<(String, ParameterTarget, f64), NetworkError> {
                let name = name.as_ref();
                check_value(name, value)?;
                Ok((name.to_string(), self.registry.resolve(name)?, value))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (name, target, value) in resolved {
            self.apply(&name, target, value)?;
        }

        Ok(())
    }

    /// Current value behind a registry name.
    pub fn parameter(&self, name: &str) -> Result<f64, NetworkError> {
        let target = self.registry.resolve(name)?;

        let value = match target.kind {
            ParameterKind::RateConstant => self.mass_action.rate(target.index),
            ParameterKind::Km => self.michaelis_menten.km(target.index),
            ParameterKind::Kcat => self.michaelis_menten.kcat(target.index),
            ParameterKind::InitialConcentration => {
                self.initial_concentrations.get(target.index).copied()
            }
        };

        value.ok_or_else(|| NetworkError::UnknownParameter(name.to_string()))
    }

    fn apply(&mut self, name: &str, target: ParameterTarget, value: f64) -> Result<(), NetworkError> {
        let applied = match target.kind {
            ParameterKind::RateConstant => self.mass_action.set_rate(target.index, value),
            ParameterKind::Km => self.michaelis_menten.set_km(target.index, value),
            ParameterKind::Kcat => self.michaelis_menten.set_kcat(target.index, value),
            ParameterKind::InitialConcentration => {
                match self.initial_concentrations.get_mut(target.index) {
                    Some(slot) => {
                        *slot = value;
                        true
                    }
                    None => false,
                }
            }
        };

        if applied {
            Ok(())
        } else {
            Err(NetworkError::UnknownParameter(name.to_string()))
        }
    }

    /// Combined net production rate of every species at the given state.
    pub fn derivative(&self, concentrations: ArrayView1<f64>) -> Result<Array1<f64>, NetworkError> {
        if concentrations.len() != self.species.len() {
            return Err(NetworkError::StateLength {
                expected: self.species.len(),
                found: concentrations.len(),
            });
        }

        let mut dy: Array1<f64> = Array1::zeros(self.species.len());
        self.system().derivative(concentrations, dy.view_mut());
        Ok(dy)
    }

    /// Integrates the network across its time grid with the default integrator.
    ///
    /// # Arguments
    ///
    /// * `rtol` - Relative tolerance, `1.49012e-8` when `None`
    /// * `atol` - Absolute tolerance, `1.49012e-8` when `None`
    ///
    /// # Returns
    ///
    /// Returns the stored trajectory with shape (species × time).
    pub fn integrate(
        &mut self,
        rtol: Option<f64>,
        atol: Option<f64>,
    ) -> Result<&Array2<f64>, NetworkError> {
        self.integrate_with(&IntegrationSetup::with_tolerances(rtol, atol), RK5::default())
    }

    /// Integrates the network with an explicit setup and single-step integrator.
    ///
    /// # Arguments
    ///
    /// * `setup` - Tolerances and step controls
    /// * `integrator` - A fixed-step peroxide integrator such as `RK4` or `RK5`
    ///
    /// # Returns
    ///
    /// Returns the stored trajectory with shape (species × time). Embedded
    /// schemes that shorten a step fail with [`SimulationError::StepMismatch`](crate::simulation::error::SimulationError::StepMismatch).
    pub fn integrate_with<S: ODEIntegrator>(
        &mut self,
        setup: &IntegrationSetup,
        integrator: S,
    ) -> Result<&Array2<f64>, NetworkError> {
        let y0 = self.initial_concentrations.to_vec();
        let solution = integrate_grid(&self.system(), integrator, &y0, &self.time, setup)?;

        debug!(
            "Integrated {} species over {} time points ({} accepted, {} rejected steps)",
            self.species.len(),
            self.time.len(),
            solution.accepted_steps,
            solution.rejected_steps
        );

        Ok(&*self
            .concentrations
            .insert(solution.trajectory.reversed_axes()))
    }

    /// Replaces the time grid and discards the stored trajectory.
    pub fn set_time(&mut self, time: Vec<f64>) -> Result<(), NetworkError> {
        validate_time(&time)?;
        self.time = time;
        self.concentrations = None;
        Ok(())
    }

    fn system(&self) -> NetworkSystem<'_> {
        NetworkSystem::new(&self.mass_action, &self.michaelis_menten)
    }

    pub fn species(&self) -> &[String] {
        self.species.names()
    }

    pub fn species_index(&self) -> &SpeciesIndex {
        &self.species
    }

    pub fn initial_concentrations(&self) -> &Array1<f64> {
        &self.initial_concentrations
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn mass_action(&self) -> &MassActionReactions {
        &self.mass_action
    }

    pub fn michaelis_menten(&self) -> &MichaelisMentenReactions {
        &self.michaelis_menten
    }

    pub fn registry(&self) -> &UpdateRegistry {
        &self.registry
    }

    /// Names accepted by [`ReactionNetwork::update`]
    pub fn parameter_names(&self) -> &[String] {
        self.registry.names()
    }

    /// Trajectory of the latest integration, shape (species × time)
    pub fn concentrations(&self) -> Option<&Array2<f64>> {
        self.concentrations.as_ref()
    }

    /// Time series of one species, `None` before the first integration.
    pub fn concentrations_of(&self, species: &str) -> Result<Option<ArrayView1<'_, f64>>, NetworkError> {
        let position = self.species.position(species)?;
        Ok(self
            .concentrations
            .as_ref()
            .map(|trajectory| trajectory.row(position)))
    }

    /// Named time series of the latest integration
    pub fn to_result(&self) -> Option<SimulationResult> {
        self.concentrations.as_ref().map(|trajectory| {
            SimulationResult::from_trajectory(self.time.clone(), self.species.names(), trajectory)
        })
    }
}

fn check_value(name: &str, value: f64) -> Result<(), NetworkError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(NetworkError::InvalidValue {
            name: name.to_string(),
            value,
        })
    }
}

fn validate_time(time: &[f64]) -> Result<(), NetworkError> {
    if time.is_empty() {
        return Err(NetworkError::InvalidTimeGrid(
            "time grid is empty".to_string(),
        ));
    }

    if let Some(t) = time.iter().find(|t| !t.is_finite() || **t < 0.0) {
        return Err(NetworkError::InvalidTimeGrid(format!(
            "time point {} is negative or not finite",
            t
        )));
    }

    if let Some((a, b)) = time.iter().tuple_windows().find(|(a, b)| b <= a) {
        return Err(NetworkError::InvalidTimeGrid(format!(
            "time points must be strictly increasing, found {} followed by {}",
            a, b
        )));
    }

    Ok(())
}

fn check_unique_equations(entries: &[ReactionEntry]) -> Result<(), NetworkError> {
    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(compact(&entry.equation)) {
            return Err(NetworkError::DuplicateReaction(entry.equation.clone()));
        }
    }
    Ok(())
}
