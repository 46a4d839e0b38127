//! Simulation Result Module
//!
//! This module provides the named, serializable form of a network trajectory.
//!
//! # Key Components
//!
//! - [`SimulationResult`]: Stores the time grid and the time series of every species
//! - [`TimeSeriesMapping`]: A HashMap type for storing time-dependent values
//!
//! The numeric trajectory stays on the network as a (species × time) array;
//! [`SimulationResult`] is the form handed to serde or to code that prefers
//! lookup by species name.

use std::collections::HashMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Species name → concentration at every grid point.
pub type TimeSeriesMapping = HashMap<String, Vec<f64>>;

/// Represents the result of a simulation.
///
/// # Fields
///
/// * `time` - Vector of time points at which the network was evaluated
/// * `species` - HashMap mapping species names to their concentration values over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub time: Vec<f64>,
    pub species: TimeSeriesMapping,
}

impl SimulationResult {
    /// Creates a new SimulationResult with the given time points.
    ///
    /// # Arguments
    ///
    /// * `time` - A vector of time points at which the network was evaluated
    ///
    /// # Returns
    ///
    /// A new SimulationResult instance with an empty species map.
    pub fn new(time: Vec<f64>) -> Self {
        Self {
            time,
            species: HashMap::new(),
        }
    }

    /// Builds a result from a (species × time) trajectory.
    ///
    /// Rows of `trajectory` are matched to `species` by position.
    pub fn from_trajectory(time: Vec<f64>, species: &[String], trajectory: &Array2<f64>) -> Self {
        let mut result = Self::new(time);
        for (name, row) in species.iter().zip(trajectory.outer_iter()) {
            result.add_species(name.clone(), row.to_vec());
        }
        result
    }

    /// Adds species concentration data to the SimulationResult.
    ///
    /// # Arguments
    ///
    /// * `species` - The name of the species
    /// * `values` - Vector of concentration values for the species over time
    pub fn add_species(&mut self, species: String, values: Vec<f64>) {
        self.species.insert(species, values);
    }

    /// Gets the concentration data for a specific species.
    pub fn get_species_data(&self, species: &str) -> Option<&[f64]> {
        self.species.get(species).map(Vec::as_slice)
    }

    /// Concentrations of all species at the last grid point
    pub fn final_state(&self) -> HashMap<&str, f64> {
        self.species
            .iter()
            .filter_map(|(name, values)| values.last().map(|v| (name.as_str(), *v)))
            .collect()
    }
}
