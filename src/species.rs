//! Species index map shared by every numeric component of a network.
//!
//! The position of a species in [`SpeciesIndex`] is the column it occupies in
//! every stoichiometry matrix and the slot it occupies in every concentration
//! vector. The map is fixed once a network is constructed.

use std::collections::HashMap;

use itertools::Itertools;
use ndarray::Array1;

use crate::equation::{discover_species, Term};
use crate::error::NetworkError;

/// Immutable mapping between species names and their positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl SpeciesIndex {
    /// Creates an index from an ordered list of names.
    ///
    /// Repeated names keep the position of their first occurrence.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).unique().collect();
        let positions = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        Self { names, positions }
    }

    /// Discovers the species of the given equations and indexes them.
    pub fn from_equations<'a, I>(equations: I) -> Result<Self, NetworkError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        Ok(Self::new(discover_species(equations)?))
    }

    /// Returns the position of a species or [`NetworkError::UnknownSpecies`].
    pub fn position(&self, species: &str) -> Result<usize, NetworkError> {
        self.get(species)
            .ok_or_else(|| NetworkError::UnknownSpecies(species.to_string()))
    }

    pub fn get(&self, species: &str) -> Option<usize> {
        self.positions.get(species).copied()
    }

    pub fn name(&self, position: usize) -> Option<&str> {
        self.names.get(position).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Builds a dense stoichiometry row from a list of terms.
    ///
    /// Species not present in `terms` get a coefficient of zero. Repeated
    /// species accumulate.
    pub fn stoichiometry_row(&self, terms: &[Term]) -> Result<Array1<f64>, NetworkError> {
        let mut row = Array1::zeros(self.len());
        for term in terms {
            row[self.position(&term.species)?] += term.stoichiometry as f64;
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_positions_follow_order() {
        let index = SpeciesIndex::new(["A", "B", "C", "A"]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.position("C").unwrap(), 2);
        assert_eq!(index.name(1), Some("B"));
    }

    #[test]
    fn test_unknown_species() {
        let index = SpeciesIndex::new(["A"]);
        assert_eq!(
            index.position("X"),
            Err(NetworkError::UnknownSpecies("X".to_string()))
        );
    }

    #[test]
    fn test_stoichiometry_row() {
        let index = SpeciesIndex::from_equations(["2*A + B -> C"]).unwrap();
        let row = index
            .stoichiometry_row(&[Term::new("A", 2), Term::new("B", 1)])
            .unwrap();
        assert_eq!(row, arr1(&[2.0, 1.0, 0.0]));
    }
}
