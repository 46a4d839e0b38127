//! Mass-Action Reaction Set
//!
//! This module derives the stoichiometry and rate matrices of all mass-action
//! reactions of a network and evaluates their net production rates.
//!
//! For R reactions over S species the set holds
//!
//! - the substrate stoichiometry matrix `A` (R×S)
//! - the net stoichiometry matrix `N` = products − substrates (R×S)
//! - the diagonal rate matrix `K` (R×R)
//!
//! The rate of reaction `i` is `K[i,i] · Π_j c_j^A[i,j]` and the net production
//! rate of every species is `Nᵀ · (K · r)`.

use log::debug;
use ndarray::linalg::general_mat_vec_mul;
use ndarray::{Array1, Array2, ArrayView1, ArrayViewMut1};

use crate::equation::Term;
use crate::error::NetworkError;
use crate::reactions::kinetics::RateLaw;
use crate::reactions::reversible::ElementaryReaction;
use crate::species::SpeciesIndex;

/// All mass-action reactions of a network
#[derive(Debug, Clone, PartialEq)]
pub enum MassActionReactions {
    /// No mass-action reactions; contributes nothing to the derivative
    Empty { zeros: Array1<f64> },
    Populated(MassActionSet),
}

/// Stoichiometry and rate matrices of one or more mass-action reactions
#[derive(Debug, Clone, PartialEq)]
pub struct MassActionSet {
    reactions: Vec<String>,
    substrate_matrix: Array2<f64>,
    net_matrix: Array2<f64>,
    rate_matrix: Array2<f64>,
    rate_names: Vec<String>,
    /// Non-zero entries of each row of the substrate matrix as (species, exponent)
    exponents: Vec<Vec<(usize, i32)>>,
}

impl MassActionReactions {
    /// Builds the reaction set from elementary (irreversible) reactions.
    ///
    /// # Arguments
    ///
    /// * `reactions` - Elementary reactions in insertion order
    /// * `species` - The network's species index
    ///
    /// # Returns
    ///
    /// Returns the `Empty` variant if `reactions` is empty, otherwise the
    /// populated set. Fails with [`NetworkError::UnknownSpecies`] if a term
    /// refers to a species outside of `species`.
    pub fn new(
        reactions: &[ElementaryReaction],
        species: &SpeciesIndex,
    ) -> Result<Self, NetworkError> {
        if reactions.is_empty() {
            return Ok(Self::Empty {
                zeros: Array1::zeros(species.len()),
            });
        }

        let n_reactions = reactions.len();
        let n_species = species.len();

        let mut substrate_matrix = Array2::zeros((n_reactions, n_species));
        let mut net_matrix = Array2::zeros((n_reactions, n_species));

        for (i, reaction) in reactions.iter().enumerate() {
            let a = species.stoichiometry_row(&reaction.equation.substrates)?;
            let b = species.stoichiometry_row(&reaction.equation.products)?;

            net_matrix.row_mut(i).assign(&(&b - &a));
            substrate_matrix.row_mut(i).assign(&a);
        }

        let rates = Array1::from_iter(reactions.iter().map(|r| r.rate));
        let exponents: Vec<Vec<(usize, i32)>> = substrate_matrix
            .outer_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, &a)| a != 0.0)
                    .map(|(j, &a)| (j, a as i32))
                    .collect()
            })
            .collect();

        debug!(
            "Built mass-action set with {} reactions over {} species",
            n_reactions, n_species
        );

        Ok(Self::Populated(MassActionSet {
            reactions: reactions.iter().map(|r| r.label.clone()).collect(),
            substrate_matrix,
            net_matrix,
            rate_matrix: Array2::from_diag(&rates),
            rate_names: reactions.iter().map(|r| r.rate_name.clone()).collect(),
            exponents,
        }))
    }

    pub fn as_populated(&self) -> Option<&MassActionSet> {
        match self {
            Self::Empty { .. } => None,
            Self::Populated(set) => Some(set),
        }
    }

    /// Rate of every individual reaction, `K · Π_j c_j^A[i,j]`.
    pub fn reaction_rates(&self, concentrations: ArrayView1<f64>) -> Array1<f64> {
        match self {
            Self::Empty { .. } => Array1::zeros(0),
            Self::Populated(set) => set.reaction_rates(concentrations),
        }
    }

    pub fn rate_names(&self) -> &[String] {
        match self {
            Self::Empty { .. } => &[],
            Self::Populated(set) => &set.rate_names,
        }
    }

    pub fn reactions(&self) -> &[String] {
        match self {
            Self::Empty { .. } => &[],
            Self::Populated(set) => &set.reactions,
        }
    }

    pub fn rate(&self, reaction: usize) -> Option<f64> {
        self.as_populated()
            .and_then(|set| set.rate_matrix.get((reaction, reaction)).copied())
    }

    /// Overwrites `K[reaction, reaction]`. Returns `false` if there is no such reaction.
    pub(crate) fn set_rate(&mut self, reaction: usize, value: f64) -> bool {
        match self.rate_mut(reaction) {
            Some(rate) => {
                *rate = value;
                true
            }
            None => false,
        }
    }

    fn rate_mut(&mut self, reaction: usize) -> Option<&mut f64> {
        match self {
            Self::Empty { .. } => None,
            Self::Populated(set) => set.rate_matrix.get_mut((reaction, reaction)),
        }
    }
}

impl RateLaw for MassActionReactions {
    fn len(&self) -> usize {
        match self {
            Self::Empty { .. } => 0,
            Self::Populated(set) => set.reactions.len(),
        }
    }

    fn compute_rates(&self, concentrations: ArrayView1<f64>) -> Array1<f64> {
        match self {
            Self::Empty { zeros } => zeros.clone(),
            Self::Populated(set) => set.compute_rates(concentrations),
        }
    }

    fn accumulate(&self, concentrations: ArrayView1<f64>, mut dy: ArrayViewMut1<f64>) {
        if let Self::Populated(set) = self {
            let rates = set.reaction_rates(concentrations);
            general_mat_vec_mul(1.0, &set.net_matrix.t(), &rates, 1.0, &mut dy);
        }
    }
}

impl MassActionSet {
    pub fn reaction_rates(&self, concentrations: ArrayView1<f64>) -> Array1<f64> {
        let mass_action_terms: Array1<f64> = self
            .exponents
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&(j, exponent)| concentrations[j].powi(exponent))
                    .product::<f64>()
            })
            .collect();

        self.rate_matrix.dot(&mass_action_terms)
    }

    pub fn compute_rates(&self, concentrations: ArrayView1<f64>) -> Array1<f64> {
        self.net_matrix
            .t()
            .dot(&self.reaction_rates(concentrations))
    }

    /// Substrate stoichiometry matrix `A` (reactions × species)
    pub fn substrate_matrix(&self) -> &Array2<f64> {
        &self.substrate_matrix
    }

    /// Net stoichiometry matrix `N` (reactions × species)
    pub fn net_matrix(&self) -> &Array2<f64> {
        &self.net_matrix
    }

    /// Diagonal rate matrix `K` (reactions × reactions)
    pub fn rate_matrix(&self) -> &Array2<f64> {
        &self.rate_matrix
    }

    pub fn rate_names(&self) -> &[String] {
        &self.rate_names
    }

    pub fn reactions(&self) -> &[String] {
        &self.reactions
    }

    /// Reconstructs the substrate terms of a reaction from `A`.
    pub fn substrates_of(&self, reaction: usize, species: &SpeciesIndex) -> Vec<Term> {
        match self.substrate_matrix.outer_iter().nth(reaction) {
            Some(row) => terms_from_row(row, species),
            None => Vec::new(),
        }
    }

    /// Reconstructs the product terms of a reaction from `N + A`.
    pub fn products_of(&self, reaction: usize, species: &SpeciesIndex) -> Vec<Term> {
        if reaction >= self.reactions.len() {
            return Vec::new();
        }

        let products = &self.net_matrix.row(reaction) + &self.substrate_matrix.row(reaction);
        terms_from_row(products.view(), species)
    }
}

fn terms_from_row(row: ArrayView1<f64>, species: &SpeciesIndex) -> Vec<Term> {
    row.iter()
        .enumerate()
        .filter(|(_, &coefficient)| coefficient > 0.0)
        .filter_map(|(j, &coefficient)| {
            species
                .name(j)
                .map(|name| Term::new(name, coefficient.round() as u32))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ReactionEntry;
    use crate::equation::discover_species;
    use crate::reactions::reversible::split_reversible;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn build(entries: Vec<ReactionEntry>) -> (MassActionReactions, SpeciesIndex) {
        let species = SpeciesIndex::new(
            discover_species(entries.iter().map(|e| e.equation.as_str())).unwrap(),
        );
        let reactions = split_reversible(&entries).unwrap();
        (MassActionReactions::new(&reactions, &species).unwrap(), species)
    }

    #[test]
    fn test_matrices() {
        // Species: A, B, C
        // R1: 2A + B -> C
        // R2: C -> 0
        let (reactions, _) = build(vec![
            ReactionEntry::new("2*A + B -> C", [("k1", 0.5)]),
            ReactionEntry::new("C -> 0", [("k2", 2.0)]),
        ]);
        let set = reactions.as_populated().unwrap();

        assert_eq!(set.substrate_matrix(), &arr2(&[[2.0, 1.0, 0.0], [0.0, 0.0, 1.0]]));
        assert_eq!(set.net_matrix(), &arr2(&[[-2.0, -1.0, 1.0], [0.0, 0.0, -1.0]]));
        assert_eq!(set.rate_matrix(), &arr2(&[[0.5, 0.0], [0.0, 2.0]]));
        assert_eq!(set.rate_names(), &["k1".to_string(), "k2".to_string()]);
    }

    #[test]
    fn test_compute_rates() {
        let (reactions, _) = build(vec![
            ReactionEntry::new("2*A + B -> C", [("k1", 0.5)]),
            ReactionEntry::new("C -> 0", [("k2", 2.0)]),
        ]);
        let c = arr1(&[3.0, 2.0, 1.5]);

        // r1 = 0.5 * 3^2 * 2 = 9, r2 = 2 * 1.5 = 3
        let rates = reactions.reaction_rates(c.view());
        assert_relative_eq!(rates[0], 9.0);
        assert_relative_eq!(rates[1], 3.0);

        let dy = reactions.compute_rates(c.view());
        assert_relative_eq!(dy[0], -18.0);
        assert_relative_eq!(dy[1], -9.0);
        assert_relative_eq!(dy[2], 6.0);
    }

    #[test]
    fn test_accumulate_matches_compute_rates() {
        let (reactions, _) = build(vec![
            ReactionEntry::new("A + B -> 2*C", [("k1", 1.5)]),
            ReactionEntry::new("0 -> A", [("k0", 0.1)]),
        ]);
        let c = arr1(&[0.4, 1.2, 0.0]);

        let mut dy = arr1(&[1.0, 1.0, 1.0]);
        reactions.accumulate(c.view(), dy.view_mut());

        let expected = reactions.compute_rates(c.view()) + 1.0;
        for (a, b) in dy.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_source_reaction_has_constant_rate() {
        let (reactions, _) = build(vec![ReactionEntry::new("0 -> A", [("k0", 0.7)])]);
        let dy = reactions.compute_rates(arr1(&[123.0]).view());
        assert_relative_eq!(dy[0], 0.7);
    }

    #[test]
    fn test_empty_set_contributes_zero() {
        let species = SpeciesIndex::new(["A", "B"]);
        let reactions = MassActionReactions::new(&[], &species).unwrap();

        assert!(reactions.is_empty());
        assert_eq!(reactions.compute_rates(arr1(&[1.0, 2.0]).view()), arr1(&[0.0, 0.0]));

        let mut dy = arr1(&[0.5, -0.5]);
        reactions.accumulate(arr1(&[1.0, 2.0]).view(), dy.view_mut());
        assert_eq!(dy, arr1(&[0.5, -0.5]));
    }

    #[test]
    fn test_terms_roundtrip() {
        let (reactions, species) = build(vec![
            ReactionEntry::new("2*A + B -> C + 3*D", [("k1", 1.0)]),
            ReactionEntry::new("D + E <-> 2*A", [("k2", 1.0), ("k3", 1.0)]),
        ]);
        let set = reactions.as_populated().unwrap();

        let expected = [
            (vec![("A", 2), ("B", 1)], vec![("C", 1), ("D", 3)]),
            (vec![("D", 1), ("E", 1)], vec![("A", 2)]),
            (vec![("A", 2)], vec![("D", 1), ("E", 1)]),
        ];

        for (i, (substrates, products)) in expected.iter().enumerate() {
            let to_set = |terms: Vec<Term>| -> HashSet<(String, u32)> {
                terms.into_iter().map(|t| (t.species, t.stoichiometry)).collect()
            };
            let expected_set = |terms: &Vec<(&str, u32)>| -> HashSet<(String, u32)> {
                terms.iter().map(|(s, n)| (s.to_string(), *n)).collect()
            };

            assert_eq!(to_set(set.substrates_of(i, &species)), expected_set(substrates));
            assert_eq!(to_set(set.products_of(i, &species)), expected_set(products));
        }
    }

    #[test]
    fn test_set_rate() {
        let (mut reactions, _) = build(vec![ReactionEntry::new("A -> B", [("k1", 1.0)])]);
        assert!(reactions.set_rate(0, 4.0));
        assert_eq!(reactions.rate(0), Some(4.0));
        assert!(!reactions.set_rate(1, 4.0));
    }
}
