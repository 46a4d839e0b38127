//! Michaelis-Menten Reaction Set
//!
//! Enzyme-catalysed reactions are written as `S + E -> E + P`: the enzyme is
//! the one species found on both sides, the substrate and product are the
//! remaining species of the left and right side respectively. Each reaction
//! carries a Michaelis constant (a constant whose name contains `Km`) and a
//! turnover number (a constant whose name contains `kcat`).
//!
//! # Rate Law
//!
//! Velocities follow the closed-form quadratic solution, which does not assume
//! that the substrate is in large excess over the enzyme:
//!
//! ```text
//! term1 = s + e + Km
//! term2 = sqrt(term1² - 4·e·s)
//! v     = kcat · (term1 - term2) / 2
//! ```
//!
//! The discriminant is clamped at zero before the square root, and the
//! velocity is evaluated in the equivalent form `kcat · 2·e·s / (term1 + term2)`,
//! which does not lose precision when `e·s` is small compared to `term1²`.

use std::collections::HashSet;

use log::debug;
use ndarray::{Array1, ArrayView1, ArrayViewMut1};

use crate::definition::ReactionEntry;
use crate::equation::{parse_equation, Equation, Term};
use crate::error::NetworkError;
use crate::reactions::kinetics::RateLaw;
use crate::species::SpeciesIndex;

/// Name fragment identifying the Michaelis constant of a reaction
pub const KM_PATTERN: &str = "Km";
/// Name fragment identifying the turnover number of a reaction
pub const KCAT_PATTERN: &str = "kcat";

/// All Michaelis-Menten reactions of a network
#[derive(Debug, Clone, PartialEq)]
pub enum MichaelisMentenReactions {
    /// No Michaelis-Menten reactions; contributes nothing to the derivative
    Empty { zeros: Array1<f64> },
    Populated(MichaelisMentenSet),
}

/// Index and constant arrays of one or more Michaelis-Menten reactions
///
/// All arrays are indexed by reaction, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct MichaelisMentenSet {
    reactions: Vec<String>,
    substrate_indices: Vec<usize>,
    substrate_stoichiometries: Array1<f64>,
    product_indices: Vec<usize>,
    product_stoichiometries: Array1<f64>,
    enzyme_indices: Vec<usize>,
    km_names: Vec<String>,
    kms: Array1<f64>,
    kcat_names: Vec<String>,
    kcats: Array1<f64>,
    n_species: usize,
}

/// Substrate, enzyme and product of one parsed Michaelis-Menten equation
struct EnzymeAssignment {
    substrate: (usize, f64),
    enzyme: usize,
    product: (usize, f64),
}

/// Velocity of a single reaction according to the quadratic rate law.
///
/// # Arguments
///
/// * `substrate` - Substrate concentration
/// * `enzyme` - Enzyme concentration
/// * `km` - Michaelis constant
/// * `kcat` - Turnover number
///
/// # Returns
///
/// The reaction velocity. Returns zero when `substrate + enzyme + km` and the
/// discriminant both vanish.
pub fn quadratic_velocity(substrate: f64, enzyme: f64, km: f64, kcat: f64) -> f64 {
    let term1 = substrate + enzyme + km;
    let discriminant = (term1 * term1 - 4.0 * enzyme * substrate).max(0.0);
    let denominator = term1 + discriminant.sqrt();

    if denominator > 0.0 {
        kcat * 2.0 * enzyme * substrate / denominator
    } else {
        0.0
    }
}

impl MichaelisMentenReactions {
    /// Builds the reaction set from Michaelis-Menten entries.
    ///
    /// # Arguments
    ///
    /// * `entries` - Equation and constants of every reaction, in insertion order
    /// * `species` - The network's species index
    ///
    /// # Returns
    ///
    /// Returns the `Empty` variant if `entries` is empty, otherwise the
    /// populated set.
    ///
    /// # Errors
    ///
    /// * [`NetworkError::MissingConstant`] / [`NetworkError::AmbiguousConstant`] if
    ///   not exactly one `Km` and one `kcat` constant are given
    /// * [`NetworkError::UnexpectedConstant`] for any other constant
    /// * [`NetworkError::InvalidEnzyme`] if the enzyme, substrate or product
    ///   cannot be identified unambiguously or the enzyme is not conserved
    pub fn new(entries: &[ReactionEntry], species: &SpeciesIndex) -> Result<Self, NetworkError> {
        if entries.is_empty() {
            return Ok(Self::Empty {
                zeros: Array1::zeros(species.len()),
            });
        }

        let n_reactions = entries.len();
        let mut set = MichaelisMentenSet {
            reactions: Vec::with_capacity(n_reactions),
            substrate_indices: Vec::with_capacity(n_reactions),
            substrate_stoichiometries: Array1::zeros(n_reactions),
            product_indices: Vec::with_capacity(n_reactions),
            product_stoichiometries: Array1::zeros(n_reactions),
            enzyme_indices: Vec::with_capacity(n_reactions),
            km_names: Vec::with_capacity(n_reactions),
            kms: Array1::zeros(n_reactions),
            kcat_names: Vec::with_capacity(n_reactions),
            kcats: Array1::zeros(n_reactions),
            n_species: species.len(),
        };

        for (i, entry) in entries.iter().enumerate() {
            let (km_name, km) = find_constant(entry, KM_PATTERN)?;
            let (kcat_name, kcat) = find_constant(entry, KCAT_PATTERN)?;

            if let Some((name, _)) = entry
                .constants
                .iter()
                .find(|(name, _)| *name != km_name && *name != kcat_name)
            {
                return Err(NetworkError::UnexpectedConstant {
                    equation: entry.equation.clone(),
                    name: name.clone(),
                });
            }

            let equation = parse_equation(&entry.equation)?;
            let assignment = assign_enzyme(&entry.equation, &equation, species)?;

            set.reactions.push(entry.equation.clone());
            set.substrate_indices.push(assignment.substrate.0);
            set.substrate_stoichiometries[i] = assignment.substrate.1;
            set.product_indices.push(assignment.product.0);
            set.product_stoichiometries[i] = assignment.product.1;
            set.enzyme_indices.push(assignment.enzyme);
            set.km_names.push(km_name);
            set.kms[i] = km;
            set.kcat_names.push(kcat_name);
            set.kcats[i] = kcat;
        }

        debug!(
            "Built Michaelis-Menten set with {} reactions over {} species",
            n_reactions,
            species.len()
        );

        Ok(Self::Populated(set))
    }

    pub fn as_populated(&self) -> Option<&MichaelisMentenSet> {
        match self {
            Self::Empty { .. } => None,
            Self::Populated(set) => Some(set),
        }
    }

    /// Net production rate of every species, see [`MichaelisMentenSet::compute_velocities`].
    pub fn compute_velocities(&self, concentrations: ArrayView1<f64>) -> Array1<f64> {
        match self {
            Self::Empty { zeros } => zeros.clone(),
            Self::Populated(set) => set.compute_velocities(concentrations),
        }
    }

    pub fn velocities(&self, concentrations: ArrayView1<f64>) -> Array1<f64> {
        match self {
            Self::Empty { .. } => Array1::zeros(0),
            Self::Populated(set) => set.velocities(concentrations),
        }
    }

    pub fn km_names(&self) -> &[String] {
        match self {
            Self::Empty { .. } => &[],
            Self::Populated(set) => &set.km_names,
        }
    }

    pub fn kcat_names(&self) -> &[String] {
        match self {
            Self::Empty { .. } => &[],
            Self::Populated(set) => &set.kcat_names,
        }
    }

    pub fn enzyme_indices(&self) -> &[usize] {
        match self {
            Self::Empty { .. } => &[],
            Self::Populated(set) => &set.enzyme_indices,
        }
    }

    pub fn km(&self, reaction: usize) -> Option<f64> {
        self.as_populated()
            .and_then(|set| set.kms.get(reaction).copied())
    }

    pub fn kcat(&self, reaction: usize) -> Option<f64> {
        self.as_populated()
            .and_then(|set| set.kcats.get(reaction).copied())
    }

    /// Overwrites the Michaelis constant of a reaction. Returns `false` if there is no such reaction.
    pub(crate) fn set_km(&mut self, reaction: usize, value: f64) -> bool {
        match self {
            Self::Empty { .. } => false,
            Self::Populated(set) => overwrite(set.kms.get_mut(reaction), value),
        }
    }

    /// Overwrites the turnover number of a reaction. Returns `false` if there is no such reaction.
    pub(crate) fn set_kcat(&mut self, reaction: usize, value: f64) -> bool {
        match self {
            Self::Empty { .. } => false,
            Self::Populated(set) => overwrite(set.kcats.get_mut(reaction), value),
        }
    }
}

impl RateLaw for MichaelisMentenReactions {
    fn len(&self) -> usize {
        match self {
            Self::Empty { .. } => 0,
            Self::Populated(set) => set.reactions.len(),
        }
    }

    fn compute_rates(&self, concentrations: ArrayView1<f64>) -> Array1<f64> {
        self.compute_velocities(concentrations)
    }

    fn accumulate(&self, concentrations: ArrayView1<f64>, dy: ArrayViewMut1<f64>) {
        if let Self::Populated(set) = self {
            set.scatter_add(concentrations, dy);
        }
    }
}

impl MichaelisMentenSet {
    /// Velocity of every reaction at the given concentrations.
    pub fn velocities(&self, concentrations: ArrayView1<f64>) -> Array1<f64> {
        (0..self.reactions.len())
            .map(|i| {
                quadratic_velocity(
                    concentrations[self.substrate_indices[i]],
                    concentrations[self.enzyme_indices[i]],
                    self.kms[i],
                    self.kcats[i],
                )
            })
            .collect()
    }

    /// Net production rate of every species.
    ///
    /// Substrates accumulate `-v · stoichiometry`, products `+v · stoichiometry`.
    /// Species shared by several reactions receive the sum of all
    /// contributions.
    pub fn compute_velocities(&self, concentrations: ArrayView1<f64>) -> Array1<f64> {
        let mut dy: Array1<f64> = Array1::zeros(self.n_species);
        self.scatter_add(concentrations, dy.view_mut());
        dy
    }

    fn scatter_add(&self, concentrations: ArrayView1<f64>, mut dy: ArrayViewMut1<f64>) {
        for (i, velocity) in self.velocities(concentrations).iter().enumerate() {
            dy[self.substrate_indices[i]] -= velocity * self.substrate_stoichiometries[i];
            dy[self.product_indices[i]] += velocity * self.product_stoichiometries[i];
        }
    }

    pub fn reactions(&self) -> &[String] {
        &self.reactions
    }

    pub fn substrate_indices(&self) -> &[usize] {
        &self.substrate_indices
    }

    pub fn substrate_stoichiometries(&self) -> &Array1<f64> {
        &self.substrate_stoichiometries
    }

    pub fn product_indices(&self) -> &[usize] {
        &self.product_indices
    }

    pub fn product_stoichiometries(&self) -> &Array1<f64> {
        &self.product_stoichiometries
    }

    pub fn enzyme_indices(&self) -> &[usize] {
        &self.enzyme_indices
    }

    pub fn km_names(&self) -> &[String] {
        &self.km_names
    }

    pub fn kms(&self) -> &Array1<f64> {
        &self.kms
    }

    pub fn kcat_names(&self) -> &[String] {
        &self.kcat_names
    }

    pub fn kcats(&self) -> &Array1<f64> {
        &self.kcats
    }
}

fn overwrite(slot: Option<&mut f64>, value: f64) -> bool {
    match slot {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}

/// Finds the single constant whose name contains `pattern` (case-sensitive).
fn find_constant(entry: &ReactionEntry, pattern: &'static str) -> Result<(String, f64), NetworkError> {
    let matches: Vec<&(String, f64)> = entry
        .constants
        .iter()
        .filter(|(name, _)| name.contains(pattern))
        .collect();

    match matches.as_slice() {
        [(name, value)] => Ok((name.clone(), *value)),
        [] => Err(NetworkError::MissingConstant {
            equation: entry.equation.clone(),
            pattern,
        }),
        _ => Err(NetworkError::AmbiguousConstant {
            equation: entry.equation.clone(),
            pattern,
            names: matches.iter().map(|(name, _)| name.clone()).collect(),
        }),
    }
}

/// Identifies enzyme, substrate and product of a Michaelis-Menten equation.
fn assign_enzyme(
    raw: &str,
    equation: &Equation,
    species: &SpeciesIndex,
) -> Result<EnzymeAssignment, NetworkError> {
    let invalid = |reason: String| NetworkError::InvalidEnzyme {
        equation: raw.to_string(),
        reason,
    };

    let left: HashSet<&str> = equation.substrates.iter().map(|t| t.species.as_str()).collect();
    let right: HashSet<&str> = equation.products.iter().map(|t| t.species.as_str()).collect();

    let mut shared: Vec<&str> = left.intersection(&right).copied().collect();
    shared.sort_unstable();

    let enzyme = match shared.as_slice() {
        [enzyme] => *enzyme,
        [] => return Err(invalid("no species appears on both sides".to_string())),
        _ => {
            return Err(invalid(format!(
                "several species appear on both sides: {:?}",
                shared
            )))
        }
    };

    let stoichiometry_of = |terms: &[Term]| {
        terms
            .iter()
            .find(|t| t.species == enzyme)
            .map(|t| t.stoichiometry)
            .unwrap_or_default()
    };
    let (consumed, released) = (
        stoichiometry_of(&equation.substrates),
        stoichiometry_of(&equation.products),
    );
    if consumed != released {
        return Err(invalid(format!(
            "enzyme '{}' is not conserved ({} consumed, {} released)",
            enzyme, consumed, released
        )));
    }

    let substrates: Vec<_> = equation
        .substrates
        .iter()
        .filter(|t| t.species != enzyme)
        .collect();
    let products: Vec<_> = equation
        .products
        .iter()
        .filter(|t| t.species != enzyme)
        .collect();

    let [substrate] = substrates.as_slice() else {
        return Err(invalid(format!(
            "expected exactly one substrate besides enzyme '{}', found {}",
            enzyme,
            substrates.len()
        )));
    };
    let [product] = products.as_slice() else {
        return Err(invalid(format!(
            "expected exactly one product besides enzyme '{}', found {}",
            enzyme,
            products.len()
        )));
    };

    Ok(EnzymeAssignment {
        substrate: (
            species.position(&substrate.species)?,
            substrate.stoichiometry as f64,
        ),
        enzyme: species.position(enzyme)?,
        product: (
            species.position(&product.species)?,
            product.stoichiometry as f64,
        ),
    })
}
