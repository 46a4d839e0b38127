//! Derivative function of a reaction network.
//!
//! [`NetworkSystem`] borrows both reaction sets of a network immutably and
//! implements peroxide's [`ODEProblem`], so the integrator can evaluate it at
//! any number of trial states without touching the network.

use ndarray::{ArrayView1, ArrayViewMut1};
use peroxide::fuga::ODEProblem;

use crate::reactions::kinetics::RateLaw;
use crate::reactions::mass_action::MassActionReactions;
use crate::reactions::michaelis_menten::MichaelisMentenReactions;

/// Read-only view of the kinetics of a network
#[derive(Debug, Clone, Copy)]
pub struct NetworkSystem<'a> {
    mass_action: &'a MassActionReactions,
    michaelis_menten: &'a MichaelisMentenReactions,
}

impl<'a> NetworkSystem<'a> {
    pub fn new(
        mass_action: &'a MassActionReactions,
        michaelis_menten: &'a MichaelisMentenReactions,
    ) -> Self {
        Self {
            mass_action,
            michaelis_menten,
        }
    }

    /// Writes the combined net production rates at `y` into `dy`.
    ///
    /// `dy` is overwritten, not accumulated into.
    pub fn derivative(&self, y: ArrayView1<f64>, mut dy: ArrayViewMut1<f64>) {
        dy.fill(0.0);
        self.mass_action.accumulate(y, dy.view_mut());
        self.michaelis_menten.accumulate(y, dy);
    }
}

impl ODEProblem for NetworkSystem<'_> {
    fn rhs(&self, _t: f64, y: &[f64], dy: &mut [f64]) -> anyhow::Result<()> {
        self.derivative(ArrayView1::from(y), ArrayViewMut1::from(dy));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ReactionEntry;
    use crate::equation::discover_species;
    use crate::reactions::reversible::split_reversible;
    use crate::species::SpeciesIndex;
    use approx::assert_relative_eq;

    #[test]
    fn test_rhs_sums_both_sets() {
        let mass_action = vec![ReactionEntry::new("P -> 0", [("kd", 0.5)])];
        let michaelis_menten = vec![ReactionEntry::new(
            "S + E -> E + P",
            [("Km", 1.0), ("kcat", 2.0)],
        )];
        let species = SpeciesIndex::new(
            discover_species(
                mass_action
                    .iter()
                    .chain(michaelis_menten.iter())
                    .map(|e| e.equation.as_str()),
            )
            .unwrap(),
        );
        let mass_action =
            MassActionReactions::new(&split_reversible(&mass_action).unwrap(), &species).unwrap();
        let michaelis_menten = MichaelisMentenReactions::new(&michaelis_menten, &species).unwrap();
        let system = NetworkSystem::new(&mass_action, &michaelis_menten);

        // Species order: E, P, S
        let y = [0.5, 2.0, 3.0];
        let mut dy = [9.0; 3];
        system.rhs(0.0, &y, &mut dy).unwrap();

        let expected = mass_action.compute_rates(ArrayView1::from(&y))
            + michaelis_menten.compute_velocities(ArrayView1::from(&y));
        for (a, b) in dy.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
        assert_eq!(dy[0], 0.0);
    }
}
