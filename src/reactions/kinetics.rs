use ndarray::{Array1, ArrayView1, ArrayViewMut1};

/// Common interface of the mass-action and Michaelis-Menten reaction sets
///
/// Both sets turn a concentration vector (indexed by the network's
/// [`SpeciesIndex`](crate::species::SpeciesIndex)) into a vector of net
/// production rates over the same species. Implementations never mutate
/// themselves while evaluating rates.
pub trait RateLaw {
    /// Number of reactions in the set
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Net production rate of every species at the given concentrations
    fn compute_rates(&self, concentrations: ArrayView1<f64>) -> Array1<f64>;

    /// Adds the net production rates into `dy`
    fn accumulate(&self, concentrations: ArrayView1<f64>, dy: ArrayViewMut1<f64>);
}
