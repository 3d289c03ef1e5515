mod epsilon_greedy;

pub use epsilon_greedy::EpsilonGreedy;

use ndarray::{Array1, ArrayView1};

use crate::observation::Observation;

/// Behavior policy consulted by on-policy rules. `values` are the current
/// action values of `obs`.
pub trait ActionSelection {
    fn get_action(&mut self, obs: &Observation, values: ArrayView1<f64>) -> usize;

    /// Probability of each action in `obs`.
    fn get_exploration_probs(&mut self, obs: &Observation, values: ArrayView1<f64>) -> Array1<f64>;
}
