use ndarray::{Array1, ArrayView1};

use crate::action_selection::ActionSelection;
use crate::observation::Observation;
use crate::utils::argmax;

pub fn assert_close(found: f64, expected: f64) {
    assert!(
        (found - expected).abs() < 1e-9,
        "expected {}, found {}",
        expected,
        found
    );
}

/// Always picks the same action.
pub struct FixedAction(pub usize);

impl ActionSelection for FixedAction {
    fn get_action(&mut self, _obs: &Observation, _values: ArrayView1<f64>) -> usize {
        self.0
    }

    fn get_exploration_probs(&mut self, _obs: &Observation, values: ArrayView1<f64>) -> Array1<f64> {
        let mut probs: Array1<f64> = Array1::zeros(values.len());
        probs[self.0] = 1.0;
        probs
    }
}

/// Fixed action distribution, acting on its most likely action.
pub struct FixedProbs(pub Array1<f64>);

impl ActionSelection for FixedProbs {
    fn get_action(&mut self, _obs: &Observation, _values: ArrayView1<f64>) -> usize {
        argmax(self.0.iter())
    }

    fn get_exploration_probs(&mut self, _obs: &Observation, _values: ArrayView1<f64>) -> Array1<f64> {
        self.0.clone()
    }
}
