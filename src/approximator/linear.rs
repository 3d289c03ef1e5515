use ndarray::{s, Array1};

use super::Regressor;
use crate::error::{Result, TdError};

/// Embeds `phi` in the block of `action` inside a vector of
/// `phi.len() * n_actions` zeros.
pub fn action_features(phi: &Array1<f64>, action: usize, n_actions: usize) -> Array1<f64> {
    let n_features: usize = phi.len();
    let mut phi_action: Array1<f64> = Array1::zeros(n_features * n_actions);
    phi_action
        .slice_mut(s![action * n_features..(action + 1) * n_features])
        .assign(phi);
    phi_action
}

/// `Q(s, a) = <w, action_features(phi(s), a)>`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearApproximator {
    n_features: usize,
    n_actions: usize,
    weights: Array1<f64>,
}

impl LinearApproximator {
    pub fn new(n_features: usize, n_actions: usize) -> Self {
        Self::with_initial_value(n_features, n_actions, 0.0)
    }

    pub fn with_initial_value(n_features: usize, n_actions: usize, initial_value: f64) -> Self {
        Self {
            n_features,
            n_actions,
            weights: Array1::from_elem(n_features * n_actions, initial_value),
        }
    }

    fn block(&self, action: usize) -> std::ops::Range<usize> {
        action * self.n_features..(action + 1) * self.n_features
    }
}

impl Regressor for LinearApproximator {
    fn predict(&self, features: &Array1<f64>, action: usize) -> f64 {
        self.weights.slice(s![self.block(action)]).dot(features)
    }

    fn diff(&self, features: &Array1<f64>, action: usize) -> Array1<f64> {
        action_features(features, action, self.n_actions)
    }

    fn get_weights(&self) -> Array1<f64> {
        self.weights.clone()
    }

    fn set_weights(&mut self, weights: Array1<f64>) -> Result<()> {
        if weights.len() != self.weights.len() {
            return Err(TdError::FeatureShape {
                expected: self.weights.len(),
                found: weights.len(),
            });
        }
        self.weights = weights;
        Ok(())
    }

    fn weights_size(&self) -> usize {
        self.weights.len()
    }

    fn input_size(&self) -> usize {
        self.n_features
    }

    fn n_actions(&self) -> usize {
        self.n_actions
    }
}
