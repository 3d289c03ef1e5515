mod linear;

pub use linear::{action_features, LinearApproximator};

use ndarray::Array1;

use crate::error::Result;

/// Parametric action-value function.
pub trait Regressor {
    fn predict(&self, features: &Array1<f64>, action: usize) -> f64;

    /// Gradient of the prediction with respect to the weights.
    fn diff(&self, features: &Array1<f64>, action: usize) -> Array1<f64>;

    fn get_weights(&self) -> Array1<f64>;

    fn set_weights(&mut self, weights: Array1<f64>) -> Result<()>;

    fn weights_size(&self) -> usize;

    /// Length of the state feature vector accepted by `predict`.
    fn input_size(&self) -> usize;

    fn n_actions(&self) -> usize;

    fn predict_all(&self, features: &Array1<f64>) -> Array1<f64> {
        (0..self.n_actions())
            .map(|action| self.predict(features, action))
            .collect()
    }
}
