use std::rc::Rc;

use ndarray::Array1;
use ndarray_rand::rand_distr::Normal;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

use super::TemporalDifference;
use crate::error::{Result, TdError};
use crate::mdp::MdpInfo;
use crate::observation::Transition;
use crate::parameter::{EnumParameter, Parameter, ParameterKey};
use crate::table::Table;
use crate::utils::{argmax, categorical_sample};

/// Standard deviation of pairs that have not been updated twice yet.
pub const UNKNOWN_SIGMA: f64 = 1e10;
const MIN_VARIANCE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightedQLearningConfig {
    /// Approximate the weights by sampling. The exact version is not implemented.
    pub sampling: bool,
    /// Number of samples drawn per action when sampling.
    pub precision: usize,
    /// Draw the next action from the estimator weights.
    pub weighted_policy: bool,
    pub seed: u64,
}

impl Default for WeightedQLearningConfig {
    fn default() -> Self {
        Self {
            sampling: true,
            precision: 1000,
            weighted_policy: false,
            seed: 42,
        }
    }
}

/// Weighted Q-learning: the bootstrap value is a weighted mean of the next
/// action values, each weighted by its probability of being the maximum
/// under a Gaussian approximation of its estimate.
pub struct WeightedQLearning {
    mdp_info: Rc<MdpInfo>,
    learning_rate: EnumParameter,
    q: Table,
    n_updates: Table,
    sigma: Table,
    target_mean: Table,
    target_squared_mean: Table,
    weights_var: Table,
    precision: usize,
    weighted_policy: bool,
    weights: Array1<f64>,
    next_action: Option<usize>,
    rng: StdRng,
}

impl WeightedQLearning {
    pub fn new(
        mdp_info: Rc<MdpInfo>,
        learning_rate: EnumParameter,
        config: WeightedQLearningConfig,
    ) -> Result<Self> {
        if !config.sampling {
            warn!("weighted q-learning without sampling requested");
            return Err(TdError::Unsupported("weighted q-learning without sampling"));
        }
        if config.precision == 0 {
            return Err(TdError::InvalidConfig(
                "precision must be positive".to_string(),
            ));
        }
        debug!(
            gamma = mdp_info.gamma,
            precision = config.precision,
            weighted_policy = config.weighted_policy,
            "weighted q-learning"
        );
        Ok(Self {
            q: Table::from_mdp(&mdp_info, 0.0),
            n_updates: Table::from_mdp(&mdp_info, 0.0),
            sigma: Table::from_mdp(&mdp_info, UNKNOWN_SIGMA),
            target_mean: Table::from_mdp(&mdp_info, 0.0),
            target_squared_mean: Table::from_mdp(&mdp_info, 0.0),
            weights_var: Table::from_mdp(&mdp_info, 0.0),
            weights: Array1::zeros(mdp_info.n_actions()),
            precision: config.precision,
            weighted_policy: config.weighted_policy,
            next_action: None,
            rng: StdRng::seed_from_u64(config.seed),
            mdp_info,
            learning_rate,
        })
    }

    pub fn q(&self) -> &Table {
        &self.q
    }

    pub fn q_mut(&mut self) -> &mut Table {
        &mut self.q
    }

    pub fn sigma(&self) -> &Table {
        &self.sigma
    }

    /// Estimator weights computed by the last non absorbing update.
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    fn next_q(&mut self, next_obs: usize) -> Result<f64> {
        let means: Array1<f64> = self.q.row(next_obs).to_owned();
        let normals: Vec<Normal<f64>> = means
            .iter()
            .zip(self.sigma.row(next_obs).iter())
            .map(|(mean, sigma)| {
                Normal::new(*mean, *sigma).map_err(|e| TdError::Distribution(e.to_string()))
            })
            .collect::<Result<Vec<Normal<f64>>>>()?;

        let mut count: Array1<f64> = Array1::zeros(means.len());
        for _ in 0..self.precision {
            let samples = normals.iter().map(|normal| normal.sample(&mut self.rng));
            count[argmax(samples)] += 1.0;
        }

        if self.weighted_policy {
            let random: usize = self.rng.gen_range(0..self.precision);
            self.next_action = Some(categorical_sample(&count.to_vec(), random as f64));
        }

        self.weights = count / self.precision as f64;
        Ok(self.weights.dot(&means))
    }
}

impl TemporalDifference for WeightedQLearning {
    fn update(&mut self, transition: &Transition) -> Result<()> {
        let (curr_obs, next_obs) = self.mdp_info.discrete_indices(transition)?;
        let curr_action: usize = transition.action;
        let idx: (usize, usize) = (curr_obs, curr_action);
        self.next_action = None;

        let q_current: f64 = self.q[idx];
        let future_q_value: f64 = if transition.absorbing {
            0.0
        } else {
            self.next_q(next_obs)?
        };
        let target: f64 = transition.reward + self.mdp_info.gamma * future_q_value;

        let learning_rate: f64 = self
            .learning_rate
            .call(ParameterKey::StateAction(curr_obs, curr_action))?;
        self.q[idx] = q_current + learning_rate * (target - q_current);

        self.n_updates[idx] += 1.0;
        let n: f64 = self.n_updates[idx];
        self.target_mean[idx] += (target - self.target_mean[idx]) / n;
        self.target_squared_mean[idx] += (target.powi(2) - self.target_squared_mean[idx]) / n;
        self.weights_var[idx] =
            (1.0 - learning_rate).powi(2) * self.weights_var[idx] + learning_rate.powi(2);

        if n > 1.0 {
            let variance: f64 =
                n * (self.target_squared_mean[idx] - self.target_mean[idx].powi(2)) / (n - 1.0);
            let var_estimator: f64 = (variance * self.weights_var[idx]).max(MIN_VARIANCE);
            self.sigma[idx] = var_estimator.sqrt();
        }

        trace!(temporal_difference = target - q_current, "weighted q-learning update");
        Ok(())
    }

    fn episode_start(&mut self) {
        self.next_action = None;
    }

    fn next_action(&self) -> Option<usize> {
        self.next_action
    }
}
