mod double_q_learning;
mod expected_sarsa;
mod q_learning;
mod r_learning;
mod rq_learning;
mod sarsa;
mod sarsa_lambda;
mod sarsa_lambda_continuous;
mod speedy_q_learning;
mod true_online_sarsa_lambda;
mod weighted_q_learning;

pub use double_q_learning::DoubleQLearning;
pub use expected_sarsa::ExpectedSarsa;
pub use q_learning::QLearning;
pub use r_learning::RLearning;
pub use rq_learning::{RQLearning, RQLearningConfig};
pub use sarsa::Sarsa;
pub use sarsa_lambda::SarsaLambda;
pub use sarsa_lambda_continuous::SarsaLambdaContinuous;
pub use speedy_q_learning::SpeedyQLearning;
pub use true_online_sarsa_lambda::TrueOnlineSarsaLambda;
pub use weighted_q_learning::{WeightedQLearning, WeightedQLearningConfig};

use enum_dispatch::enum_dispatch;
use ndarray::{Array1, ArrayView1};

use crate::error::{Result, TdError};
use crate::observation::{Observation, Transition};
use crate::parameter::ParameterKey;
use crate::utils::max;

pub fn sarsa(next_q_values: ArrayView1<f64>, next_action: usize) -> f64 {
    next_q_values[next_action]
}

pub fn qlearning(next_q_values: ArrayView1<f64>) -> f64 {
    max(next_q_values)
}

pub fn expected_sarsa(next_q_values: ArrayView1<f64>, policy_probs: &Array1<f64>) -> f64 {
    next_q_values.dot(policy_probs)
}

/// Single-transition update rule.
#[enum_dispatch]
pub trait TemporalDifference {
    /// Learns from one `(state, action, reward, next_state, absorbing)` step.
    fn update(&mut self, transition: &Transition) -> Result<()>;

    /// Called at every episode boundary.
    fn episode_start(&mut self) {}

    /// Action drawn at `next_state` by the last update, for rules that draw one.
    fn next_action(&self) -> Option<usize> {
        None
    }

    /// Fits a dataset holding exactly one transition.
    fn fit(&mut self, dataset: &[Transition]) -> Result<()> {
        match dataset {
            [transition] => self.update(transition),
            _ => Err(TdError::DatasetSize(dataset.len())),
        }
    }
}

#[enum_dispatch(TemporalDifference)]
pub enum EnumTemporalDifference {
    QLearning(QLearning),
    DoubleQLearning(DoubleQLearning),
    WeightedQLearning(WeightedQLearning),
    SpeedyQLearning(SpeedyQLearning),
    Sarsa(Sarsa),
    SarsaLambda(SarsaLambda),
    SarsaLambdaContinuous(SarsaLambdaContinuous),
    ExpectedSarsa(ExpectedSarsa),
    TrueOnlineSarsaLambda(TrueOnlineSarsaLambda),
    RLearning(RLearning),
    RQLearning(RQLearning),
}

pub(crate) fn check_lambda(lambda_factor: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&lambda_factor) {
        return Err(TdError::InvalidConfig(format!(
            "lambda must be in [0, 1], got {}",
            lambda_factor
        )));
    }
    Ok(lambda_factor)
}

pub(crate) fn check_probs(policy_probs: &Array1<f64>, n_actions: usize) -> Result<()> {
    if policy_probs.len() != n_actions {
        return Err(TdError::FeatureShape {
            expected: n_actions,
            found: policy_probs.len(),
        });
    }
    Ok(())
}

/// Schedules of approximated rules count per state-action pair when the
/// state is discrete and globally otherwise.
pub(crate) fn parameter_key(obs: &Observation, action: usize) -> ParameterKey {
    match obs {
        Observation::Discrete(state) => ParameterKey::StateAction(*state, action),
        Observation::Continuous(_) => ParameterKey::Global,
    }
}
